use std::f32::consts::PI;

/// Constant-value signal
pub fn dc(value: f32, num_samples: usize) -> Vec<f32> {
    vec![value; num_samples]
}

/// Sine wave at `freq_hz`, starting at phase zero
pub fn sine(freq_hz: f32, amplitude: f32, num_samples: usize, sample_rate: f32) -> Vec<f32> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
        .collect()
}
