//! Test signal synthesis: sine tones and logarithmic chirps.

use std::f32::consts::PI;

/// One sine component
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct Tone {
    pub frequency_hz: f32,
    pub amplitude: f32,
}

/// Sum of sine tones, mono
pub fn tones(tones: &[Tone], duration_secs: f32, sample_rate: u32) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let sr = sample_rate as f32;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sr;
            tones
                .iter()
                .map(|tone| tone.amplitude * (2.0 * PI * tone.frequency_hz * t).sin())
                .sum()
        })
        .collect()
}

/// Exponential sweep from `start_hz` to `end_hz`, mono
///
/// Phase is integrated analytically, so the instantaneous frequency moves
/// smoothly with no discontinuities.
pub fn log_chirp(
    start_hz: f32,
    end_hz: f32,
    amplitude: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let sr = sample_rate as f64;
    let f0 = start_hz as f64;
    let ratio = end_hz as f64 / f0;
    let duration = duration_secs as f64;

    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sr;
            let phase = if (ratio - 1.0).abs() < 1e-12 {
                2.0 * std::f64::consts::PI * f0 * t
            } else {
                let k = ratio.ln() / duration;
                2.0 * std::f64::consts::PI * f0 * ((k * t).exp() - 1.0) / k
            };
            amplitude * phase.sin() as f32
        })
        .collect()
}

/// Copy a mono signal into every channel of an interleaved buffer
pub fn interleave_mono(mono: &[f32], channels: usize) -> Vec<f32> {
    mono.iter()
        .flat_map(|&s| std::iter::repeat_n(s, channels))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tones_length_and_peak() {
        let signal = tones(
            &[Tone {
                frequency_hz: 1000.0,
                amplitude: 0.5,
            }],
            0.1,
            48000,
        );
        assert_eq!(signal.len(), 4800);
        let peak = signal.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 0.01, "peak {}", peak);
    }

    #[test]
    fn test_chirp_starts_at_zero_and_stays_bounded() {
        let signal = log_chirp(20.0, 20000.0, 0.8, 0.5, 48000);
        assert_eq!(signal.len(), 24000);
        assert_eq!(signal[0], 0.0);
        assert!(signal.iter().all(|s| s.abs() <= 0.8 + 1e-6));
    }

    #[test]
    fn test_interleave_mono() {
        assert_eq!(interleave_mono(&[1.0, 2.0], 2), vec![1.0, 1.0, 2.0, 2.0]);
    }
}
