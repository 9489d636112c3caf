/// Root-mean-square level of `samples`, skipping the first `skip` samples
pub fn rms(samples: &[f32], skip: usize) -> f32 {
    let tail = &samples[skip.min(samples.len())..];
    if tail.is_empty() {
        return 0.0;
    }
    (tail.iter().map(|x| x * x).sum::<f32>() / tail.len() as f32).sqrt()
}

/// Output level relative to input level in dB, both measured after `skip`
pub fn attenuation_db(input: &[f32], output: &[f32], skip: usize) -> f32 {
    20.0 * (rms(output, skip) / rms(input, skip)).log10()
}

/// Largest absolute difference between consecutive samples
pub fn max_step(samples: &[f32]) -> f32 {
    samples
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f32::max)
}
