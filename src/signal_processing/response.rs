//! Frequency response of an FIR kernel
//!
//! Evaluates the DTFT `H(e^jω) = Σ h[k]·e^(−jωk)` directly. Kernels here are
//! short, so a straight sum is cheaper than setting up an FFT.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::constants::MIN_RESPONSE_DB;
use crate::signal_processing::Kernel;

/// Linear magnitude `|H|` at `freq_hz`
pub fn magnitude_at(kernel: &Kernel, freq_hz: f64, sample_rate_hz: f64) -> f64 {
    let omega = 2.0 * PI * freq_hz / sample_rate_hz;
    kernel
        .taps()
        .iter()
        .enumerate()
        .map(|(k, &tap)| Complex64::from_polar(tap, -omega * k as f64))
        .sum::<Complex64>()
        .norm()
}

/// Magnitude in dB, floored at -200 dB
pub fn magnitude_db_at(kernel: &Kernel, freq_hz: f64, sample_rate_hz: f64) -> f64 {
    let mag = magnitude_at(kernel, freq_hz, sample_rate_hz);
    if mag <= 0.0 {
        return MIN_RESPONSE_DB;
    }
    (20.0 * mag.log10()).max(MIN_RESPONSE_DB)
}

/// `(frequency, dB)` pairs evenly spaced from DC to Nyquist inclusive
pub fn response_curve(kernel: &Kernel, sample_rate_hz: f64, points: usize) -> Vec<(f64, f64)> {
    if points == 0 {
        return Vec::new();
    }
    let nyquist = sample_rate_hz / 2.0;
    let step = if points > 1 {
        nyquist / (points - 1) as f64
    } else {
        0.0
    };
    (0..points)
        .map(|i| {
            let freq = step * i as f64;
            (freq, magnitude_db_at(kernel, freq, sample_rate_hz))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowType;
    use crate::signal_processing::{FilterSpec, design};
    use approx::assert_abs_diff_eq;

    fn kernel(cutoff_hz: f32) -> Kernel {
        design(&FilterSpec::new(cutoff_hz, 48000.0, 63, WindowType::Hamming)).unwrap()
    }

    #[test]
    fn test_unity_gain_at_dc() {
        assert_abs_diff_eq!(magnitude_at(&kernel(1000.0), 0.0, 48000.0), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_half_amplitude_at_cutoff() {
        // A windowed-sinc design crosses -6 dB at the cutoff
        let db = magnitude_db_at(&kernel(6000.0), 6000.0, 48000.0);
        assert!((db + 6.0).abs() < 1.0, "expected ~-6 dB at cutoff, got {}", db);
    }

    #[test]
    fn test_stopband_attenuation() {
        let db = magnitude_db_at(&kernel(2000.0), 12000.0, 48000.0);
        assert!(db < -40.0, "stopband not attenuated enough: {} dB", db);
    }

    #[test]
    fn test_response_curve_endpoints() {
        let curve = response_curve(&kernel(1000.0), 48000.0, 101);
        assert_eq!(curve.len(), 101);
        assert_eq!(curve[0].0, 0.0);
        assert_abs_diff_eq!(curve[100].0, 24000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(curve[0].1, 0.0, epsilon = 1e-6);
        assert!(response_curve(&kernel(1000.0), 48000.0, 0).is_empty());
    }
}
