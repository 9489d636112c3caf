//! Lock-free cutoff parameter shared between a control thread and the audio thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::FilterConfig;
use crate::constants::{CUTOFF_SKEW_CENTRE_HZ, DEFAULT_CUTOFF_HZ, MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
use crate::error::{FilterError, Result};

/// Handle to the live cutoff frequency
///
/// Clones share the same value. Writes are clamped to `[min_hz, max_hz]`;
/// reads always see a complete value, never a torn one.
///
/// The normalized view maps `0..1` onto the range with a skew that puts the
/// skew centre (1 kHz by default) at `0.5`, so a linear control moves
/// through the range perceptually evenly.
#[derive(Debug, Clone)]
pub struct CutoffParameter {
    bits: Arc<AtomicU32>,
    min_hz: f32,
    max_hz: f32,
    skew: f32,
}

impl CutoffParameter {
    /// Create a parameter over `[min_hz, max_hz]`, skewed around `centre_hz`
    ///
    /// `initial_hz` is clamped into range.
    ///
    /// # Errors
    /// Returns `FilterError::Config` if the range is empty, non-positive or
    /// not finite.
    pub fn new(initial_hz: f32, min_hz: f32, max_hz: f32, centre_hz: f32) -> Result<Self> {
        if !(min_hz.is_finite() && max_hz.is_finite() && min_hz > 0.0 && min_hz < max_hz) {
            return Err(FilterError::Config(format!(
                "cutoff range [{}, {}] is empty or non-positive",
                min_hz, max_hz
            )));
        }
        let initial_hz = if initial_hz.is_finite() {
            initial_hz
        } else {
            log::warn!("Non-finite initial cutoff {}, using {}", initial_hz, min_hz);
            min_hz
        };
        Ok(Self::with_range(initial_hz, min_hz, max_hz, centre_hz))
    }

    /// Create a parameter from the filter config's cutoff and range
    ///
    /// # Errors
    /// Returns `FilterError::Config` if the config's cutoff range is invalid.
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        Self::new(
            config.cutoff_hz,
            config.min_cutoff_hz,
            config.max_cutoff_hz,
            CUTOFF_SKEW_CENTRE_HZ,
        )
    }

    /// Range must already be checked: `0 < min_hz < max_hz`
    fn with_range(initial_hz: f32, min_hz: f32, max_hz: f32, centre_hz: f32) -> Self {
        let proportion = ((centre_hz - min_hz) / (max_hz - min_hz)).clamp(f32::EPSILON, 1.0);
        let skew = if proportion < 1.0 {
            0.5f32.ln() / proportion.ln()
        } else {
            1.0
        };
        let param = Self {
            bits: Arc::new(AtomicU32::new(0)),
            min_hz,
            max_hz,
            skew,
        };
        param.store(initial_hz.clamp(min_hz, max_hz));
        param
    }

    /// Latest cutoff in Hz
    pub fn hz(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Set the cutoff in Hz, clamped into range. Non-finite values are ignored.
    pub fn set_hz(&self, hz: f32) {
        if !hz.is_finite() {
            log::warn!("Ignoring non-finite cutoff {}", hz);
            return;
        }
        self.store(hz.clamp(self.min_hz, self.max_hz));
    }

    /// Current cutoff as a skewed `0..1` value
    pub fn normalized(&self) -> f32 {
        self.hz_to_normalized(self.hz())
    }

    /// Set the cutoff from a skewed `0..1` value (clamped)
    pub fn set_normalized(&self, value: f32) {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite normalized cutoff {}", value);
            return;
        }
        self.set_hz(self.normalized_to_hz(value));
    }

    /// Map a skewed `0..1` value to Hz
    pub fn normalized_to_hz(&self, value: f32) -> f32 {
        let value = value.clamp(0.0, 1.0);
        let proportion = if value > 0.0 {
            (value.ln() / self.skew).exp()
        } else {
            0.0
        };
        self.min_hz + (self.max_hz - self.min_hz) * proportion
    }

    /// Map Hz to a skewed `0..1` value
    pub fn hz_to_normalized(&self, hz: f32) -> f32 {
        let proportion = ((hz - self.min_hz) / (self.max_hz - self.min_hz)).clamp(0.0, 1.0);
        proportion.powf(self.skew)
    }

    pub fn min_hz(&self) -> f32 {
        self.min_hz
    }

    pub fn max_hz(&self) -> f32 {
        self.max_hz
    }

    fn store(&self, hz: f32) {
        self.bits.store(hz.to_bits(), Ordering::Release);
    }
}

impl Default for CutoffParameter {
    fn default() -> Self {
        Self::with_range(
            DEFAULT_CUTOFF_HZ,
            MIN_CUTOFF_HZ,
            MAX_CUTOFF_HZ,
            CUTOFF_SKEW_CENTRE_HZ,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_cutoff() {
        let param = CutoffParameter::default();
        assert_eq!(param.hz(), 1000.0);
        assert_eq!(param.min_hz(), 20.0);
        assert_eq!(param.max_hz(), 20000.0);
    }

    #[test]
    fn test_set_hz_clamps() {
        let param = CutoffParameter::default();
        param.set_hz(5.0);
        assert_eq!(param.hz(), 20.0);
        param.set_hz(50_000.0);
        assert_eq!(param.hz(), 20000.0);
        param.set_hz(f32::NAN);
        assert_eq!(param.hz(), 20000.0);
    }

    #[test]
    fn test_skew_centre_is_midpoint() {
        let param = CutoffParameter::default();
        assert_abs_diff_eq!(param.normalized_to_hz(0.5), 1000.0, epsilon = 0.5);
        assert_abs_diff_eq!(param.hz_to_normalized(1000.0), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_normalized_endpoints() {
        let param = CutoffParameter::default();
        assert_abs_diff_eq!(param.normalized_to_hz(0.0), 20.0, epsilon = 1e-3);
        assert_abs_diff_eq!(param.normalized_to_hz(1.0), 20000.0, epsilon = 1e-1);
        assert_abs_diff_eq!(param.normalized_to_hz(-3.0), 20.0, epsilon = 1e-3);
    }

    #[test]
    fn test_normalized_round_trip_through_handle() {
        let param = CutoffParameter::default();
        param.set_normalized(0.75);
        assert_abs_diff_eq!(param.normalized(), 0.75, epsilon = 1e-4);
        assert!(param.hz() > 1000.0);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let config = FilterConfig {
            min_cutoff_hz: 20000.0,
            max_cutoff_hz: 20.0,
            ..FilterConfig::default()
        };
        assert!(matches!(
            CutoffParameter::from_config(&config),
            Err(FilterError::Config(_))
        ));
        assert!(CutoffParameter::new(1000.0, 0.0, 20000.0, 1000.0).is_err());
        assert!(CutoffParameter::new(1000.0, 20.0, f32::INFINITY, 1000.0).is_err());
    }

    #[test]
    fn test_from_config_matches_default() {
        let param = CutoffParameter::from_config(&FilterConfig::default()).unwrap();
        let default = CutoffParameter::default();
        assert_eq!(param.hz(), default.hz());
        assert_eq!(param.normalized(), default.normalized());
    }

    #[test]
    fn test_clones_share_value() {
        let param = CutoffParameter::default();
        let audio_side = param.clone();
        let handle = std::thread::spawn(move || param.set_hz(4321.0));
        handle.join().unwrap();
        assert_eq!(audio_side.hz(), 4321.0);
    }
}
