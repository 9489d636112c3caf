use std::f64::consts::PI;

use crate::config::WindowType;
use crate::constants::{MIN_KERNEL_SUM, MIN_NUM_TAPS};
use crate::error::{FilterError, Result};

/// Parameters for one low-pass kernel design
///
/// Built fresh whenever the cutoff changes and passed by value to the
/// designer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// Cutoff frequency in Hz (must be below Nyquist)
    pub cutoff_hz: f32,
    /// Sample rate in Hz
    pub sample_rate_hz: f32,
    /// Kernel length (odd, at least 3)
    pub num_taps: usize,
    /// Taper applied to the ideal sinc response
    pub window: WindowType,
}

impl FilterSpec {
    pub fn new(cutoff_hz: f32, sample_rate_hz: f32, num_taps: usize, window: WindowType) -> Self {
        Self {
            cutoff_hz,
            sample_rate_hz,
            num_taps,
            window,
        }
    }

    /// Check the spec against the design constraints
    ///
    /// # Errors
    /// Returns `FilterError::InvalidSpec` if the sample rate is not positive,
    /// the cutoff is outside `(0, sample_rate / 2)`, or `num_taps` is even or
    /// smaller than 3.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(FilterError::InvalidSpec(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        let nyquist = self.sample_rate_hz / 2.0;
        if !self.cutoff_hz.is_finite() || self.cutoff_hz <= 0.0 || self.cutoff_hz >= nyquist {
            return Err(FilterError::InvalidSpec(format!(
                "cutoff {} Hz outside (0, {}) for sample rate {}",
                self.cutoff_hz, nyquist, self.sample_rate_hz
            )));
        }
        validate_num_taps(self.num_taps)
    }

    /// Cutoff as a fraction of the sample rate
    pub fn normalized_cutoff(&self) -> f64 {
        self.cutoff_hz as f64 / self.sample_rate_hz as f64
    }
}

/// Check that a kernel length gives a symmetric, Type I kernel
///
/// # Errors
/// Returns `FilterError::InvalidSpec` for even lengths or lengths below 3.
pub fn validate_num_taps(num_taps: usize) -> Result<()> {
    if num_taps < MIN_NUM_TAPS || num_taps % 2 == 0 {
        return Err(FilterError::InvalidSpec(format!(
            "num_taps must be odd and >= {}, got {}",
            MIN_NUM_TAPS, num_taps
        )));
    }
    Ok(())
}

/// FIR low-pass coefficients, normalized to unity DC gain
///
/// A kernel handed out by [`design`] is never modified; the convolver
/// replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    taps: Vec<f64>,
}

impl Kernel {
    /// Unit impulse at the centre tap: a pure delay of the group delay.
    pub fn centered_impulse(num_taps: usize) -> Self {
        let mut taps = vec![0.0; num_taps];
        if num_taps > 0 {
            taps[(num_taps - 1) / 2] = 1.0;
        }
        Self { taps }
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        self.taps.len().saturating_sub(1) / 2
    }

    /// Get access to the tap coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Overwrite this kernel with a fresh design of the same length
    ///
    /// Only used on kernels that are not installed in a convolver. On error
    /// the coefficients are left untouched.
    pub(crate) fn redesign(&mut self, spec: &FilterSpec) -> Result<()> {
        if spec.num_taps != self.taps.len() {
            return Err(FilterError::KernelLengthMismatch {
                expected: self.taps.len(),
                actual: spec.num_taps,
            });
        }
        spec.validate()?;

        let sum = windowed_sinc_sum(spec);
        if sum.abs() < MIN_KERNEL_SUM {
            return Err(FilterError::InvalidSpec(format!(
                "windowed sinc sums to {} for {:?}",
                sum, spec
            )));
        }

        write_windowed_sinc(spec, &mut self.taps);
        for tap in self.taps.iter_mut() {
            *tap /= sum;
        }
        Ok(())
    }
}

/// Design a windowed-sinc low-pass kernel
///
/// The ideal impulse response `sin(2π·fc·m) / (π·m)` (with `m = n − M` and the
/// centre tap set to `2·fc`) is tapered by the chosen window and scaled so the
/// coefficients sum to 1.
///
/// # Errors
/// Returns `FilterError::InvalidSpec` if the spec fails [`FilterSpec::validate`].
pub fn design(spec: &FilterSpec) -> Result<Kernel> {
    spec.validate()?;
    let mut kernel = Kernel {
        taps: vec![0.0; spec.num_taps],
    };
    kernel.redesign(spec)?;
    Ok(kernel)
}

/// Windowed (unnormalized) sinc value for tap `n`
fn windowed_sinc_tap(spec: &FilterSpec, n: usize) -> f64 {
    let fc = spec.normalized_cutoff();
    let centre = (spec.num_taps - 1) / 2;
    let sinc = if n == centre {
        2.0 * fc
    } else {
        let m = n as f64 - centre as f64;
        (2.0 * PI * fc * m).sin() / (PI * m)
    };
    sinc * spec.window.value(n, spec.num_taps)
}

/// Fill `taps` with the unnormalized kernel
///
/// Only the first half is computed; the second half is mirrored so the
/// result is exactly symmetric.
fn write_windowed_sinc(spec: &FilterSpec, taps: &mut [f64]) {
    let n = taps.len();
    let centre = (n - 1) / 2;
    for i in 0..=centre {
        let value = windowed_sinc_tap(spec, i);
        taps[i] = value;
        taps[n - 1 - i] = value;
    }
}

/// Sum of the unnormalized kernel, computed in the same order the taps are laid out
fn windowed_sinc_sum(spec: &FilterSpec) -> f64 {
    let centre = (spec.num_taps - 1) / 2;
    let mut sum = windowed_sinc_tap(spec, centre);
    for i in 0..centre {
        sum += 2.0 * windowed_sinc_tap(spec, i);
    }
    sum
}
