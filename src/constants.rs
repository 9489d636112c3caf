//! Numeric constants for the low-pass filter
//!
//! Parameter ranges mirror what a host exposes for the cutoff dial; the
//! epsilons guard the kernel design against degenerate input.

/// Lowest cutoff the parameter accepts, in Hz.
pub const MIN_CUTOFF_HZ: f32 = 20.0;

/// Highest cutoff the parameter accepts, in Hz.
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

/// Cutoff used when nothing else is configured, in Hz.
pub const DEFAULT_CUTOFF_HZ: f32 = 1000.0;

/// Cutoff that sits at the middle of the normalized 0..1 parameter range.
pub const CUTOFF_SKEW_CENTRE_HZ: f32 = 1000.0;

/// Default kernel length. Odd, for a Type I linear-phase filter.
pub const DEFAULT_NUM_TAPS: usize = 63;

/// Smallest legal kernel length.
pub const MIN_NUM_TAPS: usize = 3;

/// Windowed sums below this are treated as a degenerate design.
pub const MIN_KERNEL_SUM: f64 = 1e-12;

/// Floor applied to magnitude responses before converting to dB.
pub const MIN_RESPONSE_DB: f64 = -200.0;
