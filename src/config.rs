//! Configuration for the FIR low-pass filter.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```toml
//! [audio]
//! sample_rate = 44100
//!
//! [filter]
//! cutoff_hz = 2500.0
//! window = "blackman"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{DEFAULT_CUTOFF_HZ, DEFAULT_NUM_TAPS, MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
use crate::error::{FilterError, Result};

/// Cutoff frequency parsed from user input
///
/// # Parsing formats
/// - `1000` - frequency in Hz (no suffix)
/// - `1000hz` or `1000Hz` - frequency in Hz (explicit)
/// - `1.5k` or `1.5khz` - frequency in kHz
///
/// # Example
/// ```
/// use firlowpass::config::CutoffFrequency;
///
/// let freq: CutoffFrequency = "2.5khz".parse().unwrap();
/// assert!((freq.as_hz() - 2500.0).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffFrequency(f32);

impl CutoffFrequency {
    /// Create from frequency in Hz
    pub fn from_hz(hz: f32) -> Self {
        Self(hz)
    }

    /// Get frequency in Hz
    pub fn as_hz(&self) -> f32 {
        self.0
    }
}

impl Default for CutoffFrequency {
    fn default() -> Self {
        Self(DEFAULT_CUTOFF_HZ)
    }
}

impl fmt::Display for CutoffFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}hz", self.0)
    }
}

impl FromStr for CutoffFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let num = lower.strip_suffix("hz").unwrap_or(&lower).trim();

        let (num, scale) = match num.strip_suffix('k') {
            Some(kilo) => (kilo.trim(), 1000.0),
            None => (num, 1.0),
        };

        let value: f32 = num
            .parse()
            .map_err(|_| format!("invalid frequency: {}", s))?;
        let hz = value * scale;
        if !hz.is_finite() || hz <= 0.0 {
            return Err("frequency must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

/// Tapering function applied to the ideal sinc response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Good general-purpose choice, ~53 dB stopband
    #[default]
    Hamming,
    /// Faster sidelobe roll-off than Hamming, ~44 dB stopband
    Hann,
    /// Wider transition band, ~74 dB stopband
    Blackman,
    /// No tapering; sharpest transition, poorest stopband
    Rectangular,
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowType::Hamming => "hamming",
            WindowType::Hann => "hann",
            WindowType::Blackman => "blackman",
            WindowType::Rectangular => "rectangular",
        };
        f.write_str(name)
    }
}

/// System-wide filter configuration
///
/// Use `LowpassConfig::default()` for sensible defaults.
///
/// # Example
/// ```
/// use firlowpass::config::LowpassConfig;
///
/// let mut config = LowpassConfig::default();
/// config.filter.cutoff_hz = 440.0;
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LowpassConfig {
    /// Audio stream configuration
    pub audio: AudioConfig,
    /// Kernel design configuration
    pub filter: FilterConfig,
}

/// Audio stream configuration
///
/// Configures sample rate, block size and channel count for live capture.
/// File input takes its rate and channel count from the file instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio sample rate in Hz
    pub sample_rate: u32,
    /// Processing block size in frames
    pub buffer_size: usize,
    /// Number of audio channels
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 512,
            channels: 2,
        }
    }
}

/// Kernel design configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Initial cutoff frequency in Hz
    pub cutoff_hz: f32,
    /// Number of kernel taps (must be odd, at least 3)
    pub num_taps: usize,
    /// Window applied to the sinc response
    pub window: WindowType,
    /// Lower bound of the cutoff parameter in Hz
    pub min_cutoff_hz: f32,
    /// Upper bound of the cutoff parameter in Hz
    pub max_cutoff_hz: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            num_taps: DEFAULT_NUM_TAPS,
            window: WindowType::Hamming,
            min_cutoff_hz: MIN_CUTOFF_HZ,
            max_cutoff_hz: MAX_CUTOFF_HZ,
        }
    }
}

impl LowpassConfig {
    /// Parse a TOML document; missing sections and fields use defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| FilterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| FilterError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Reject settings no stream could run with
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(FilterError::Config("sample_rate must be positive".into()));
        }
        if self.audio.buffer_size == 0 {
            return Err(FilterError::Config("buffer_size must be positive".into()));
        }
        if self.audio.channels == 0 {
            return Err(FilterError::Config("channels must be positive".into()));
        }
        let f = &self.filter;
        if !(f.min_cutoff_hz > 0.0 && f.min_cutoff_hz < f.max_cutoff_hz) {
            return Err(FilterError::Config(format!(
                "cutoff range [{}, {}] is empty or non-positive",
                f.min_cutoff_hz, f.max_cutoff_hz
            )));
        }
        crate::signal_processing::validate_num_taps(f.num_taps)
            .map_err(|e| FilterError::Config(e.to_string()))
    }
}
