use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid filter spec: {0}")]
    InvalidSpec(String),

    #[error("Convolver used before prepare()")]
    NotPrepared,

    #[error("Channel count mismatch: prepared for {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    #[error("Block length mismatch: first channel has {expected} samples, another has {actual}")]
    BlockLengthMismatch { expected: usize, actual: usize },

    #[error("Kernel length mismatch: prepared for {expected} taps, got {actual}")]
    KernelLengthMismatch { expected: usize, actual: usize },

    #[error("Interleaved buffer of {len} samples is not a whole number of {channels}-channel frames")]
    InterleavedLength { len: usize, channels: usize },

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FilterError {
    /// True for errors caused by bad design parameters, which callers can
    /// recover from by keeping the previously installed kernel.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FilterError::InvalidSpec(_))
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
