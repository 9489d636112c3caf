//! Real-time windowed-sinc FIR low-pass filter.
//!
//! [`signal_processing::design`] turns a [`signal_processing::FilterSpec`]
//! into a unity-gain [`signal_processing::Kernel`];
//! [`signal_processing::StreamingConvolver`] applies it block by block with
//! history carried across calls. [`processing::LowpassProcessor`] ties the two
//! to a live [`parameter::CutoffParameter`].

pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod parameter;
pub mod processing;
pub mod signal_gen;
pub mod signal_processing;
pub mod wav;

pub use config::LowpassConfig;
pub use error::{FilterError, Result};
pub use parameter::CutoffParameter;
pub use processing::LowpassProcessor;
pub use wav::{WavSink, save_wav};
