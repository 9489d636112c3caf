pub mod fir_core;
pub mod fir_design;
pub mod response;
pub mod window;

pub use fir_core::StreamingConvolver;
pub use fir_design::{FilterSpec, Kernel, design, validate_num_taps};
pub use response::{magnitude_at, magnitude_db_at, response_curve};
