#![allow(dead_code)]

mod generate;
mod measure;
mod noise;

pub use generate::{dc, sine};
pub use measure::{attenuation_db, max_step, rms};
pub use noise::white_noise;
