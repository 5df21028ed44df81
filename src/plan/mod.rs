//! Treatment-plan document model and codec

pub mod codec;
mod model;

pub use model::*;
