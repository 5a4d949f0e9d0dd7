// rivulet/src/kernels/mod.rs

//! Ready-made stage kernels.

pub mod function;
pub mod trivial_producer;

pub use function::{FnFilter, FnFilterBuilder};
pub use trivial_producer::TrivialProducer;
