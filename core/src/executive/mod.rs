// rivulet/src/executive/mod.rs

//! The demand-driven executive: `Stage` handles, their connections, and the
//! pull-based update that realizes their outputs.

pub mod output;
pub mod stage;
pub mod update;

pub use output::{Output, Outputs};
pub use stage::{OutputPort, Stage};
