// rivulet/src/pipeline/mod.rs

//! Composition of stages into lazily executed chains with `>>`, port
//! selection, and one-off invocation.

pub mod definition;
pub mod execution;
pub mod operand;
pub mod select;

// Re-export the main Chain struct
pub use definition::Chain;
pub use execution::Input;
pub use operand::Operand;
pub use select::{select_ports, PortSelector, SelectArg};
