// src/lib.rs

//! Rivulet: lazy, operator-composed stage pipelines for Rust.
//!
//! Rivulet lets you wire processing stages together with `>>` and run them
//! on demand:
//!  - Stages wrap an `Algorithm` kernel with declared input and output ports.
//!  - `>>` connects ports and returns a `Chain`; nothing executes yet.
//!  - `Chain::update()` pulls the last stage, which executes whatever upstream
//!    stages are out of date.
//!  - `Chain::call(input)` runs the chain against a temporary input, restores
//!    the original wiring, and returns copies of the outputs.
//!  - `select_ports!` addresses non-default input/output ports.

pub mod core;
pub mod error;
pub mod executive;
pub mod kernels;
pub mod pipeline;

// --- Re-exports for the Public API ---

// Data and kernel contracts
pub use crate::core::{Algorithm, AsAny, DataHandle, DataObject, FieldData, PortInfo};

// The executive: stage handles, connections, realized outputs
pub use crate::executive::{Output, OutputPort, Outputs, Stage};

// Ready-made kernels
pub use crate::kernels::{FnFilter, FnFilterBuilder, TrivialProducer};

// Composition and invocation
pub use crate::pipeline::{select_ports, Chain, Input, Operand, PortSelector, SelectArg};

pub use crate::error::{PortDirection, RivuletError, RivuletResult};

/*
    Core Workflow:
    1. Implement `Algorithm` for your kernels (or use `FnFilter::builder`).
    2. Wrap each kernel in a `Stage` with `Stage::new(kernel)`.
    3. Compose: `let chain = (source >> &filter >> &sink)?;`
       - Use `select_ports!(1, &filter)?` to feed a non-default input port,
         `select_ports!(&source, 1)?` to take a non-default output port.
       - A `DataHandle` on the left is wrapped in a fresh `TrivialProducer`.
    4. Execute: `chain.update()?.output()?` for the live outputs, or
       `chain.call(data)?` for copied outputs computed from a temporary input.
*/
