// rivulet/src/core/algorithm.rs

//! Defines the `Algorithm` trait implemented by stage kernels.

use super::data_object::{AsAny, DataHandle};
use super::port::PortInfo;

/// The computation behind a stage.
///
/// A kernel declares its ports once; the executive reads them when the stage
/// is created. `request_data` receives the realized upstream data grouped by
/// input port (one entry per connection, in connection order) and must return
/// exactly one data handle per declared output port.
///
/// Kernels never see connections. Wiring and scheduling belong to
/// [`Stage`](crate::Stage).
pub trait Algorithm: AsAny + Send {
  fn class_name(&self) -> &str;

  fn input_ports(&self) -> Vec<PortInfo>;

  fn number_of_output_ports(&self) -> usize;

  fn request_data(&mut self, inputs: &[Vec<DataHandle>]) -> anyhow::Result<Vec<DataHandle>>;
}
