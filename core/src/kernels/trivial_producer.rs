// rivulet/src/kernels/trivial_producer.rs

//! The implicit source stage: republishes a fixed data object.

use crate::core::algorithm::Algorithm;
use crate::core::data_object::{DataHandle, DataObject};
use crate::core::port::PortInfo;
use crate::executive::Stage;
use anyhow::anyhow;

/// A source with no inputs and one output port that publishes whatever data
/// object it was given, unchanged and uncopied.
///
/// Composition and one-off calls create a fresh one each time a data object
/// has to enter a pipeline.
#[derive(Debug, Default)]
pub struct TrivialProducer {
  output: Option<DataHandle>,
}

impl TrivialProducer {
  pub fn new<D: DataObject>(data: D) -> Self {
    Self::from_handle(DataHandle::new(data))
  }

  pub fn from_handle(handle: DataHandle) -> Self {
    TrivialProducer { output: Some(handle) }
  }

  /// A new source stage publishing `handle`.
  pub fn stage(handle: DataHandle) -> Stage {
    Stage::new(Self::from_handle(handle))
  }

  pub fn set_output(&mut self, handle: DataHandle) {
    self.output = Some(handle);
  }

  pub fn output(&self) -> Option<&DataHandle> {
    self.output.as_ref()
  }
}

impl Algorithm for TrivialProducer {
  fn class_name(&self) -> &str {
    "TrivialProducer"
  }

  fn input_ports(&self) -> Vec<PortInfo> {
    Vec::new()
  }

  fn number_of_output_ports(&self) -> usize {
    1
  }

  fn request_data(&mut self, _inputs: &[Vec<DataHandle>]) -> anyhow::Result<Vec<DataHandle>> {
    let output = self
      .output
      .clone()
      .ok_or_else(|| anyhow!("TrivialProducer has no data object to publish"))?;
    Ok(vec![output])
  }
}
