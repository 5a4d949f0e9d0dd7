// rivulet/src/kernels/function.rs

//! `FnFilter`: a stage kernel backed by a closure, with declared ports.

use crate::core::algorithm::Algorithm;
use crate::core::data_object::DataHandle;
use crate::core::port::PortInfo;
use crate::executive::Stage;
use std::fmt;

type KernelFn = Box<dyn FnMut(&[Vec<DataHandle>]) -> anyhow::Result<Vec<DataHandle>> + Send>;

/// A kernel whose `request_data` is a user closure.
///
/// The closure receives the realized inputs grouped by port and returns one
/// handle per output port.
pub struct FnFilter {
  class_name: String,
  inputs: Vec<PortInfo>,
  outputs: usize,
  func: KernelFn,
}

impl FnFilter {
  pub fn builder(class_name: impl Into<String>) -> FnFilterBuilder {
    FnFilterBuilder {
      class_name: class_name.into(),
      inputs: Vec::new(),
      outputs: 1,
    }
  }

  /// A stage with one required input and one output, applying `f` to the
  /// single upstream data object.
  pub fn unary<F>(class_name: impl Into<String>, mut f: F) -> Stage
  where
    F: FnMut(&DataHandle) -> anyhow::Result<DataHandle> + Send + 'static,
  {
    Self::builder(class_name)
      .input(PortInfo::required("input"))
      .outputs(1)
      .build(move |inputs| {
        let input = inputs
          .first()
          .and_then(|port| port.first())
          .ok_or_else(|| anyhow::anyhow!("no data on input port 0"))?;
        Ok(vec![f(input)?])
      })
  }
}

impl Algorithm for FnFilter {
  fn class_name(&self) -> &str {
    &self.class_name
  }

  fn input_ports(&self) -> Vec<PortInfo> {
    self.inputs.clone()
  }

  fn number_of_output_ports(&self) -> usize {
    self.outputs
  }

  fn request_data(&mut self, inputs: &[Vec<DataHandle>]) -> anyhow::Result<Vec<DataHandle>> {
    (self.func)(inputs)
  }
}

impl fmt::Debug for FnFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FnFilter")
      .field("class_name", &self.class_name)
      .field("inputs", &self.inputs)
      .field("outputs", &self.outputs)
      .finish()
  }
}

/// Declares the ports of an [`FnFilter`] before its closure is supplied.
#[derive(Debug, Clone)]
pub struct FnFilterBuilder {
  class_name: String,
  inputs: Vec<PortInfo>,
  outputs: usize,
}

impl FnFilterBuilder {
  /// Appends an input port.
  pub fn input(mut self, port: PortInfo) -> Self {
    self.inputs.push(port);
    self
  }

  /// Number of output ports (defaults to 1).
  pub fn outputs(mut self, count: usize) -> Self {
    self.outputs = count;
    self
  }

  pub fn kernel<F>(self, f: F) -> FnFilter
  where
    F: FnMut(&[Vec<DataHandle>]) -> anyhow::Result<Vec<DataHandle>> + Send + 'static,
  {
    FnFilter {
      class_name: self.class_name,
      inputs: self.inputs,
      outputs: self.outputs,
      func: Box::new(f),
    }
  }

  /// Finishes the kernel and wraps it in a new stage.
  pub fn build<F>(self, f: F) -> Stage
  where
    F: FnMut(&[Vec<DataHandle>]) -> anyhow::Result<Vec<DataHandle>> + Send + 'static,
  {
    Stage::new(self.kernel(f))
  }
}
