// rivulet/src/pipeline/select.rs

//! `PortSelector` addresses a non-default input and/or output port of a stage
//! when composing with `>>`.
//!
//! ```text
//! source >> select_ports!(1, filter)            // feed the second input of `filter`
//! select_ports!(source, 1) >> filter            // take the second output of `source`
//! source >> select_ports!(1, filter, 1) >> next // both
//! ```

use crate::error::{RivuletError, RivuletResult};
use crate::executive::{Output, OutputPort, Stage};
use std::any::{type_name, Any};

/// A stage addressed at a specific input port and output port.
///
/// Holds a shared handle to the stage; dropping the selector never affects
/// the stage or its wiring.
#[derive(Debug, Clone)]
pub struct PortSelector {
  stage: Stage,
  input_port: usize,
  output_port: usize,
}

impl PortSelector {
  /// Addresses `stage` on input port 0 and output port 0.
  pub fn new(stage: Stage) -> Self {
    PortSelector {
      stage,
      input_port: 0,
      output_port: 0,
    }
  }

  pub fn with_ports(input_port: usize, stage: Stage, output_port: usize) -> Self {
    PortSelector {
      stage,
      input_port,
      output_port,
    }
  }

  pub fn input(mut self, port: usize) -> Self {
    self.input_port = port;
    self
  }

  pub fn output(mut self, port: usize) -> Self {
    self.output_port = port;
    self
  }

  pub fn stage(&self) -> &Stage {
    &self.stage
  }

  pub fn input_index(&self) -> usize {
    self.input_port
  }

  pub fn output_index(&self) -> usize {
    self.output_port
  }

  /// Connects `upstream` as the only connection on the selected input port.
  pub fn set_input_connection(&self, upstream: OutputPort) -> RivuletResult<()> {
    self.stage.set_input_connection(self.input_port, upstream)
  }

  /// The selected output port of the stage.
  pub fn output_port(&self) -> RivuletResult<OutputPort> {
    self.stage.output_port(self.output_port)
  }

  /// Updates the wrapped stage and returns its output accessor.
  pub fn update(&self) -> RivuletResult<Output> {
    self.stage.update()
  }
}

impl From<Stage> for PortSelector {
  fn from(stage: Stage) -> Self {
    PortSelector::new(stage)
  }
}

/// One positional argument of [`select_ports`].
#[derive(Debug, Clone)]
pub enum SelectArg {
  Port(usize),
  Stage(Stage),
  Other { type_name: String },
}

impl SelectArg {
  /// Classifies a value of arbitrary type: a `Stage` becomes the stage
  /// argument, an unsigned or non-negative integer a port index, anything
  /// else is rejected by `select_ports`.
  pub fn dynamic<T: Any>(value: T) -> SelectArg {
    let value: Box<dyn Any> = Box::new(value);
    let value = match value.downcast::<Stage>() {
      Ok(stage) => return SelectArg::Stage(*stage),
      Err(value) => value,
    };
    if let Some(port) = value.downcast_ref::<usize>() {
      return SelectArg::Port(*port);
    }
    if let Some(port) = value.downcast_ref::<u32>() {
      return SelectArg::Port(*port as usize);
    }
    if let Some(port) = value.downcast_ref::<i32>().and_then(|p| usize::try_from(*p).ok()) {
      return SelectArg::Port(port);
    }
    if let Some(port) = value.downcast_ref::<i64>().and_then(|p| usize::try_from(*p).ok()) {
      return SelectArg::Port(port);
    }
    SelectArg::Other {
      type_name: type_name::<T>().to_string(),
    }
  }
}

impl From<usize> for SelectArg {
  fn from(port: usize) -> Self {
    SelectArg::Port(port)
  }
}

impl From<Stage> for SelectArg {
  fn from(stage: Stage) -> Self {
    SelectArg::Stage(stage)
  }
}

impl From<&Stage> for SelectArg {
  fn from(stage: &Stage) -> Self {
    SelectArg::Stage(stage.clone())
  }
}

/// Builds a [`PortSelector`] from 2 or 3 positional arguments:
/// `(input_port, stage)`, `(stage, output_port)` or
/// `(input_port, stage, output_port)`. Ports not given default to 0.
///
/// Fails with `InvalidArgument` for any other argument count or shape.
pub fn select_ports<I>(args: I) -> RivuletResult<PortSelector>
where
  I: IntoIterator,
  I::Item: Into<SelectArg>,
{
  let args: Vec<SelectArg> = args.into_iter().map(Into::into).collect();
  if args.len() < 2 || args.len() > 3 {
    return Err(RivuletError::invalid_argument(format!(
      "Expecting 2 or 3 arguments, got {}",
      args.len()
    )));
  }

  let mut stage: Option<Stage> = None;
  let mut input_port: Option<usize> = None;
  let mut output_port: Option<usize> = None;
  for arg in args {
    match arg {
      SelectArg::Stage(candidate) => {
        if stage.is_some() {
          return Err(RivuletError::invalid_argument("Expecting exactly one stage argument"));
        }
        stage = Some(candidate);
      }
      SelectArg::Port(port) => {
        let slot = if stage.is_none() { &mut input_port } else { &mut output_port };
        if slot.is_some() {
          return Err(RivuletError::invalid_argument(
            "Expecting at most one port index on each side of the stage",
          ));
        }
        *slot = Some(port);
      }
      SelectArg::Other { type_name } => {
        return Err(RivuletError::invalid_argument(format!(
          "Expecting a stage or a port index, got {}",
          type_name
        )));
      }
    }
  }

  let stage = stage.ok_or_else(|| RivuletError::invalid_argument("Expecting a stage argument"))?;
  Ok(PortSelector::with_ports(
    input_port.unwrap_or(0),
    stage,
    output_port.unwrap_or(0),
  ))
}

/// `select_ports!(1, stage)`, `select_ports!(stage, 2)`,
/// `select_ports!(1, stage, 2)`; evaluates to `RivuletResult<PortSelector>`.
#[macro_export]
macro_rules! select_ports {
  ($($arg:expr),+ $(,)?) => {
    $crate::select_ports([$($crate::SelectArg::from($arg)),+])
  };
}
