// rivulet/src/executive/output.rs

//! The eager `Output` accessor and the `Outputs` value returned by pipeline
//! updates and one-off calls.

use super::stage::Stage;
use crate::core::data_object::DataHandle;
use crate::error::{RivuletError, RivuletResult};

/// Realized outputs of a stage: the sole data object of a single-output
/// stage, otherwise one data object per output port, in port order.
#[derive(Debug, Clone)]
pub enum Outputs {
  Single(DataHandle),
  Tuple(Vec<DataHandle>),
}

impl Outputs {
  /// `Single` for exactly one handle, `Tuple` otherwise (including none).
  pub fn from_vec(mut handles: Vec<DataHandle>) -> Self {
    if handles.len() == 1 {
      if let Some(only) = handles.pop() {
        return Outputs::Single(only);
      }
    }
    Outputs::Tuple(handles)
  }

  pub fn len(&self) -> usize {
    match self {
      Outputs::Single(_) => 1,
      Outputs::Tuple(handles) => handles.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn get(&self, index: usize) -> Option<&DataHandle> {
    match self {
      Outputs::Single(handle) if index == 0 => Some(handle),
      Outputs::Single(_) => None,
      Outputs::Tuple(handles) => handles.get(index),
    }
  }

  pub fn as_single(&self) -> Option<&DataHandle> {
    match self {
      Outputs::Single(handle) => Some(handle),
      Outputs::Tuple(_) => None,
    }
  }

  pub fn into_single(self) -> Option<DataHandle> {
    match self {
      Outputs::Single(handle) => Some(handle),
      Outputs::Tuple(_) => None,
    }
  }

  pub fn into_vec(self) -> Vec<DataHandle> {
    match self {
      Outputs::Single(handle) => vec![handle],
      Outputs::Tuple(handles) => handles,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = &DataHandle> {
    let (single, tuple) = match self {
      Outputs::Single(handle) => (Some(handle), &[][..]),
      Outputs::Tuple(handles) => (None, handles.as_slice()),
    };
    single.into_iter().chain(tuple.iter())
  }
}

/// Executes a stage when constructed and exposes its realized outputs.
///
/// The handles returned by [`Output::output`] are the stage's live cached
/// outputs, not copies: a later re-execution of the stage may replace or
/// mutate them.
#[derive(Debug, Clone)]
pub struct Output {
  stage: Stage,
}

impl Output {
  /// Runs `stage` (and whatever upstream it needs) immediately.
  pub fn new(stage: &Stage) -> RivuletResult<Self> {
    stage.update()
  }

  pub(crate) fn from_updated(stage: Stage) -> Self {
    Output { stage }
  }

  pub fn stage(&self) -> &Stage {
    &self.stage
  }

  pub fn output(&self) -> RivuletResult<Outputs> {
    let count = self.stage.number_of_output_ports();
    let mut handles = Vec::with_capacity(count);
    for port in 0..count {
      let handle = self.stage.output_data_object(port)?.ok_or_else(|| RivuletError::MissingOutput {
        stage: self.stage.class_name().to_string(),
        port,
      })?;
      handles.push(handle);
    }
    Ok(Outputs::from_vec(handles))
  }
}
