// rivulet/src/error.rs
use anyhow::Error as AnyhowError;
use std::fmt;
use thiserror::Error;

/// Direction of a port, used when reporting addressing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
  Input,
  Output,
}

impl fmt::Display for PortDirection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PortDirection::Input => f.write_str("input"),
      PortDirection::Output => f.write_str("output"),
    }
  }
}

#[derive(Debug, Error)]
pub enum RivuletError {
  #[error("Invalid argument: {message}")]
  InvalidArgument { message: String },

  #[error("unsupported operand type(s) for >>: {lhs} and {rhs}")]
  UnsupportedOperands { lhs: String, rhs: String },

  #[error("Stage '{stage}' has no {direction} port {port} ({available} available)")]
  PortOutOfRange {
    stage: String,
    direction: PortDirection,
    port: usize,
    available: usize,
  },

  #[error("Stage '{stage}' requires a connection on input port {port}")]
  MissingInput { stage: String, port: usize },

  #[error("Dependency cycle detected while updating stage '{stage}'")]
  CycleDetected { stage: String },

  #[error("Stage '{stage}' produced {actual} outputs but declares {expected} output ports")]
  OutputCountMismatch {
    stage: String,
    expected: usize,
    actual: usize,
  },

  #[error("Stage '{stage}' has no realized output on port {port}")]
  MissingOutput { stage: String, port: usize },

  #[error("Type mismatch (expected {expected}, found {found})")]
  TypeMismatch { expected: String, found: String },

  #[error("Algorithm of stage '{stage}' failed. Source: {source}")]
  AlgorithmFailed {
    stage: String,
    #[source]
    source: AnyhowError,
  },
}

impl RivuletError {
  pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
    RivuletError::InvalidArgument {
      message: message.into(),
    }
  }
}

// Kernel code works in anyhow; a bare conversion has no stage to name, the
// executive re-labels it when it knows which stage failed.
impl From<AnyhowError> for RivuletError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<RivuletError>() {
      Ok(inner) => inner,
      Err(err) => RivuletError::AlgorithmFailed {
        stage: String::from("<unknown>"),
        source: err,
      },
    }
  }
}

pub type RivuletResult<T, E = RivuletError> = std::result::Result<T, E>;
