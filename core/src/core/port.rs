// rivulet/src/core/port.rs

//! Input port metadata declared by algorithms.

/// Describes one input port of an algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
  pub name: String,
  /// The port accepts any number of connections (fan-in).
  pub repeatable: bool,
  /// The algorithm can execute with no connection on this port.
  pub optional: bool,
}

impl PortInfo {
  /// A port that needs exactly one connection before execution.
  pub fn required(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      repeatable: false,
      optional: false,
    }
  }

  pub fn optional(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      repeatable: false,
      optional: true,
    }
  }

  pub fn repeatable(mut self) -> Self {
    self.repeatable = true;
    self
  }
}
