// rivulet/src/pipeline/operand.rs

//! Classification of `>>` operands by capability.

use super::definition::Chain;
use super::select::PortSelector;
use crate::core::data_object::DataHandle;
use crate::executive::Stage;
use std::any::{type_name, Any};

/// One side of a composition.
///
/// Each variant stands for a capability rather than a concrete type:
/// `Algorithm` is anything that can accept an input connection and expose an
/// output port (a plain [`Stage`] is a [`PortSelector`] on ports 0/0),
/// `Data` is an already realized data object, `Chain` a composed pipeline.
/// Values that offer none of these are `Unclassifiable` and make the
/// composition fail.
#[derive(Debug, Clone)]
pub enum Operand {
  Chain(Chain),
  Algorithm(PortSelector),
  Data(DataHandle),
  Unclassifiable { type_name: String },
}

impl Operand {
  /// Classifies a value whose static type says nothing about its
  /// capabilities, by inspecting it at runtime.
  pub fn dynamic<T: Any>(value: T) -> Operand {
    Self::inspect(Box::new(value), type_name::<T>())
  }

  /// Classifies an already type-erased value.
  pub fn from_any(value: Box<dyn Any>) -> Operand {
    Self::inspect(value, "<unknown>")
  }

  fn inspect(value: Box<dyn Any>, type_name: &str) -> Operand {
    let value = match value.downcast::<Operand>() {
      Ok(operand) => return *operand,
      Err(value) => value,
    };
    let value = match value.downcast::<Chain>() {
      Ok(chain) => return Operand::Chain(*chain),
      Err(value) => value,
    };
    let value = match value.downcast::<PortSelector>() {
      Ok(selector) => return Operand::Algorithm(*selector),
      Err(value) => value,
    };
    let value = match value.downcast::<Stage>() {
      Ok(stage) => return Operand::Algorithm(PortSelector::new(*stage)),
      Err(value) => value,
    };
    match value.downcast::<DataHandle>() {
      Ok(data) => Operand::Data(*data),
      Err(_) => Operand::Unclassifiable {
        type_name: type_name.to_string(),
      },
    }
  }

  pub fn is_classified(&self) -> bool {
    !matches!(self, Operand::Unclassifiable { .. })
  }

  /// Name used for this operand in error messages.
  pub fn describe(&self) -> String {
    match self {
      Operand::Chain(_) => "Chain".to_string(),
      Operand::Algorithm(selector) => selector.stage().class_name().to_string(),
      Operand::Data(data) => data.class_name().to_string(),
      Operand::Unclassifiable { type_name } => type_name.clone(),
    }
  }
}

impl From<Chain> for Operand {
  fn from(chain: Chain) -> Self {
    Operand::Chain(chain)
  }
}

impl From<&Chain> for Operand {
  fn from(chain: &Chain) -> Self {
    Operand::Chain(chain.clone())
  }
}

impl From<Stage> for Operand {
  fn from(stage: Stage) -> Self {
    Operand::Algorithm(PortSelector::new(stage))
  }
}

impl From<&Stage> for Operand {
  fn from(stage: &Stage) -> Self {
    Operand::Algorithm(PortSelector::new(stage.clone()))
  }
}

impl From<PortSelector> for Operand {
  fn from(selector: PortSelector) -> Self {
    Operand::Algorithm(selector)
  }
}

impl From<&PortSelector> for Operand {
  fn from(selector: &PortSelector) -> Self {
    Operand::Algorithm(selector.clone())
  }
}

impl From<DataHandle> for Operand {
  fn from(data: DataHandle) -> Self {
    Operand::Data(data)
  }
}

impl From<&DataHandle> for Operand {
  fn from(data: &DataHandle) -> Self {
    Operand::Data(data.clone())
  }
}
