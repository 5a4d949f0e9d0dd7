// rivulet/src/pipeline/definition.rs

//! Contains the `Chain` struct, the `>>` composition operator and lazy
//! `update()`. One-off invocation lives in `pipeline/execution.rs`.

use super::operand::Operand;
use super::select::PortSelector;
use crate::error::{RivuletError, RivuletResult};
use crate::executive::{Output, Stage};
use crate::kernels::TrivialProducer;
use crate::DataHandle;
use std::ops::Shr;
use tracing::{event, instrument, Level};

/// A composed pipeline, known only by its two boundary stages.
///
/// `first` receives external input, `last` produces the final output. A
/// chain refers to its stages by shared handle; the wiring between them
/// lives in the stages themselves, so a chain is an immutable view and cheap
/// to clone. Chains are created by `>>`:
///
/// ```
/// use rivulet::{FieldData, FnFilter, DataHandle, RivuletResult};
///
/// fn build() -> RivuletResult<rivulet::Chain> {
///   let scale = FnFilter::unary("Scale", |input| Ok(input.clone()));
///   let shift = FnFilter::unary("Shift", |input| Ok(input.clone()));
///   let data = DataHandle::new(FieldData::new().with_array("v", vec![1.0]));
///   data >> &scale >> &shift
/// }
/// # build().unwrap();
/// ```
///
/// Composition only wires ports: no stage executes until [`Chain::update`] or
/// a one-off [`Chain::call`].
#[derive(Debug, Clone)]
pub struct Chain {
  pub(crate) first: PortSelector,
  pub(crate) last: PortSelector,
}

impl Chain {
  /// Connects `lhs` to `rhs` and returns the resulting chain.
  ///
  /// The right operand decides where the connection lands: an algorithm's
  /// selected input port, or the input port of a chain's first stage. The
  /// left operand supplies the upstream output: an algorithm's selected
  /// output port, a chain's last stage, or a fresh source stage publishing a
  /// data object. A data object on the right, or an operand with no
  /// pipeline capability on either side, is an unsupported operand.
  #[instrument(name = "Chain::compose", skip_all, err(Display))]
  pub fn compose(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> RivuletResult<Chain> {
    let lhs = lhs.into();
    let rhs = rhs.into();

    let (target, last) = match (&lhs, &rhs) {
      (Operand::Unclassifiable { .. }, _) => return Err(unsupported(&lhs, &rhs)),
      (_, Operand::Algorithm(selector)) => (selector.clone(), selector.clone()),
      (_, Operand::Chain(chain)) => (chain.first.clone(), chain.last.clone()),
      (_, Operand::Data(_)) | (_, Operand::Unclassifiable { .. }) => return Err(unsupported(&lhs, &rhs)),
    };

    let first = match lhs {
      Operand::Algorithm(selector) => {
        target.set_input_connection(selector.output_port()?)?;
        selector
      }
      Operand::Chain(chain) => {
        target.set_input_connection(chain.last.output_port()?)?;
        chain.first
      }
      Operand::Data(data) => {
        let source = PortSelector::new(TrivialProducer::stage(data));
        target.set_input_connection(source.output_port()?)?;
        source
      }
      unclassified @ Operand::Unclassifiable { .. } => return Err(unsupported(&unclassified, &rhs)),
    };

    event!(
      Level::DEBUG,
      first = %first.stage().class_name(),
      target = %target.stage().class_name(),
      target_input = target.input_index(),
      last = %last.stage().class_name(),
      "Connected pipeline stages."
    );
    Ok(Chain { first, last })
  }

  /// The stage (and input port) receiving external input.
  pub fn first(&self) -> &PortSelector {
    &self.first
  }

  /// The stage (and output port) producing the final output.
  pub fn last(&self) -> &PortSelector {
    &self.last
  }

  pub fn first_stage(&self) -> &Stage {
    self.first.stage()
  }

  pub fn last_stage(&self) -> &Stage {
    self.last.stage()
  }

  /// Updates the last stage and returns its output accessor. Upstream stages
  /// execute only as needed, pulled by the last stage.
  pub fn update(&self) -> RivuletResult<Output> {
    self.last.update()
  }
}

fn unsupported(lhs: &Operand, rhs: &Operand) -> RivuletError {
  let err = RivuletError::UnsupportedOperands {
    lhs: lhs.describe(),
    rhs: rhs.describe(),
  };
  event!(Level::ERROR, error = %err, "Cannot compose operands.");
  err
}

macro_rules! impl_compose_for_operand {
  ($($lhs:ty),+ $(,)?) => {
    $(
      impl<R: Into<Operand>> Shr<R> for $lhs {
        type Output = RivuletResult<Chain>;

        fn shr(self, rhs: R) -> Self::Output {
          Chain::compose(self, rhs)
        }
      }
    )+
  };
}

impl_compose_for_operand!(
  Chain,
  &'_ Chain,
  Stage,
  &'_ Stage,
  PortSelector,
  &'_ PortSelector,
  DataHandle,
  &'_ DataHandle,
  Operand,
);

// A composition result keeps composing, so `a >> b >> c` short-circuits on
// the first error and can be finished with `?`.
macro_rules! impl_compose_for_result {
  ($($rhs:ty),+ $(,)?) => {
    $(
      impl Shr<$rhs> for RivuletResult<Chain> {
        type Output = RivuletResult<Chain>;

        fn shr(self, rhs: $rhs) -> Self::Output {
          Chain::compose(self?, rhs)
        }
      }
    )+
  };
}

impl_compose_for_result!(
  Chain,
  &'_ Chain,
  Stage,
  &'_ Stage,
  PortSelector,
  &'_ PortSelector,
  DataHandle,
  &'_ DataHandle,
  Operand,
);
