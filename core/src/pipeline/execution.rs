// rivulet/src/pipeline/execution.rs

//! Contains the one-off invocation (`call` / `run`) of chains, stages and port
//! selectors: run against a temporary input, leave the persistent wiring as
//! it was, and hand back outputs the pipeline can no longer mutate.

use super::definition::Chain;
use super::select::PortSelector;
use crate::core::data_object::DataHandle;
use crate::error::{RivuletError, RivuletResult};
use crate::executive::{OutputPort, Outputs, Stage};
use crate::kernels::TrivialProducer;
use tracing::{event, instrument, Level};

/// Input supplied to a one-off invocation.
#[derive(Debug, Clone)]
pub enum Input {
  /// Replaces every connection on the input port with one source.
  Single(DataHandle),
  /// One source per element, in order. Only valid on a repeatable port.
  Multi(Vec<DataHandle>),
}

impl Input {
  fn len(&self) -> usize {
    match self {
      Input::Single(_) => 1,
      Input::Multi(items) => items.len(),
    }
  }
}

impl From<DataHandle> for Input {
  fn from(data: DataHandle) -> Self {
    Input::Single(data)
  }
}

impl From<&DataHandle> for Input {
  fn from(data: &DataHandle) -> Self {
    Input::Single(data.clone())
  }
}

impl From<Vec<DataHandle>> for Input {
  fn from(items: Vec<DataHandle>) -> Self {
    Input::Multi(items)
  }
}

impl From<&[DataHandle]> for Input {
  fn from(items: &[DataHandle]) -> Self {
    Input::Multi(items.to_vec())
  }
}

impl<const N: usize> From<[DataHandle; N]> for Input {
  fn from(items: [DataHandle; N]) -> Self {
    Input::Multi(items.into())
  }
}

/// The connections of one input port, captured before a temporary rewiring.
/// Dropping the snapshot puts them back, in their original order, whatever
/// happened in between.
struct ConnectionSnapshot<'a> {
  stage: &'a Stage,
  port: usize,
  saved: Vec<OutputPort>,
}

impl<'a> ConnectionSnapshot<'a> {
  fn capture(stage: &'a Stage, port: usize) -> RivuletResult<Self> {
    let saved = stage.input_connections(port)?;
    event!(Level::TRACE, port, saved = saved.len(), "Captured input connections.");
    Ok(ConnectionSnapshot { stage, port, saved })
  }
}

impl Drop for ConnectionSnapshot<'_> {
  fn drop(&mut self) {
    let saved = std::mem::take(&mut self.saved);
    let restored = saved.len();
    match self.stage.replace_input_connections(self.port, saved) {
      Ok(()) => event!(Level::TRACE, port = self.port, restored, "Restored input connections."),
      Err(e) => event!(Level::ERROR, error = %e, port = self.port, "Failed to restore input connections."),
    }
  }
}

fn connect_input(stage: &Stage, port: usize, input: Input) -> RivuletResult<()> {
  match input {
    Input::Single(data) => {
      let source = TrivialProducer::stage(data);
      stage.set_input_connection(port, source.output_port(0)?)
    }
    Input::Multi(items) => {
      let info = stage.input_port_info(port)?;
      if !info.repeatable {
        return Err(RivuletError::invalid_argument(format!(
          "Input port {} ('{}') of {} is not repeatable yet a sequence of {} inputs was passed to the pipeline.",
          port,
          info.name,
          stage.class_name(),
          items.len()
        )));
      }
      let sources = items
        .into_iter()
        .map(|data| TrivialProducer::stage(data).output_port(0))
        .collect::<RivuletResult<Vec<_>>>()?;
      stage.remove_all_input_connections(port)?;
      for source in sources {
        stage.add_input_connection(port, source)?;
      }
      Ok(())
    }
  }
}

/// Runs `last` with `input` temporarily wired into `first`'s selected input
/// port and returns shallow copies of `last`'s outputs.
#[instrument(
    name = "pipeline::invoke",
    skip_all,
    fields(
        first = %first.stage().class_name(),
        last = %last.stage().class_name(),
        input_port = first.input_index(),
        inputs = input.as_ref().map_or(0, Input::len),
    ),
    err(Display)
)]
pub(crate) fn invoke(first: &PortSelector, last: &PortSelector, input: Option<Input>) -> RivuletResult<Outputs> {
  let stage = first.stage();
  let port = first.input_index();
  let _invocation = stage.lock_invocation();

  // An empty sequence counts as no input.
  let has_input = input.as_ref().map_or(false, |input| input.len() > 0);
  if has_input && stage.number_of_input_ports() == 0 {
    return Err(RivuletError::invalid_argument(format!(
      "{} does not have input ports yet an input was passed to the pipeline.",
      stage.class_name()
    )));
  }

  let snapshot = match input.filter(|_| stage.number_of_input_ports() > 0) {
    Some(input) => {
      let snapshot = ConnectionSnapshot::capture(stage, port)?;
      connect_input(stage, port, input)?;
      Some(snapshot)
    }
    None => None,
  };

  let realized = last.stage().update()?.output()?;
  drop(snapshot);

  let copies = realized
    .iter()
    .map(DataHandle::shallow_copy)
    .collect::<RivuletResult<Vec<_>>>()?;
  event!(Level::DEBUG, outputs = copies.len(), "Invocation finished.");
  Ok(Outputs::from_vec(copies))
}

impl Chain {
  /// Executes the chain against `input` without changing its wiring.
  ///
  /// `input` temporarily replaces the connections on the first stage's input
  /// port; the original connections are back in place when this returns,
  /// including on error. The result holds independent copies of the last
  /// stage's outputs, so calling the chain again never alters a result
  /// already handed out.
  ///
  /// Invocations that rewire the same first stage are serialized. Other
  /// threads updating the chain concurrently may observe the temporary
  /// wiring; coordinating that is up to the caller.
  pub fn call(&self, input: impl Into<Input>) -> RivuletResult<Outputs> {
    invoke(&self.first, &self.last, Some(input.into()))
  }

  /// Executes the chain with its current wiring and returns copied outputs.
  pub fn run(&self) -> RivuletResult<Outputs> {
    invoke(&self.first, &self.last, None)
  }
}

impl PortSelector {
  /// Invokes the wrapped stage with `input` on the selected input port.
  pub fn call(&self, input: impl Into<Input>) -> RivuletResult<Outputs> {
    invoke(self, self, Some(input.into()))
  }

  pub fn run(&self) -> RivuletResult<Outputs> {
    invoke(self, self, None)
  }
}

impl Stage {
  /// Invokes this stage alone with `input` on input port 0.
  pub fn call(&self, input: impl Into<Input>) -> RivuletResult<Outputs> {
    let selector = PortSelector::new(self.clone());
    invoke(&selector, &selector, Some(input.into()))
  }

  pub fn run(&self) -> RivuletResult<Outputs> {
    let selector = PortSelector::new(self.clone());
    invoke(&selector, &selector, None)
  }
}
