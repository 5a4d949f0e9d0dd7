// rivulet/src/executive/update.rs

//! Contains `Stage::update()`, the demand-driven pull that executes a stage
//! and, first, everything upstream of it.

use super::output::Output;
use super::stage::{next_timestamp, Stage};
use crate::error::{RivuletError, RivuletResult};
use std::cell::Cell;
use tracing::{event, instrument, Level};

/// Clears the in-pass flag when the pass ends, on success or failure.
struct PassFlag<'a>(&'a Cell<bool>);

impl Drop for PassFlag<'_> {
  fn drop(&mut self) {
    self.0.set(false);
  }
}

impl Stage {
  /// Brings this stage's outputs up to date and returns an accessor to them.
  ///
  /// Every upstream producer is updated first. The kernel itself only runs if
  /// the stage never executed, was modified (parameters or connections) since
  /// its last execution, or an upstream producer executed after it did.
  #[instrument(
        name = "Stage::update",
        skip_all,
        fields(stage = %self.class_name(), stage_id = self.id()),
        err(Display)
    )]
  pub fn update(&self) -> RivuletResult<Output> {
    self.update_pass()?;
    Ok(Output::from_updated(self.clone()))
  }

  /// Runs one update pass and returns the timestamp of the execution that
  /// produced the current outputs.
  pub(crate) fn update_pass(&self) -> RivuletResult<u64> {
    let guard = self.0.update_guard.lock();
    if guard.get() {
      event!(Level::ERROR, stage = %self.class_name(), "Stage re-entered its own update pass.");
      return Err(RivuletError::CycleDetected {
        stage: self.class_name().to_string(),
      });
    }
    guard.set(true);
    let _flag = PassFlag(&*guard);

    let (connections, modified_at, executed_at) = {
      let state = self.0.state.read();
      (state.inputs.clone(), state.modified_at, state.executed_at)
    };

    let mut inputs = Vec::with_capacity(connections.len());
    let mut newest_upstream = 0u64;
    for (port, port_connections) in connections.iter().enumerate() {
      if port_connections.is_empty() && !self.0.input_ports[port].optional {
        event!(Level::ERROR, port, "Required input port has no connection.");
        return Err(RivuletError::MissingInput {
          stage: self.class_name().to_string(),
          port,
        });
      }

      let mut port_data = Vec::with_capacity(port_connections.len());
      for connection in port_connections {
        let producer = connection.producer();
        let produced_at = producer.update_pass()?;
        newest_upstream = newest_upstream.max(produced_at);
        let data = producer
          .output_data_object(connection.index())?
          .ok_or_else(|| RivuletError::MissingOutput {
            stage: producer.class_name().to_string(),
            port: connection.index(),
          })?;
        port_data.push(data);
      }
      inputs.push(port_data);
    }

    if let Some(last_run) = executed_at {
      if last_run >= modified_at && last_run >= newest_upstream {
        event!(Level::TRACE, "Stage is up to date, skipping execution.");
        return Ok(last_run);
      }
    }

    event!(Level::DEBUG, "Executing stage kernel.");
    let outputs = {
      let mut kernel = self.0.kernel.lock();
      kernel.request_data(&inputs)
    }
    .map_err(|source| {
      event!(Level::ERROR, error = %source, "Stage kernel failed.");
      RivuletError::AlgorithmFailed {
        stage: self.class_name().to_string(),
        source,
      }
    })?;

    if outputs.len() != self.0.output_port_count {
      return Err(RivuletError::OutputCountMismatch {
        stage: self.class_name().to_string(),
        expected: self.0.output_port_count,
        actual: outputs.len(),
      });
    }

    let stamp = next_timestamp();
    {
      let mut state = self.0.state.write();
      state.outputs = outputs.into_iter().map(Some).collect();
      state.executed_at = Some(stamp);
    }
    event!(Level::TRACE, executed_at = stamp, "Stage executed.");
    Ok(stamp)
  }
}

#[cfg(test)]
mod tests {
  use crate::core::port::PortInfo;
  use crate::kernels::{FnFilter, TrivialProducer};
  use crate::{DataHandle, FieldData, RivuletError, Stage};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  fn counting_identity(counter: Arc<AtomicUsize>) -> Stage {
    FnFilter::unary("CountingIdentity", move |input: &DataHandle| {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(input.clone())
    })
  }

  #[test]
  fn upstream_executes_as_a_side_effect_of_pulling_downstream() {
    let runs_a = Arc::new(AtomicUsize::new(0));
    let runs_b = Arc::new(AtomicUsize::new(0));
    let source = Stage::new(TrivialProducer::new(FieldData::new().with_array("v", vec![1.0])));
    let a = counting_identity(runs_a.clone());
    let b = counting_identity(runs_b.clone());
    a.set_input_connection(0, source.output_port(0).unwrap()).unwrap();
    b.set_input_connection(0, a.output_port(0).unwrap()).unwrap();

    b.update().unwrap();
    assert_eq!(runs_a.load(Ordering::SeqCst), 1);
    assert_eq!(runs_b.load(Ordering::SeqCst), 1);

    // Nothing changed: neither kernel runs again.
    b.update().unwrap();
    assert_eq!(runs_a.load(Ordering::SeqCst), 1);
    assert_eq!(runs_b.load(Ordering::SeqCst), 1);

    // Modifying the upstream stage re-runs both.
    a.modified();
    b.update().unwrap();
    assert_eq!(runs_a.load(Ordering::SeqCst), 2);
    assert_eq!(runs_b.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn required_input_without_connection_fails() {
    let filter = counting_identity(Arc::new(AtomicUsize::new(0)));
    match filter.update() {
      Err(RivuletError::MissingInput { port, .. }) => assert_eq!(port, 0),
      other => panic!("Expected MissingInput, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn self_connection_is_a_cycle() {
    let filter = counting_identity(Arc::new(AtomicUsize::new(0)));
    filter.set_input_connection(0, filter.output_port(0).unwrap()).unwrap();
    assert!(matches!(filter.update(), Err(RivuletError::CycleDetected { .. })));
    // The pass flag was cleared: a repaired pipeline updates normally.
    let source = Stage::new(TrivialProducer::new(FieldData::new()));
    filter.set_input_connection(0, source.output_port(0).unwrap()).unwrap();
    assert!(filter.update().is_ok());
  }

  #[test]
  fn wrong_output_count_is_reported() {
    let broken = FnFilter::builder("Broken").outputs(2).build(|_inputs| Ok(Vec::new()));
    match broken.update() {
      Err(RivuletError::OutputCountMismatch { expected, actual, .. }) => {
        assert_eq!(expected, 2);
        assert_eq!(actual, 0);
      }
      other => panic!("Expected OutputCountMismatch, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn kernel_errors_name_the_failing_stage() {
    let failing = FnFilter::builder("Exploding")
      .input(PortInfo::optional("input"))
      .outputs(1)
      .build(|_inputs| Err(anyhow::anyhow!("boom")));
    match failing.update() {
      Err(RivuletError::AlgorithmFailed { stage, source }) => {
        assert_eq!(stage, "Exploding");
        assert_eq!(source.to_string(), "boom");
      }
      other => panic!("Expected AlgorithmFailed, got {:?}", other.map(|_| ())),
    }
  }
}
