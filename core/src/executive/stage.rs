// rivulet/src/executive/stage.rs

//! Contains the `Stage` handle, its port addressing and connection management.
//! Execution lives in `executive/update.rs`.

use crate::core::algorithm::Algorithm;
use crate::core::data_object::DataHandle;
use crate::core::port::PortInfo;
use crate::error::{PortDirection, RivuletError, RivuletResult};
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{event, Level};

static CLOCK: AtomicU64 = AtomicU64::new(0);
static NEXT_STAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide monotonic timestamp shared by modification and execution times.
pub(crate) fn next_timestamp() -> u64 {
  CLOCK.fetch_add(1, Ordering::SeqCst) + 1
}

/// Mutable part of a stage: wiring, realized outputs and timestamps.
pub(crate) struct StageState {
  /// Upstream connections per input port, in connection order.
  pub(crate) inputs: Vec<Vec<OutputPort>>,
  /// Realized output per output port; `None` until the first execution.
  pub(crate) outputs: Vec<Option<DataHandle>>,
  pub(crate) modified_at: u64,
  pub(crate) executed_at: Option<u64>,
}

pub(crate) struct StageInner {
  pub(crate) id: u64,
  pub(crate) class_name: String,
  pub(crate) input_ports: Vec<PortInfo>,
  pub(crate) output_port_count: usize,
  pub(crate) kernel: Mutex<Box<dyn Algorithm>>,
  pub(crate) state: RwLock<StageState>,
  /// Held for the duration of an update pass. The flag is set while the pass
  /// runs, so re-entering it on the same thread means a dependency cycle.
  pub(crate) update_guard: ReentrantMutex<Cell<bool>>,
  /// Serializes one-off invocations that rewire this stage's inputs.
  pub(crate) invocation_lock: ReentrantMutex<()>,
}

/// Shared handle to a processing node.
///
/// Cloning a `Stage` clones the handle, never the node. A stage wraps an
/// [`Algorithm`] kernel and owns its input wiring: each input port holds an
/// ordered list of [`OutputPort`] connections to upstream stages.
#[derive(Clone)]
pub struct Stage(pub(crate) Arc<StageInner>);

/// One output port of a producer stage, used as an upstream connection.
///
/// Holds a shared handle to the producer, which keeps it alive as long as any
/// consumer is connected to it.
#[derive(Clone)]
pub struct OutputPort {
  producer: Stage,
  index: usize,
}

impl OutputPort {
  pub fn producer(&self) -> &Stage {
    &self.producer
  }

  pub fn index(&self) -> usize {
    self.index
  }
}

impl PartialEq for OutputPort {
  fn eq(&self, other: &Self) -> bool {
    self.producer.ptr_eq(&other.producer) && self.index == other.index
  }
}

impl Eq for OutputPort {}

impl fmt::Debug for OutputPort {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OutputPort")
      .field("producer", &format_args!("{}#{}", self.producer.class_name(), self.producer.id()))
      .field("index", &self.index)
      .finish()
  }
}

impl Stage {
  /// Wraps `kernel` in a new stage. Port layout is read from the kernel once.
  pub fn new<K: Algorithm>(kernel: K) -> Self {
    Self::from_boxed(Box::new(kernel))
  }

  pub fn from_boxed(kernel: Box<dyn Algorithm>) -> Self {
    let class_name = kernel.class_name().to_string();
    let input_ports = kernel.input_ports();
    let output_port_count = kernel.number_of_output_ports();
    let id = NEXT_STAGE_ID.fetch_add(1, Ordering::Relaxed);
    event!(
      Level::TRACE,
      stage = %class_name,
      stage_id = id,
      inputs = input_ports.len(),
      outputs = output_port_count,
      "Stage created."
    );
    Stage(Arc::new(StageInner {
      id,
      class_name,
      state: RwLock::new(StageState {
        inputs: vec![Vec::new(); input_ports.len()],
        outputs: vec![None; output_port_count],
        modified_at: next_timestamp(),
        executed_at: None,
      }),
      input_ports,
      output_port_count,
      kernel: Mutex::new(kernel),
      update_guard: ReentrantMutex::new(Cell::new(false)),
      invocation_lock: ReentrantMutex::new(()),
    }))
  }

  pub fn id(&self) -> u64 {
    self.0.id
  }

  pub fn class_name(&self) -> &str {
    &self.0.class_name
  }

  /// True if both handles refer to the same node.
  pub fn ptr_eq(&self, other: &Stage) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }

  pub fn number_of_input_ports(&self) -> usize {
    self.0.input_ports.len()
  }

  pub fn number_of_output_ports(&self) -> usize {
    self.0.output_port_count
  }

  pub fn input_port_info(&self, port: usize) -> RivuletResult<&PortInfo> {
    self.check_input_port(port)?;
    Ok(&self.0.input_ports[port])
  }

  /// Handle to output port `index`, suitable as an upstream connection.
  pub fn output_port(&self, index: usize) -> RivuletResult<OutputPort> {
    self.check_output_port(index)?;
    Ok(OutputPort {
      producer: self.clone(),
      index,
    })
  }

  pub fn number_of_input_connections(&self, port: usize) -> RivuletResult<usize> {
    self.check_input_port(port)?;
    Ok(self.0.state.read().inputs[port].len())
  }

  pub fn input_connection(&self, port: usize, index: usize) -> RivuletResult<Option<OutputPort>> {
    self.check_input_port(port)?;
    Ok(self.0.state.read().inputs[port].get(index).cloned())
  }

  pub fn input_connections(&self, port: usize) -> RivuletResult<Vec<OutputPort>> {
    self.check_input_port(port)?;
    Ok(self.0.state.read().inputs[port].clone())
  }

  /// Makes `upstream` the only connection on `port`.
  pub fn set_input_connection(&self, port: usize, upstream: OutputPort) -> RivuletResult<()> {
    self.check_input_port(port)?;
    let mut state = self.0.state.write();
    state.inputs[port] = vec![upstream];
    state.modified_at = next_timestamp();
    Ok(())
  }

  /// Appends `upstream` to the connections on `port`.
  pub fn add_input_connection(&self, port: usize, upstream: OutputPort) -> RivuletResult<()> {
    self.check_input_port(port)?;
    let mut state = self.0.state.write();
    state.inputs[port].push(upstream);
    state.modified_at = next_timestamp();
    Ok(())
  }

  pub fn remove_input_connection(&self, port: usize, index: usize) -> RivuletResult<OutputPort> {
    self.check_input_port(port)?;
    let mut state = self.0.state.write();
    let available = state.inputs[port].len();
    if index >= available {
      return Err(RivuletError::invalid_argument(format!(
        "{} has {} connections on input port {}, cannot remove connection {}",
        self.class_name(),
        available,
        port,
        index
      )));
    }
    let removed = state.inputs[port].remove(index);
    state.modified_at = next_timestamp();
    Ok(removed)
  }

  pub fn remove_all_input_connections(&self, port: usize) -> RivuletResult<()> {
    self.check_input_port(port)?;
    let mut state = self.0.state.write();
    state.inputs[port].clear();
    state.modified_at = next_timestamp();
    Ok(())
  }

  /// Replaces every connection on `port` with `connections`, in order.
  pub(crate) fn replace_input_connections(&self, port: usize, connections: Vec<OutputPort>) -> RivuletResult<()> {
    self.check_input_port(port)?;
    let mut state = self.0.state.write();
    state.inputs[port] = connections;
    state.modified_at = next_timestamp();
    Ok(())
  }

  /// The data last realized on output port `index`, if the stage has executed.
  pub fn output_data_object(&self, index: usize) -> RivuletResult<Option<DataHandle>> {
    self.check_output_port(index)?;
    Ok(self.0.state.read().outputs[index].clone())
  }

  /// Marks the stage as modified so its next update re-executes the kernel.
  pub fn modified(&self) {
    self.0.state.write().modified_at = next_timestamp();
  }

  pub fn modified_at(&self) -> u64 {
    self.0.state.read().modified_at
  }

  /// Timestamp of the last successful execution, if any.
  pub fn executed_at(&self) -> Option<u64> {
    self.0.state.read().executed_at
  }

  /// Mutates the kernel's parameters and marks the stage modified.
  /// Fails with `TypeMismatch` if the kernel is not a `K`.
  pub fn configure<K: Algorithm, R>(&self, f: impl FnOnce(&mut K) -> R) -> RivuletResult<R> {
    let result = {
      let mut guard = self.0.kernel.lock();
      let kernel: &mut dyn Algorithm = &mut **guard;
      let found = kernel.class_name().to_string();
      match kernel.as_any_mut().downcast_mut::<K>() {
        Some(typed) => f(typed),
        None => {
          return Err(RivuletError::TypeMismatch {
            expected: std::any::type_name::<K>().to_string(),
            found,
          })
        }
      }
    };
    self.modified();
    Ok(result)
  }

  pub(crate) fn lock_invocation(&self) -> ReentrantMutexGuard<'_, ()> {
    self.0.invocation_lock.lock()
  }

  pub(crate) fn check_input_port(&self, port: usize) -> RivuletResult<()> {
    let available = self.0.input_ports.len();
    if port >= available {
      return Err(RivuletError::PortOutOfRange {
        stage: self.class_name().to_string(),
        direction: PortDirection::Input,
        port,
        available,
      });
    }
    Ok(())
  }

  pub(crate) fn check_output_port(&self, port: usize) -> RivuletResult<()> {
    let available = self.0.output_port_count;
    if port >= available {
      return Err(RivuletError::PortOutOfRange {
        stage: self.class_name().to_string(),
        direction: PortDirection::Output,
        port,
        available,
      });
    }
    Ok(())
  }
}

impl fmt::Debug for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Stage")
      .field("id", &self.0.id)
      .field("class_name", &self.0.class_name)
      .field("input_ports", &self.0.input_ports.len())
      .field("output_ports", &self.0.output_port_count)
      .finish()
  }
}
