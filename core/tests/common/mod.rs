// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use anyhow::bail;
use rivulet::{Algorithm, DataHandle, FieldData, FnFilter, PortInfo, Stage};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Data helpers ---

pub const VALUES: &str = "values";

pub fn field(values: &[f64]) -> DataHandle {
  DataHandle::new(FieldData::new().with_array(VALUES, values.to_vec()))
}

pub fn values_of(handle: &DataHandle) -> Vec<f64> {
  handle
    .with(|f: &FieldData| f.array(VALUES).map(<[f64]>::to_vec).unwrap_or_default())
    .unwrap_or_default()
}

fn concat(port: &[DataHandle]) -> Vec<f64> {
  port.iter().flat_map(|handle| values_of(handle)).collect()
}

// --- Common Stage Creators ---

/// Counts executions of every stage built by `scale`.
pub static SCALE_EXECUTIONS: once_cell::sync::Lazy<Arc<AtomicUsize>> =
  once_cell::sync::Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  SCALE_EXECUTIONS.store(0, Ordering::SeqCst);
}

/// One input, one output: a new field with every value multiplied by `factor`.
pub fn scale(factor: f64) -> Stage {
  FnFilter::unary("Scale", move |input: &DataHandle| {
    SCALE_EXECUTIONS.fetch_add(1, Ordering::SeqCst);
    let scaled: Vec<f64> = values_of(input).iter().map(|v| v * factor).collect();
    Ok(field(&scaled))
  })
}

/// Passes its input through, failing on negative values.
pub fn reject_negative() -> Stage {
  FnFilter::unary("RejectNegative", |input: &DataHandle| {
    if values_of(input).iter().any(|v| *v < 0.0) {
      bail!("negative value in input");
    }
    Ok(input.clone())
  })
}

/// One input port (repeatable or not) whose connection count at execution
/// time is recorded in `observed`; outputs the concatenation of all inputs.
pub fn gather(repeatable: bool, observed: Arc<AtomicUsize>) -> Stage {
  let port = if repeatable {
    PortInfo::required("inputs").repeatable()
  } else {
    PortInfo::required("inputs")
  };
  FnFilter::builder("Gather").input(port).outputs(1).build(move |inputs| {
    observed.store(inputs[0].len(), Ordering::SeqCst);
    Ok(vec![field(&concat(&inputs[0]))])
  })
}

/// Two inputs (primary required, secondary optional), two outputs: output 0
/// carries the primary values, output 1 the secondary values.
pub fn mixer() -> Stage {
  FnFilter::builder("Mixer")
    .input(PortInfo::required("primary"))
    .input(PortInfo::optional("secondary"))
    .outputs(2)
    .build(|inputs| Ok(vec![field(&concat(&inputs[0])), field(&concat(&inputs[1]))]))
}

/// A kernel that, like most real filters, reuses a single output object and
/// rewrites it on every execution.
#[derive(Debug)]
pub struct InPlaceScale {
  pub factor: f64,
  output: DataHandle,
}

impl InPlaceScale {
  pub fn new(factor: f64) -> Self {
    InPlaceScale {
      factor,
      output: DataHandle::new(FieldData::new()),
    }
  }
}

impl Algorithm for InPlaceScale {
  fn class_name(&self) -> &str {
    "InPlaceScale"
  }

  fn input_ports(&self) -> Vec<PortInfo> {
    vec![PortInfo::required("input")]
  }

  fn number_of_output_ports(&self) -> usize {
    1
  }

  fn request_data(&mut self, inputs: &[Vec<DataHandle>]) -> anyhow::Result<Vec<DataHandle>> {
    let scaled: Vec<f64> = concat(&inputs[0]).iter().map(|v| v * self.factor).collect();
    self
      .output
      .with_mut(|f: &mut FieldData| f.set_array(VALUES, scaled))
      .ok_or_else(|| anyhow::anyhow!("output is not field data"))?;
    Ok(vec![self.output.clone()])
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
