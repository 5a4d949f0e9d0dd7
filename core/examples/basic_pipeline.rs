// rivulet/examples/basic_pipeline.rs

use rivulet::{DataHandle, FieldData, FnFilter, Output, RivuletResult, Stage};
use tracing::info;
use tracing_subscriber::EnvFilter;

const VALUES: &str = "values";

fn values_of(handle: &DataHandle) -> Vec<f64> {
  handle
    .with(|f: &FieldData| f.array(VALUES).map(<[f64]>::to_vec).unwrap_or_default())
    .unwrap_or_default()
}

// 1. Stages are built from kernels. `FnFilter::unary` wraps a closure with one
//    input and one output port.
fn map_values(name: &str, f: impl Fn(f64) -> f64 + Send + 'static) -> Stage {
  FnFilter::unary(name, move |input: &DataHandle| {
    let mapped: Vec<f64> = values_of(input).into_iter().map(&f).collect();
    Ok(DataHandle::new(FieldData::new().with_array(VALUES, mapped)))
  })
}

fn main() -> RivuletResult<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  info!("--- Basic Pipeline Example ---");

  let square = map_values("Square", |v| v * v);
  let halve = map_values("Halve", |v| v / 2.0);

  // 2. Compose. A data object on the left becomes a source stage; nothing
  //    executes yet. The pipeline itself starts at `square`, so a one-off
  //    call (step 5) can stand in for that source.
  let input = DataHandle::new(FieldData::new().with_array(VALUES, vec![1.0, 2.0, 3.0]));
  (&input >> &square)?;
  let pipeline = (&square >> &halve)?;
  info!(executed = square.executed_at().is_some(), "Pipeline composed.");

  // 3. Update pulls data through every stage up to the last one.
  let result = pipeline.update()?.output()?;
  if let Some(values) = result.as_single() {
    info!(values = ?values_of(values), "Pipeline updated.");
  }

  // 4. Accessing an intermediate stage's output executes only what it needs.
  let squared = Output::new(&square)?.output()?;
  if let Some(values) = squared.as_single() {
    info!(values = ?values_of(values), "Intermediate output.");
  }

  // 5. A one-off call runs the same stages against other data and hands back
  //    copies; the pipeline keeps its own source connected.
  let other = DataHandle::new(FieldData::new().with_array(VALUES, vec![10.0]));
  if let Some(values) = pipeline.call(&other)?.as_single() {
    info!(values = ?values_of(values), "One-off call.");
  }
  if let Some(values) = pipeline.update()?.output()?.as_single() {
    info!(values = ?values_of(values), "Pipeline still wired to its original input.");
  }

  info!("--- Basic Pipeline Example Finished ---");
  Ok(())
}
