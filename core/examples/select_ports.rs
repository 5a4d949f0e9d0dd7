// rivulet/examples/select_ports.rs

use rivulet::{select_ports, DataHandle, FieldData, FnFilter, Outputs, PortInfo, RivuletResult, Stage, TrivialProducer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const VALUES: &str = "values";

fn values_of(handle: &DataHandle) -> Vec<f64> {
  handle
    .with(|f: &FieldData| f.array(VALUES).map(<[f64]>::to_vec).unwrap_or_default())
    .unwrap_or_default()
}

fn field(values: &[f64]) -> DataHandle {
  DataHandle::new(FieldData::new().with_array(VALUES, values.to_vec()))
}

// Splits its input into values below and at-or-above a threshold.
fn partition(threshold: f64) -> Stage {
  FnFilter::builder("Partition")
    .input(PortInfo::required("input"))
    .outputs(2)
    .build(move |inputs| {
      let values = values_of(&inputs[0][0]);
      let (low, high): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|v| *v < threshold);
      Ok(vec![field(&low), field(&high)])
    })
}

// Adds a constant, taken from an optional second input, to every value.
fn offset_by() -> Stage {
  FnFilter::builder("OffsetBy")
    .input(PortInfo::required("values"))
    .input(PortInfo::optional("offset"))
    .build(|inputs| {
      let delta = inputs[1].first().map(values_of).and_then(|v| v.first().copied()).unwrap_or(0.0);
      let shifted: Vec<f64> = values_of(&inputs[0][0]).iter().map(|v| v + delta).collect();
      Ok(vec![field(&shifted)])
    })
}

fn main() -> RivuletResult<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  info!("--- Port Selection Example ---");

  let split = partition(5.0);
  let shift = offset_by();

  (field(&[1.0, 7.0, 3.0, 9.0]) >> &split)?;
  // Second output of `split` into the first input of `shift`.
  let pipeline = (select_ports!(&split, 1)? >> &shift)?;
  // A constant into the second input of `shift`.
  (TrivialProducer::stage(field(&[100.0])) >> select_ports!(1, &shift)?)?;

  if let Some(values) = pipeline.update()?.output()?.as_single() {
    info!(values = ?values_of(values), "High values, shifted.");
  }

  // Calling a selector feeds the selected input for this call only.
  if let Some(values) = select_ports!(1, &shift)?.call(field(&[-100.0]))?.as_single() {
    info!(values = ?values_of(values), "High values, offset overridden once.");
  }

  // A stage with several outputs yields all of them, in port order.
  match split.run()? {
    Outputs::Tuple(parts) => {
      for (port, part) in parts.iter().enumerate() {
        info!(port, values = ?values_of(part), "Partition output.");
      }
    }
    Outputs::Single(_) => warn!("Expected two outputs."),
  }

  // Malformed selectors are reported, not guessed at.
  if let Err(e) = select_ports!(1, 2) {
    warn!(error = %e, "Rejected selector.");
  }

  info!("--- Port Selection Example Finished ---");
  Ok(())
}
