// tests/pipeline_execution_tests.rs
mod common; // Reference the common module

use common::*;
use rivulet::{Output, RivuletResult, Stage, TrivialProducer};
use serial_test::serial;
use std::sync::atomic::Ordering;

#[test]
#[serial]
fn test_only_out_of_date_stages_re_execute() -> RivuletResult<()> {
  setup_tracing();
  reset_counters();
  let head = scale(2.0);
  let middle = scale(3.0);
  let tail = scale(4.0);
  let chain = (field(&[1.0]) >> &head >> &middle >> &tail)?;

  chain.update()?;
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 3);

  // Touching the middle stage re-runs it and everything downstream of it.
  middle.modified();
  chain.update()?;
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 5);

  // Touching the tail re-runs only the tail.
  tail.modified();
  let out = chain.update()?.output()?.into_single().expect("single output");
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 6);
  assert_eq!(values_of(&out), vec![24.0]);
  Ok(())
}

#[test]
#[serial]
fn test_shared_upstream_executes_once_per_change() -> RivuletResult<()> {
  setup_tracing();
  reset_counters();
  let source = TrivialProducer::stage(field(&[1.0, 2.0]));
  let shared = scale(10.0);
  let left = scale(1.0);
  let right = scale(-1.0);
  (&source >> &shared >> &left)?;
  (&shared >> &right)?;

  let left_out = Output::new(&left)?.output()?.into_single().expect("single output");
  let right_out = Output::new(&right)?.output()?.into_single().expect("single output");
  assert_eq!(values_of(&left_out), vec![10.0, 20.0]);
  assert_eq!(values_of(&right_out), vec![-10.0, -20.0]);
  // shared, left, right: the second consumer found `shared` up to date.
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 3);
  Ok(())
}

#[test]
#[serial]
fn test_reconfigured_source_propagates_downstream() -> RivuletResult<()> {
  setup_tracing();
  reset_counters();
  let source = TrivialProducer::stage(field(&[1.0]));
  let chain = (&source >> scale(5.0))?;
  chain.update()?;

  source.configure(|producer: &mut TrivialProducer| producer.set_output(field(&[2.0])))?;
  let out = chain.update()?.output()?.into_single().expect("single output");
  assert_eq!(values_of(&out), vec![10.0]);
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 2);
  Ok(())
}

#[test]
#[serial]
fn test_rewiring_marks_consumer_modified() -> RivuletResult<()> {
  setup_tracing();
  reset_counters();
  let consumer: Stage = scale(1.0);
  (field(&[1.0]) >> &consumer)?;
  consumer.update()?;
  let executed = consumer.executed_at().expect("executed");

  (field(&[7.0]) >> &consumer)?;
  assert!(consumer.modified_at() > executed);
  let out = Output::new(&consumer)?.output()?.into_single().expect("single output");
  assert_eq!(values_of(&out), vec![7.0]);
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 2);
  Ok(())
}

#[test]
#[serial]
fn test_call_re_executes_even_when_up_to_date() -> RivuletResult<()> {
  setup_tracing();
  reset_counters();
  let chain = (field(&[1.0]) >> scale(2.0) >> scale(2.0))?;
  chain.update()?;
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 2);

  // A run with no input and nothing modified reuses the cached outputs.
  let cached = chain.run()?.into_single().expect("single output");
  assert_eq!(values_of(&cached), vec![4.0]);
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 2);

  let fresh = (scale(2.0) >> scale(2.0))?;
  fresh.call(field(&[3.0]))?;
  fresh.call(field(&[3.0]))?;
  // Each call brings a new source, so both stages run every time.
  assert_eq!(SCALE_EXECUTIONS.load(Ordering::SeqCst), 6);
  Ok(())
}
