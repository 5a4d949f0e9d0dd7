use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rivulet::{select_ports, Chain, DataHandle, FieldData, FnFilter, PortInfo, RivuletResult, Stage, TrivialProducer};
use std::hint::black_box;

const VALUES: &str = "values";

// --- Helpers ---
fn field(len: usize) -> DataHandle {
  DataHandle::new(FieldData::new().with_array(VALUES, (0..len).map(|i| i as f64).collect()))
}

fn offset(delta: f64) -> Stage {
  FnFilter::unary("Offset", move |input: &DataHandle| {
    let shifted = input
      .with(|f: &FieldData| f.array(VALUES).unwrap_or_default().iter().map(|v| v + delta).collect::<Vec<_>>())
      .unwrap_or_default();
    Ok(DataHandle::new(FieldData::new().with_array(VALUES, shifted)))
  })
}

fn linear_chain(length: usize) -> RivuletResult<Chain> {
  let mut chain = (offset(1.0) >> offset(1.0))?;
  for _ in 2..length {
    chain = (chain >> offset(1.0))?;
  }
  Ok(chain)
}

// --- Benchmarks ---
fn bench_composition(c: &mut Criterion) {
  let mut group = c.benchmark_group("Composition");
  for length in [2usize, 8, 32] {
    group.throughput(Throughput::Elements(length as u64));
    group.bench_with_input(BenchmarkId::new("linear_chain", length), &length, |b, &length| {
      b.iter(|| black_box(linear_chain(length).expect("compose")));
    });
  }

  group.bench_function("select_ports", |b| {
    let splitter = FnFilter::builder("Split")
      .input(PortInfo::required("input"))
      .outputs(2)
      .build(|inputs| Ok(vec![inputs[0][0].clone(), inputs[0][0].clone()]));
    b.iter(|| {
      let selector = select_ports!(&splitter, 1).expect("selector");
      black_box((selector >> offset(0.0)).expect("compose"))
    });
  });
  group.finish();
}

fn bench_update(c: &mut Criterion) {
  let mut group = c.benchmark_group("Update");
  let chain = (field(1_000) >> linear_chain(8).expect("compose")).expect("compose");
  chain.update().expect("warm up");

  group.bench_function("up_to_date_chain_of_8", |b| {
    b.iter(|| black_box(chain.update().expect("update")));
  });

  group.bench_function("modified_head_chain_of_8", |b| {
    b.iter(|| {
      chain.first_stage().modified();
      black_box(chain.update().expect("update"))
    });
  });
  group.finish();
}

fn bench_call(c: &mut Criterion) {
  let mut group = c.benchmark_group("Call");
  for len in [16usize, 1_024, 65_536] {
    let chain = linear_chain(4).expect("compose");
    let input = field(len);
    group.throughput(Throughput::Elements(len as u64));
    group.bench_with_input(BenchmarkId::new("chain_of_4", len), &input, |b, input| {
      b.iter(|| black_box(chain.call(input).expect("call")));
    });
  }

  let source = TrivialProducer::stage(field(1_024));
  let chain = (&source >> linear_chain(4).expect("compose")).expect("compose");
  group.bench_function("run_wired_chain_of_4", |b| {
    b.iter(|| black_box(chain.run().expect("run")));
  });
  group.finish();
}

criterion_group!(benches, bench_composition, bench_update, bench_call);
criterion_main!(benches);
