use criterion::BenchmarkGroup;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use quark::core::ScopeIndex;
use quark::core::Value;
use quark::vm::Vm;
use quark::vm::VmConfig;
use quark::vm::VmTemplate;
use std::hint::black_box;
use triomphe::Arc;

const COUNTS: &[usize] = &[16, 256, 4096];

fn bench_value_index(criterion: &mut Criterion) {
  let template: Arc<VmTemplate> = Vm::template(VmConfig::new()).unwrap().freeze().unwrap();
  let mut group: BenchmarkGroup<_> = criterion.benchmark_group("value_index");

  group.bench_function("hit", |bench| {
    let vm: Vm = VmTemplate::instance(&template).unwrap();
    let _ignore: ScopeIndex = vm.global_index(&mut Value::string("constant"), true).unwrap();

    bench.iter(|| {
      let mut value: Value<'_> = Value::string("constant");
      black_box(vm.global_index(&mut value, true).unwrap());
    })
  });

  for count in COUNTS {
    let id: BenchmarkId = BenchmarkId::new("global-numbers", count);

    group.bench_with_input(id, count, |bench, &count| {
      bench.iter(|| {
        let vm: Vm = VmTemplate::instance(&template).unwrap();

        for number in 0..count {
          let mut value: Value<'_> = Value::number(number as f64);
          black_box(vm.global_index(&mut value, true).unwrap());
        }
      })
    });

    let texts: Vec<String> = (0..*count).map(|index| format!("ünïcödé string #{index:0>40}")).collect();
    let id: BenchmarkId = BenchmarkId::new("multibyte-strings", count);

    group.bench_with_input(id, &texts, |bench, texts| {
      bench.iter(|| {
        let vm: Vm = VmTemplate::instance(&template).unwrap();

        for text in texts {
          let mut value: Value<'_> = Value::string(text);
          black_box(vm.value_index(&mut value, true).unwrap());
        }
      })
    });
  }

  group.finish();
}

criterion_group! {
  name = benches;
  config = Criterion::default();
  targets = bench_value_index
}

criterion_main!(benches);
