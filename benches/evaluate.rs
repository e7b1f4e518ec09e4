use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fieldgate::{line, Engine, FieldValueStore, RuleSet, RuleSetBuilder};

/// Build a form with `n` independent conditionals, each hiding one field
/// when its own trigger field reads "yes".
fn build_flat(n: usize) -> (RuleSet, FieldValueStore) {
    let mut builder = RuleSetBuilder::new();
    let mut store = FieldValueStore::new();
    for i in 0..n {
        let trigger = format!("fld_q{i}");
        let target = format!("fld_a{i}");
        builder = builder.conditional(&format!("con_{i}"), move |c| {
            c.hide().when(line(&trigger).is("yes")).target(&target)
        });
        store = store.with(&format!("fld_a{i}"), "answer");
    }
    (builder.compile().unwrap(), store)
}

/// Build a chain where each field is shown only while the previous one holds
/// a value, so clearing the head cascades through all `n` fields.
fn build_chain(n: usize) -> (RuleSet, FieldValueStore) {
    let mut builder = RuleSetBuilder::new();
    for i in 1..=n {
        let prev = format!("fld_{}", i - 1);
        let next = format!("fld_{i}");
        builder = builder.conditional(&format!("con_{i}"), move |c| {
            c.show().when(line(&prev).isnot("")).target(&next)
        });
    }
    let store = (0..=n).map(|i| (format!("fld_{i}"), "x")).collect();
    (builder.compile().unwrap(), store)
}

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pass");

    for &n in &[5, 50, 200] {
        let (ruleset, store) = build_flat(n);
        let ruleset = std::sync::Arc::new(ruleset);
        group.bench_function(&format!("{n}_conditionals_initialize"), |b| {
            b.iter(|| Engine::initialize(ruleset.clone(), black_box(store.clone())));
        });
    }

    group.finish();
}

fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental");

    for &n in &[5, 50, 200] {
        let (ruleset, store) = build_flat(n);
        let mut engine = Engine::initialize(ruleset, store);
        let mut toggle = false;
        group.bench_function(&format!("{n}_conditionals_single_change"), |b| {
            b.iter(|| {
                toggle = !toggle;
                engine.on_field_changed(black_box("fld_q0"), if toggle { "yes" } else { "no" })
            });
        });
    }

    for &n in &[10, 100] {
        let (ruleset, store) = build_chain(n);
        let ruleset = std::sync::Arc::new(ruleset);
        group.bench_function(&format!("{n}_chain_cascade"), |b| {
            b.iter_batched(
                || Engine::initialize(ruleset.clone(), store.clone()),
                |mut engine| engine.on_field_cleared(black_box("fld_0")),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_exchange(c: &mut Criterion) {
    let (ruleset, _) = build_flat(50);
    let json = ruleset.to_json();
    c.bench_function("exchange_decode_50", |b| {
        b.iter(|| RuleSet::from_json(black_box(&json)).unwrap());
    });
}

criterion_group!(benches, bench_full_pass, bench_incremental, bench_exchange);
criterion_main!(benches);
