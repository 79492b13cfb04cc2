use criterion::{black_box, criterion_group, criterion_main, Criterion};
use schema_lens::prelude::*;
use schema_lens::translate_delta;

/// A linear chain of `depth` renames of one field, plus the version ids.
fn rename_chain(depth: usize) -> (Lineage, Vec<VersionId>) {
    let mut lineage = Lineage::new();
    let mut current = lineage.add_field(EMPTY_SCHEMA, "f0").unwrap();
    let mut chain = vec![current];
    for i in 1..=depth {
        current = lineage
            .rename_field(current, &format!("f{}", i - 1), &format!("f{i}"))
            .unwrap();
        chain.push(current);
    }
    (lineage, chain)
}

fn bench_translate(c: &mut Criterion) {
    let (lineage, chain) = rename_chain(100);
    let first = chain[0];
    let last = *chain.last().unwrap();
    let delta = Delta::set(first, "f0", 1u64);

    c.bench_function("translate_delta upgrade x100 steps", |b| {
        b.iter(|| black_box(translate_delta(&delta, last, &lineage).unwrap()))
    });

    let delta = Delta::set(last, "f100", 1u64);
    c.bench_function("translate_delta downgrade x100 steps", |b| {
        b.iter(|| black_box(translate_delta(&delta, first, &lineage).unwrap()))
    });
}

fn bench_read(c: &mut Criterion) {
    let (lineage, chain) = rename_chain(10);
    let first = chain[0];
    let last = *chain.last().unwrap();

    let view = lineage.new_instance::<u64, &str, _>(first, []).unwrap();
    for i in 0..1000 {
        view.set("f0", i).unwrap();
    }
    let reader = view.at(last);

    c.bench_function("View::read 1000 deltas x10 steps", |b| {
        b.iter(|| black_box(reader.read(&lineage).unwrap()))
    });

    c.bench_function("View::read 1000 deltas same version", |b| {
        b.iter(|| black_box(view.read(&lineage).unwrap()))
    });
}

fn bench_write(c: &mut Criterion) {
    let (lineage, chain) = rename_chain(1);

    c.bench_function("View::set x1000", |b| {
        b.iter(|| {
            let view = lineage.new_instance::<u64, &str, _>(chain[1], []).unwrap();
            for i in 0..1000 {
                view.set("f1", i).unwrap();
            }
            black_box(view.ledger().len().unwrap())
        })
    });
}

criterion_group!(benches, bench_translate, bench_read, bench_write);
criterion_main!(benches);
