use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use stockledger_core::{AreaId, InventoryId, ProductId};
use stockledger_inventory::{Batch, allocate_fifo, apply_debits};

fn lots(count: usize) -> Vec<Batch> {
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default();
    let inventory_id = InventoryId::new();

    (0..count)
        .map(|i| {
            // Reverse expiry order so the sort does real work.
            let expiry = start + Duration::days((count - i) as i64);
            Batch::new(
                inventory_id,
                ProductId::new("BENCH"),
                AreaId::new("A1"),
                format!("{i}"),
                Some(expiry),
                Decimal::from(10 + (i % 7) as i64),
                Utc::now(),
            )
            .unwrap()
        })
        .collect()
}

fn bench_allocate_fifo(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_fifo");

    for count in [10usize, 100, 1_000] {
        let batches = lots(count);
        let required = Decimal::from((count * 8) as i64);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &batches, |b, batches| {
            b.iter(|| allocate_fifo(black_box(batches), black_box(required)));
        });
    }

    group.finish();
}

fn bench_allocate_and_apply(c: &mut Criterion) {
    let batches = lots(200);
    let required = Decimal::from(1_500);

    c.bench_function("allocate_and_apply_200_lots", |b| {
        b.iter(|| {
            let allocation = allocate_fifo(black_box(&batches), required);
            apply_debits(&batches, &allocation.debits, Utc::now()).unwrap()
        });
    });
}

criterion_group!(benches, bench_allocate_fifo, bench_allocate_and_apply);
criterion_main!(benches);
