use std::hint::black_box;

use chat_insights::enrichment::{Markers, enrich};
use chat_insights::models::{Message, RoleEntry};
use chat_insights::roles::{RoleTable, join};
use chrono::{Duration, NaiveDate};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

const AUTHORS: [&str; 6] = ["anna", "bram", "cees", "daan", "eva", "guest"];

/// Generate N messages rotating through a few authors, one every 47 seconds
fn generate_messages(num_messages: usize) -> Vec<Message> {
    let t0 = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
    (0..num_messages)
        .map(|i| {
            let text = match i % 10 {
                0 => "<Media weggelaten>".to_string(),
                1 => "<https://tikkie.me/pay/abc> voor de bus".to_string(),
                _ => format!("Bericht nummer {} over de wedstrijd van zaterdag", i),
            };
            Message::new(
                AUTHORS[(i * 7 / 3) % AUTHORS.len()],
                t0 + Duration::seconds(47 * i as i64),
                Some(&text),
            )
        })
        .collect()
}

fn role_table() -> RoleTable {
    RoleTable::from_entries(vec![
        RoleEntry::new("anna", "Player"),
        RoleEntry::new("bram", "Player"),
        RoleEntry::new("cees", "Staff"),
        RoleEntry::new("daan", "Keeper"),
        RoleEntry::new("eva", "Parent"),
    ])
    .unwrap()
}

fn bench_enrich(c: &mut Criterion) {
    let mut group = c.benchmark_group("enrich");
    let markers = Markers::default();

    for size in [1_000, 10_000, 100_000].iter() {
        let messages = generate_messages(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| enrich(black_box(&messages), &markers).unwrap());
        });
    }

    group.finish();
}

fn bench_enrich_and_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("enrich_and_join");
    let markers = Markers::default();
    let roles = role_table();

    for size in [1_000, 10_000, 100_000].iter() {
        let messages = generate_messages(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let enriched = enrich(black_box(&messages), &markers).unwrap();
                join(enriched, &roles)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_enrich, bench_enrich_and_join);
criterion_main!(benches);
