use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use fiskal::bill::{Invoice, InvoiceBuilder, LineBuilder, PartyBuilder};
use fiskal::core::Code;
use fiskal::num::Amount;
use fiskal::registry::Registry;
use fiskal::tax::{CATEGORY_VAT, Combo, RATE_GENERAL, RATE_REDUCED};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn invoice(lines: usize) -> Invoice {
    let mut builder = InvoiceBuilder::new("DE", "BENCH-001", date(2020, 9, 15))
        .supplier(PartyBuilder::new("Benchmark GmbH").tax_id("DE", "DE123456789").build());
    for i in 0..lines {
        let rate = if i % 3 == 0 { RATE_REDUCED } else { RATE_GENERAL };
        builder = builder.add_line(
            LineBuilder::new(
                format!("Position {i}"),
                Amount::new((i % 7 + 1) as i64, 0),
                Amount::new(1999 + i as i64, 2),
            )
            .tax(Combo::new(CATEGORY_VAT).with_rate(rate))
            .build(),
        );
    }
    builder.build_unchecked().unwrap()
}

fn bench_rate_lookup(c: &mut Criterion) {
    let registry = Registry::bundled();
    let ctx = registry.context(&Code::from("DE"), &[]).unwrap();
    let on = date(2020, 9, 15);
    c.bench_function("combo_calculate_de_general", |b| {
        b.iter(|| {
            let mut combo = Combo::new(CATEGORY_VAT).with_rate(RATE_GENERAL);
            combo.calculate(&ctx, black_box(on)).unwrap();
            black_box(combo.percent)
        });
    });
}

fn bench_process(c: &mut Criterion) {
    let registry = Registry::bundled();
    let small = invoice(10);
    let large = invoice(1000);
    c.bench_function("process_invoice_10_lines", |b| {
        b.iter(|| {
            let mut inv = small.clone();
            registry.process(&mut inv).unwrap();
            black_box(inv.totals)
        });
    });
    c.bench_function("process_invoice_1000_lines", |b| {
        b.iter(|| {
            let mut inv = large.clone();
            registry.process(&mut inv).unwrap();
            black_box(inv.totals)
        });
    });
}

criterion_group!(benches, bench_rate_lookup, bench_process);
criterion_main!(benches);
