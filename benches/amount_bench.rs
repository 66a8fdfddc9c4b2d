use criterion::{Criterion, black_box, criterion_group, criterion_main};

use fiskal::num::{Amount, Formatter, Percentage, Rounding};

fn amounts(n: i64) -> Vec<Amount> {
    (1..=n).map(|i| Amount::new(i * 137 % 100_000, 2)).collect()
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("amount_parse", |b| {
        b.iter(|| black_box("-1234567.8900".parse::<Amount>()));
    });
    c.bench_function("percentage_parse", |b| {
        b.iter(|| black_box("21.5%".parse::<Percentage>()));
    });
}

fn bench_arithmetic(c: &mut Criterion) {
    let a = Amount::new(123_456_789, 4);
    let b2 = Amount::new(3_333, 3);
    c.bench_function("amount_multiply", |b| {
        b.iter(|| black_box(black_box(a).multiply(black_box(b2))));
    });
    c.bench_function("amount_divide", |b| {
        b.iter(|| black_box(black_box(a).divide(black_box(b2))));
    });
    c.bench_function("amount_round_half_even", |b| {
        b.iter(|| black_box(black_box(a).round(2, Rounding::HalfEven)));
    });
}

fn bench_tax_of_many(c: &mut Criterion) {
    let lines = amounts(10_000);
    let pct = Percentage::new(21, 2);
    c.bench_function("percentage_of_10000_lines", |b| {
        b.iter(|| {
            let tax = lines
                .iter()
                .map(|a| pct.of(a.upscale(2)))
                .fold(Amount::zero(4), Amount::add);
            black_box(tax.round(2, Rounding::HalfUp))
        });
    });
    c.bench_function("amount_sum_10000", |b| {
        b.iter(|| black_box(Amount::sum(lines.iter().copied())));
    });
}

fn bench_format(c: &mut Criterion) {
    let f = Formatter::new(",", ".").with_unit("€").with_template("%n %u");
    let a = Amount::new(-123_456_789, 2);
    c.bench_function("formatter_amount", |b| {
        b.iter(|| black_box(f.format_amount(black_box(a))));
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_arithmetic,
    bench_tax_of_many,
    bench_format,
);
criterion_main!(benches);
