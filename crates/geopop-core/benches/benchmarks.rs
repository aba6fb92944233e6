//! Resolution and disambiguation benchmarks over a synthetic country of
//! 8000 municipalities in 100 provinces and 20 regions.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geopop_core::{
    AgeCount, ComposeOptions, Disambiguator, Geopop, Level, Municipality, Series, Snapshot,
};
use std::hint::black_box;
use std::sync::Arc;

const MUNICIPALITIES: u32 = 8000;

fn letter(n: u32) -> char {
    char::from(b'A' + (n % 26) as u8)
}

fn synthetic_snapshot() -> Snapshot {
    let mut munis = Vec::with_capacity(MUNICIPALITIES as usize);
    let mut counts = Vec::new();
    for i in 0..MUNICIPALITIES {
        let province = i % 100 + 1;
        let region = province % 20 + 1;
        let code = province * 1000 + i / 100 + 1;
        munis.push(Municipality {
            municipality_code: code,
            municipality: format!("Comune {i} sul Fiume"),
            cadastral_code: format!("{}{:03}", letter(i / 1000), i % 1000),
            province_code: province,
            province: format!("Provincia {province}"),
            province_short: format!("{}{}", letter(province / 26), letter(province % 26)),
            region_code: Some(region),
            region: Some(format!("Regione {region}")),
            population: None,
            population_f: None,
            population_m: None,
        });
        for age in (0..100).step_by(5) {
            counts.push(AgeCount::new(code, age, f64::from(age % 7), f64::from(age % 3)));
        }
    }
    Snapshot::from_tables(2022, munis, counts)
}

fn bench_resolve(c: &mut Criterion) {
    let geo = Geopop::new(Arc::new(synthetic_snapshot()));
    let mut group = c.benchmark_group("resolve");

    for n in [100usize, 1000, 10_000] {
        let series: Series = (0..n)
            .map(|i| format!("comune {} sul fiume", i % MUNICIPALITIES as usize))
            .collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("names", n), &series, |b, series| {
            b.iter(|| geo.from_municipality(black_box(series)))
        });
    }

    let codes: Series = geo
        .municipalities()
        .iter()
        .map(|m| m.municipality_code)
        .collect();
    group.bench_function("codes_all", |b| {
        b.iter(|| geo.from_municipality(black_box(&codes)))
    });
    group.finish();
}

fn bench_disambiguate(c: &mut Criterion) {
    let geo = Geopop::new(Arc::new(synthetic_snapshot()));
    let names: Vec<String> = geo
        .provinces()
        .iter()
        .map(|p| p.province.to_lowercase())
        .collect();
    let disambiguator = Disambiguator::new(&names);

    c.bench_function("disambiguate_hit", |b| {
        b.iter(|| disambiguator.find(black_box("ufficio anagrafe della provincia 42")))
    });
    c.bench_function("disambiguate_miss", |b| {
        b.iter(|| disambiguator.find(black_box("nessun luogo conosciuto qui")))
    });

    let texts: Series = (0..500)
        .map(|i| format!("Ufficio della Provincia {} (sede)", i % 100 + 1))
        .collect();
    c.bench_function("smart_resolve_500", |b| {
        b.iter(|| geo.smart_from_province(black_box(&texts)))
    });
}

fn bench_compose(c: &mut Criterion) {
    c.bench_function("compose_region_cold", |b| {
        b.iter_with_setup(synthetic_snapshot, |snapshot| {
            snapshot.compose(&ComposeOptions::new(Level::Region)).map(|f| f.len())
        })
    });
}

criterion_group!(benches, bench_resolve, bench_disambiguate, bench_compose);
criterion_main!(benches);
