use chrono::{Duration, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scenario_analysis::duration::duration_curves;
use scenario_analysis::{polyfit, DispatchAggregator, ScenarioTable};

const HOURS: usize = 8760;

fn year_table() -> ScenarioTable {
    let start = NaiveDateTime::parse_from_str("2014-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let mut table = ScenarioTable::new((0..HOURS).map(|h| start + Duration::hours(h as i64)).collect());

    let names = [
        "DE_load", "DE_wind", "DE_solar", "DE_lignite", "DE_hard_coal", "DE_gas_ccgt",
        "DE_gas_ocgt", "DE_uranium", "DE_biomass", "DE_run_of_river", "powerline_DE_AT",
        "powerline_AT_DE", "powerline_DE_FR", "powerline_FR_DE", "phs_in_DE", "phs_out_DE",
        "phs_level_DE",
    ];
    for (i, name) in names.iter().enumerate() {
        let values = (0..HOURS)
            .map(|h| 1000.0 * (i + 1) as f64 + 100.0 * ((h + i) % 24) as f64)
            .collect();
        table.push_column(name, values).unwrap();
    }
    table
}

fn benchmark_polyfit(c: &mut Criterion) {
    let x: Vec<f64> = (0..HOURS).map(|h| 30000.0 + 5.0 * h as f64).collect();
    let y: Vec<f64> = x.iter().map(|x| 1e-12 * x.powi(3) - 1e-8 * x * x + 0.002 * x).collect();

    c.bench_function("polyfit_degree_3_one_year", |b| {
        b.iter(|| black_box(polyfit(&x, &y, 3).unwrap()));
    });
}

fn benchmark_dispatch(c: &mut Criterion) {
    let table = year_table();
    let aggregator = DispatchAggregator::new("DE").unwrap();

    c.bench_function("aggregate_dispatch_one_year", |b| {
        b.iter(|| black_box(aggregator.aggregate(&table).unwrap()));
    });

    let dispatch = aggregator.aggregate(&table).unwrap();
    c.bench_function("duration_curves_one_year", |b| {
        b.iter(|| black_box(duration_curves(&dispatch)));
    });
}

criterion_group!(benches, benchmark_polyfit, benchmark_dispatch);
criterion_main!(benches);
