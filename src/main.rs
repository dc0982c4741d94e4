use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use rayon::prelude::*;
use scenario_analysis::{AnalysisConfig, AnalysisReport, DataLoader, Language, ScenarioAnalysis};
use std::path::PathBuf;

mod dispatch_charts;
mod duration_charts;
mod price_charts;
mod style;

use style::ChartStyle;

const USAGE: &str = "\
Usage: scenario_charts [--all | --prices | --fit | --dispatch | --duration]...
                       [--config <file.json>] [--scenario <csv or glob>]
                       [--real-prices <csv>] [--output-dir <dir>] [--lang de|en]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartKind {
    Prices,
    PricesZoomed,
    PriceFit,
    DispatchWeek,
    DurationCurves,
    DurationStacked,
}

impl ChartKind {
    const ALL: [ChartKind; 6] = [
        ChartKind::Prices,
        ChartKind::PricesZoomed,
        ChartKind::PriceFit,
        ChartKind::DispatchWeek,
        ChartKind::DurationCurves,
        ChartKind::DurationStacked,
    ];

    fn file_name(&self) -> &'static str {
        match self {
            ChartKind::Prices => "prices.png",
            ChartKind::PricesZoomed => "prices_8_weeks.png",
            ChartKind::PriceFit => "price_fit.png",
            ChartKind::DispatchWeek => "dispatch_week.png",
            ChartKind::DurationCurves => "duration_curves.png",
            ChartKind::DurationStacked => "duration_stacked.png",
        }
    }

    fn render(&self, report: &AnalysisReport, config: &AnalysisConfig, style: &ChartStyle) -> Result<PathBuf> {
        let path = config.output_dir.join(self.file_name());
        match self {
            ChartKind::Prices => price_charts::draw_price_series(report, style, &path, None)?,
            ChartKind::PricesZoomed => {
                price_charts::draw_price_series(report, style, &path, Some(config.price_zoom_hours))?
            }
            ChartKind::PriceFit => price_charts::draw_price_fit(report, style, &path)?,
            ChartKind::DispatchWeek => dispatch_charts::draw_dispatch_week(report, config, style, &path)?,
            ChartKind::DurationCurves => duration_charts::draw_duration_curves(report, style, &path)?,
            ChartKind::DurationStacked => dispatch_charts::draw_stacked_by_load(report, style, &path)?,
        }
        Ok(path)
    }
}

fn parse_args(args: &[String]) -> Result<(AnalysisConfig, Vec<ChartKind>)> {
    let mut config_path: Option<String> = None;
    let mut overrides: Vec<(&str, &str)> = Vec::new();
    let mut charts: Vec<ChartKind> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--all" => charts.extend(ChartKind::ALL),
            "--prices" => charts.extend([ChartKind::Prices, ChartKind::PricesZoomed]),
            "--fit" => charts.push(ChartKind::PriceFit),
            "--dispatch" => charts.push(ChartKind::DispatchWeek),
            "--duration" => charts.extend([ChartKind::DurationCurves, ChartKind::DurationStacked]),
            "--config" | "--scenario" | "--real-prices" | "--output-dir" | "--lang" => {
                let value = iter
                    .next()
                    .with_context(|| format!("{} needs a value\n{}", arg, USAGE))?;
                if arg == "--config" {
                    config_path = Some(value.clone());
                } else {
                    overrides.push((arg.as_str(), value.as_str()));
                }
            }
            other => bail!("Unknown argument '{}'\n{}", other, USAGE),
        }
    }

    let mut config = match config_path {
        Some(path) => AnalysisConfig::from_json_file(&path)
            .with_context(|| format!("Failed to read config {}", path))?,
        None => AnalysisConfig::default(),
    };

    for (flag, value) in overrides {
        match flag {
            "--scenario" => config.scenario_path = value.to_string(),
            "--real-prices" => config.real_price_path = PathBuf::from(value),
            "--output-dir" => config.output_dir = PathBuf::from(value),
            "--lang" => {
                config.language = match value {
                    "de" => Language::De,
                    "en" => Language::En,
                    other => bail!("Unknown language '{}', expected de or en", other),
                }
            }
            _ => {}
        }
    }

    if charts.is_empty() {
        charts.extend(ChartKind::ALL);
    }
    let mut seen = Vec::with_capacity(charts.len());
    charts.retain(|c| {
        let first = !seen.contains(c);
        seen.push(*c);
        first
    });

    Ok((config, charts))
}

fn print_describe(report: &AnalysisReport) {
    println!(
        "\n{:<18} {:>8} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for stats in &report.price_stats {
        println!(
            "{:<18} {:>8} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
            stats.name, stats.count, stats.mean, stats.std, stats.min, stats.p25, stats.p50, stats.p75, stats.max
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .build_global()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, charts) = parse_args(&args)?;

    println!("📊 Scenario Results Charts");
    println!("{}", "=".repeat(60));

    let inputs = DataLoader::new().load_inputs(&config)?;
    println!("Scenario: {}", inputs.scenario_path.display());
    println!("Hours: {}, columns: {}", inputs.table.height(), inputs.table.width());

    let report = ScenarioAnalysis::new(config.clone()).run(inputs)?;
    print_describe(&report);

    println!("\nPrice polynomial: {:?}", report.regression.fit.coefficients);
    println!("R²: {:.4}", report.regression.r_squared);

    std::fs::create_dir_all(&config.output_dir)?;
    let style = ChartStyle::from_config(&config);

    println!("\n🖼️  Rendering {} charts into {}", charts.len(), config.output_dir.display());
    let pb = ProgressBar::new(charts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?,
    );

    let results: Vec<(ChartKind, Result<PathBuf>)> = charts
        .par_iter()
        .map(|kind| {
            let result = kind.render(&report, &config, &style);
            pb.inc(1);
            (*kind, result)
        })
        .collect();
    pb.finish_with_message("Charts rendered");

    let mut failures = 0;
    for (kind, result) in results {
        match result {
            Ok(path) => println!("  ✅ {}", path.display()),
            Err(e) => {
                error!("{:?} chart failed: {:#}", kind, e);
                failures += 1;
            }
        }
    }

    println!("{}", "=".repeat(60));
    if failures > 0 {
        bail!("{} of {} charts failed", failures, charts.len());
    }

    info!("All charts written to {}", config.output_dir.display());
    Ok(())
}
