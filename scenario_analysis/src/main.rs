use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use scenario_analysis::{AnalysisConfig, DataLoader, Language, ScenarioAnalysis};

#[derive(Parser)]
#[command(name = "scenario_analysis")]
#[command(about = "Residual load, price fit and dispatch aggregation for scenario results")]
struct Args {
    /// JSON config file (fields not given keep their defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Scenario results CSV or glob pattern (latest match is used)
    #[arg(short, long)]
    scenario: Option<String>,

    /// Real day-ahead price CSV, one row per scenario hour
    #[arg(short, long)]
    prices: Option<String>,

    /// Country code for the dispatch aggregation
    #[arg(long)]
    country: Option<String>,

    /// Degree of the price polynomial
    #[arg(short, long)]
    degree: Option<usize>,

    /// Label language
    #[arg(short, long, value_enum)]
    language: Option<Language>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    output: OutputFormat,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Summary,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(scenario) = args.scenario {
        config.scenario_path = scenario;
    }
    if let Some(prices) = args.prices {
        config.real_price_path = prices.into();
    }
    if let Some(country) = args.country {
        config.country_code = country;
    }
    if let Some(degree) = args.degree {
        config.polynomial_degree = degree;
    }
    if let Some(language) = args.language {
        config.language = language;
    }

    info!("Starting scenario analysis");
    let inputs = DataLoader::new().load_inputs(&config)?;
    let report = ScenarioAnalysis::new(config.clone()).run(inputs)?;
    let summary = report.summary(&config);

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Csv => {
            println!("Column,Label,EnergyGWh");
            for total in &summary.dispatch_totals_gwh {
                println!("{},{},{:.2}", total.column, total.label, total.energy_gwh);
            }
        }
        OutputFormat::Summary => {
            println!("Scenario Analysis Summary");
            println!("=========================");
            println!("Scenario: {}", summary.scenario);
            println!("Hours: {}", summary.hours);
            println!();

            println!("{:<18} {:>8} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
                "", "count", "mean", "std", "min", "25%", "50%", "75%", "max");
            for stats in summary.price_stats.iter().chain([&summary.residual_load_stats]) {
                println!(
                    "{:<18} {:>8} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
                    stats.name, stats.count, stats.mean, stats.std, stats.min,
                    stats.p25, stats.p50, stats.p75, stats.max
                );
            }
            println!();

            let terms: Vec<String> = summary
                .polynomial
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let power = summary.polynomial.len() - 1 - i;
                    match power {
                        0 => format!("{:.4e}", c),
                        1 => format!("{:.4e}·x", c),
                        _ => format!("{:.4e}·x^{}", c, power),
                    }
                })
                .collect();
            println!("Price(res_load) = {}", terms.join(" + "));
            println!("R²: {:.4}", summary.r_squared);
            println!();

            println!("Dispatch {} (GWh):", summary.country_code);
            for total in &summary.dispatch_totals_gwh {
                println!("  {:<22} {:>12.1}", total.label, total.energy_gwh);
            }
        }
    }

    Ok(())
}
