pub mod analysis;
pub mod config;
pub mod data_loader;
pub mod dispatch;
pub mod duration;
pub mod error;
pub mod models;
pub mod regression;
pub mod residual_load;
pub mod stats;

pub use analysis::{AnalysisReport, AnalysisSummary, ScenarioAnalysis};
pub use config::{AnalysisConfig, Language};
pub use data_loader::{DataLoader, ScenarioInputs};
pub use dispatch::DispatchAggregator;
pub use error::{AnalysisError, Result};
pub use models::{DescribeStats, DispatchColumn, DispatchTable, Fuel, ScenarioTable, TimeSeries};
pub use regression::{polyfit, PolyFit, PriceRegression};
