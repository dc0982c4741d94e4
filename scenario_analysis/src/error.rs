use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read CSV: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Invalid column pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Column '{0}' not found")]
    MissingColumn(String),
    #[error("No scenario file matches '{0}'")]
    NoScenarioFile(String),
    #[error("Cannot parse '{value}' as timestamp in row {row}")]
    InvalidTimestamp { row: usize, value: String },
    #[error("Cannot parse '{value}' as price in row {row}")]
    InvalidPrice { row: usize, value: String },
    #[error("Length mismatch: expected {expected} rows, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Polynomial fit of degree {degree} needs at least {needed} points, got {actual}")]
    NotEnoughPoints {
        degree: usize,
        needed: usize,
        actual: usize,
    },
    #[error("Fit input contains non-finite values")]
    NonFiniteInput,
    #[error("Least-squares solve failed: {0}")]
    SolveFailed(String),
    #[error("Empty data: {0}")]
    Empty(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
