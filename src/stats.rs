//! Column statistics shared by the analyzers.

use crate::error::AnalysisError;

/// Summary of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStatistics {
    pub mean: f64,
    pub std_deviation: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl ColumnStatistics {
    /// Summarize `values`. The standard deviation uses the sample (n-1)
    /// definition and is 0 for a single value.
    pub fn from_values(values: &[f64]) -> Result<Self, AnalysisError> {
        Ok(Self {
            mean: mean(values)?,
            std_deviation: sample_std(values)?,
            min: values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
            max: values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
            count: values.len(),
        })
    }

    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Arithmetic mean; an empty column is missing input.
pub fn mean(values: &[f64]) -> Result<f64, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::MissingInput);
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    finite(mean, "mean")
}

/// Sample standard deviation (n-1 denominator), 0 for a single value.
pub fn sample_std(values: &[f64]) -> Result<f64, AnalysisError> {
    let mean = mean(values)?;
    if values.len() < 2 {
        return Ok(0.0);
    }
    #[allow(clippy::cast_precision_loss)]
    let variance = values
        .iter()
        .map(|&value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    finite(variance.sqrt(), "standard deviation")
}

/// Round to `decimals` places, ties to even.
///
/// Exact halves go to the even neighbour, so `6.25 + 6.25 + 87.5` rounds
/// to `6.2 + 6.2 + 87.5` rather than summing past 100.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

pub(crate) fn finite(value: f64, what: &str) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::NumericDegeneracy(format!("{what} is {value}")))
    }
}
