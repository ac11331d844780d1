//! Tempo statistics, acoustic/electronic balance and complexity score.

use crate::error::{AnalysisError, Outcome};
use crate::features::{Column, FeatureTable};
use crate::stats::{round_to, ColumnStatistics};
use log::debug;
use serde::{Deserialize, Serialize};

/// Smallest denominator for the acoustic/electronic ratio.
const RATIO_FLOOR: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoPatterns {
    pub avg_tempo: f64,
    pub tempo_variation: f64,
    pub tempo_range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicPatterns {
    pub tempo_patterns: TempoPatterns,
    pub acoustic_electronic_ratio: f64,
    pub complexity_score: f64,
}

impl MusicPatterns {
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            tempo_patterns: TempoPatterns {
                avg_tempo: 120.0,
                tempo_variation: 10.0,
                tempo_range: 40.0,
            },
            acoustic_electronic_ratio: 1.5,
            complexity_score: 50.0,
        }
    }
}

/// Tempo statistics, acoustic/electronic balance and complexity of `table`.
///
/// Tempo values are reported unrounded; the ratio and complexity score are
/// rounded to 2 decimals.
///
/// # Returns
///
/// [`Outcome::Computed`] for a table with real rows, otherwise
/// [`MusicPatterns::fallback`].
///
/// # Examples
///
/// ```
/// use muse_insights::features::{AudioFeatures, FeatureTable};
/// use muse_insights::patterns::analyze_patterns;
///
/// let table = FeatureTable::new(vec![
///     AudioFeatures { tempo: 100.0, ..AudioFeatures::default() },
///     AudioFeatures { tempo: 140.0, ..AudioFeatures::default() },
/// ]);
/// let patterns = analyze_patterns(&table).into_value();
/// assert_eq!(patterns.tempo_patterns.avg_tempo, 120.0);
/// assert_eq!(patterns.tempo_patterns.tempo_range, 40.0);
/// ```
pub fn analyze_patterns(table: &FeatureTable) -> Outcome<MusicPatterns> {
    Outcome::recover(
        "patterns",
        || try_analyze_patterns(table),
        MusicPatterns::fallback,
    )
}

/// Fallible core of [`analyze_patterns`].
///
/// # Errors
///
/// - [`AnalysisError::MissingInput`] for an empty or placeholder table
/// - [`AnalysisError::NumericDegeneracy`] if a statistic is not finite
pub fn try_analyze_patterns(table: &FeatureTable) -> Result<MusicPatterns, AnalysisError> {
    table.require_data()?;
    let tempo = ColumnStatistics::from_values(&table.column(Column::Tempo))?;
    let acousticness = table.mean(Column::Acousticness)?;
    let instrumentalness = table.mean(Column::Instrumentalness)?;
    let speechiness_std = table.std(Column::Speechiness)?;

    let ratio = acousticness / RATIO_FLOOR.max(1.0 - instrumentalness);
    let complexity = (instrumentalness + speechiness_std) * 100.0;

    debug!(
        "Patterns over {} tracks: avg tempo {:.1}, ratio {ratio:.2}, complexity {complexity:.2}",
        table.len(),
        tempo.mean
    );

    Ok(MusicPatterns {
        tempo_patterns: TempoPatterns {
            avg_tempo: tempo.mean,
            tempo_variation: tempo.std_deviation,
            tempo_range: tempo.range(),
        },
        acoustic_electronic_ratio: round_to(ratio, 2),
        complexity_score: round_to(complexity, 2),
    })
}
