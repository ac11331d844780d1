//! # Mood Module
//!
//! Aggregate emotional statistics over a [`FeatureTable`] and the categorical
//! mood label derived from mean valence and energy.
//!
//! ## Classification
//!
//! ```text
//! valence > 0.6 && energy > 0.6  => Euphoric
//! valence > 0.6 && energy < 0.4  => Peaceful
//! valence < 0.4 && energy > 0.6  => Angry/Tense
//! valence < 0.4 && energy < 0.4  => Sad/Depressive
//! otherwise                      => Balanced
//! ```
//!
//! Boundary values (exactly 0.4 or 0.6) never satisfy the strict comparisons
//! and land in `Balanced`.

use crate::error::{AnalysisError, Outcome};
use crate::features::{Column, FeatureTable};
use crate::stats::round_to;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

const HIGH: f64 = 0.6;
const LOW: f64 = 0.4;

/// Categorical mood of a set of tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodLabel {
    Euphoric,
    Peaceful,
    #[serde(rename = "Angry/Tense")]
    AngryTense,
    #[serde(rename = "Sad/Depressive")]
    SadDepressive,
    Balanced,
}

impl MoodLabel {
    /// Classify a valence/energy pair. First matching rule wins.
    #[must_use]
    pub fn classify(valence: f64, energy: f64) -> Self {
        match (valence, energy) {
            (v, e) if v > HIGH && e > HIGH => Self::Euphoric,
            (v, e) if v > HIGH && e < LOW => Self::Peaceful,
            (v, e) if v < LOW && e > HIGH => Self::AngryTense,
            (v, e) if v < LOW && e < LOW => Self::SadDepressive,
            _ => Self::Balanced,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Euphoric => "Euphoric",
            Self::Peaceful => "Peaceful",
            Self::AngryTense => "Angry/Tense",
            Self::SadDepressive => "Sad/Depressive",
            Self::Balanced => "Balanced",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mean emotional statistics, each rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalStats {
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub primary_mood: MoodLabel,
    pub emotional_stats: EmotionalStats,
    /// `(std(valence) + std(energy)) * 100`, rounded to 2 decimals.
    pub mood_diversity_score: f64,
}

impl MoodAnalysis {
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            primary_mood: MoodLabel::Balanced,
            emotional_stats: EmotionalStats {
                valence: 0.5,
                energy: 0.5,
                danceability: 0.5,
            },
            mood_diversity_score: 50.0,
        }
    }
}

/// Classify the overall mood of `table` and summarize its emotional columns.
///
/// # Returns
///
/// [`Outcome::Computed`] for a table with real rows, otherwise
/// [`MoodAnalysis::fallback`] (Balanced, 0.5 averages, diversity 50).
///
/// # Examples
///
/// ```
/// use muse_insights::features::{AudioFeatures, FeatureTable};
/// use muse_insights::mood::{analyze_mood, MoodLabel};
///
/// let table = FeatureTable::new(vec![AudioFeatures {
///     valence: 0.9,
///     energy: 0.8,
///     ..AudioFeatures::default()
/// }]);
/// assert_eq!(analyze_mood(&table).value().primary_mood, MoodLabel::Euphoric);
/// ```
pub fn analyze_mood(table: &FeatureTable) -> Outcome<MoodAnalysis> {
    Outcome::recover("mood", || try_analyze_mood(table), MoodAnalysis::fallback)
}

/// Fallible core of [`analyze_mood`].
///
/// # Errors
///
/// - [`AnalysisError::MissingInput`] for an empty or placeholder table
/// - [`AnalysisError::NumericDegeneracy`] if a mean or deviation is not finite
pub fn try_analyze_mood(table: &FeatureTable) -> Result<MoodAnalysis, AnalysisError> {
    table.require_data()?;
    let valence = table.mean(Column::Valence)?;
    let energy = table.mean(Column::Energy)?;
    let danceability = table.mean(Column::Danceability)?;

    let diversity = (table.std(Column::Valence)? + table.std(Column::Energy)?) * 100.0;

    // The label uses the unrounded means.
    let primary_mood = MoodLabel::classify(valence, energy);
    debug!("Mood over {} tracks: {primary_mood} (diversity {diversity:.2})", table.len());

    Ok(MoodAnalysis {
        primary_mood,
        emotional_stats: EmotionalStats {
            valence: round_to(valence, 2),
            energy: round_to(energy, 2),
            danceability: round_to(danceability, 2),
        },
        mood_diversity_score: round_to(diversity, 2),
    })
}
