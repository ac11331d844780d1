//! # Feature Table Module
//!
//! Normalizes the per-track audio descriptors handed over by the collector
//! into a [`FeatureTable`], the shared input of every downstream analyzer.
//!
//! Defaulting happens exactly once, here. A [`AudioFeatures`] row always has
//! every column populated, so analyzers never re-check for missing values.
//!
//! | column             | default  |
//! |--------------------|----------|
//! | `danceability`     | 0.5      |
//! | `energy`           | 0.5      |
//! | `key`              | 0        |
//! | `loudness`         | -10      |
//! | `speechiness`      | 0.1      |
//! | `acousticness`     | 0.5      |
//! | `instrumentalness` | 0.1      |
//! | `liveness`         | 0.1      |
//! | `valence`          | 0.5      |
//! | `tempo`            | 120      |
//! | `duration_ms`      | 200000   |

use crate::error::{AnalysisError, Outcome};
use crate::stats::{self, round_to};
use log::debug;
use serde::{Deserialize, Serialize};

/// One audio-descriptor record as received from the collector.
///
/// Every field may be absent. Non-finite numbers count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAudioFeatures {
    #[serde(default, alias = "track_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub key: Option<i32>,
    #[serde(default)]
    pub loudness: Option<f64>,
    #[serde(default)]
    pub speechiness: Option<f64>,
    #[serde(default)]
    pub acousticness: Option<f64>,
    #[serde(default)]
    pub instrumentalness: Option<f64>,
    #[serde(default)]
    pub liveness: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// A fully resolved feature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub track_id: Option<String>,
    pub danceability: f64,
    pub energy: f64,
    pub key: i32,
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: u64,
}

impl Default for AudioFeatures {
    fn default() -> Self {
        Self {
            track_id: None,
            danceability: 0.5,
            energy: 0.5,
            key: 0,
            loudness: -10.0,
            speechiness: 0.1,
            acousticness: 0.5,
            instrumentalness: 0.1,
            liveness: 0.1,
            valence: 0.5,
            tempo: 120.0,
            duration_ms: 200_000,
        }
    }
}

impl From<&RawAudioFeatures> for AudioFeatures {
    fn from(raw: &RawAudioFeatures) -> Self {
        let defaults = Self::default();
        let or = |value: Option<f64>, default: f64| value.filter(|v| v.is_finite()).unwrap_or(default);

        Self {
            track_id: raw.id.clone(),
            danceability: or(raw.danceability, defaults.danceability),
            energy: or(raw.energy, defaults.energy),
            key: raw.key.unwrap_or(defaults.key),
            loudness: or(raw.loudness, defaults.loudness),
            speechiness: or(raw.speechiness, defaults.speechiness),
            acousticness: or(raw.acousticness, defaults.acousticness),
            instrumentalness: or(raw.instrumentalness, defaults.instrumentalness),
            liveness: or(raw.liveness, defaults.liveness),
            valence: or(raw.valence, defaults.valence),
            tempo: or(raw.tempo, defaults.tempo),
            duration_ms: raw.duration_ms.unwrap_or(defaults.duration_ms),
        }
    }
}

/// Numeric columns of the feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Danceability,
    Energy,
    Key,
    Loudness,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
    DurationMs,
}

impl AudioFeatures {
    #[must_use]
    pub fn get(&self, column: Column) -> f64 {
        match column {
            Column::Danceability => self.danceability,
            Column::Energy => self.energy,
            Column::Key => f64::from(self.key),
            Column::Loudness => self.loudness,
            Column::Speechiness => self.speechiness,
            Column::Acousticness => self.acousticness,
            Column::Instrumentalness => self.instrumentalness,
            Column::Liveness => self.liveness,
            Column::Valence => self.valence,
            Column::Tempo => self.tempo,
            #[allow(clippy::cast_precision_loss)]
            Column::DurationMs => self.duration_ms as f64,
        }
    }
}

/// Ordered rows of resolved audio features.
///
/// The table built when the collector supplied nothing is marked as a
/// placeholder: it still holds one default row for display, but analyzers
/// treat it as missing input and return their own documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    rows: Vec<AudioFeatures>,
    #[serde(default)]
    placeholder: bool,
}

impl FeatureTable {
    #[must_use]
    pub fn new(rows: Vec<AudioFeatures>) -> Self {
        Self {
            rows,
            placeholder: false,
        }
    }

    /// The single all-defaults row used when no data is available.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            rows: vec![AudioFeatures::default()],
            placeholder: true,
        }
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Error unless the table holds real rows.
    pub fn require_data(&self) -> Result<(), AnalysisError> {
        if self.placeholder || self.rows.is_empty() {
            Err(AnalysisError::MissingInput)
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[AudioFeatures] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy one column out in row order.
    #[must_use]
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows.iter().map(|row| row.get(column)).collect()
    }

    pub fn mean(&self, column: Column) -> Result<f64, AnalysisError> {
        stats::mean(&self.column(column))
    }

    pub fn std(&self, column: Column) -> Result<f64, AnalysisError> {
        stats::sample_std(&self.column(column))
    }
}

/// Build the feature table, falling back to a single default row when
/// `records` is absent, empty, or contains only `None`.
pub fn build_feature_table(records: Option<&[Option<RawAudioFeatures>]>) -> Outcome<FeatureTable> {
    Outcome::recover(
        "feature table",
        || try_build_feature_table(records),
        FeatureTable::fallback,
    )
}

/// Fallible core of [`build_feature_table`].
///
/// # Errors
///
/// Returns [`AnalysisError::MissingInput`] if `records` is absent or every
/// record is `None`.
pub fn try_build_feature_table(
    records: Option<&[Option<RawAudioFeatures>]>,
) -> Result<FeatureTable, AnalysisError> {
    let records = records.ok_or(AnalysisError::MissingInput)?;

    let rows: Vec<AudioFeatures> = records
        .iter()
        .flatten()
        .map(AudioFeatures::from)
        .collect();

    if rows.is_empty() {
        return Err(AnalysisError::MissingInput);
    }

    debug!(
        "Built feature table with {} rows ({} null records dropped)",
        rows.len(),
        records.len() - rows.len()
    );
    Ok(FeatureTable::new(rows))
}

/// Mean value of each radar axis, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfile {
    pub danceability: f64,
    pub energy: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
}

impl FeatureProfile {
    /// Radar axes in display order.
    pub const AXES: [Column; 7] = [
        Column::Danceability,
        Column::Energy,
        Column::Speechiness,
        Column::Acousticness,
        Column::Instrumentalness,
        Column::Liveness,
        Column::Valence,
    ];

    #[must_use]
    pub fn fallback() -> Self {
        let defaults = AudioFeatures::default();
        Self {
            danceability: defaults.danceability,
            energy: defaults.energy,
            speechiness: defaults.speechiness,
            acousticness: defaults.acousticness,
            instrumentalness: defaults.instrumentalness,
            liveness: defaults.liveness,
            valence: defaults.valence,
        }
    }

    /// `(axis name, value)` pairs in [`Self::AXES`] order.
    #[must_use]
    pub fn axes(&self) -> [(&'static str, f64); 7] {
        [
            ("danceability", self.danceability),
            ("energy", self.energy),
            ("speechiness", self.speechiness),
            ("acousticness", self.acousticness),
            ("instrumentalness", self.instrumentalness),
            ("liveness", self.liveness),
            ("valence", self.valence),
        ]
    }
}

/// Radar-chart means of [`FeatureProfile::AXES`], or
/// [`FeatureProfile::fallback`] when the table has no real rows.
pub fn feature_profile(table: &FeatureTable) -> Outcome<FeatureProfile> {
    Outcome::recover(
        "feature profile",
        || try_feature_profile(table),
        FeatureProfile::fallback,
    )
}

/// # Errors
///
/// [`AnalysisError::MissingInput`] for an empty or placeholder table,
/// [`AnalysisError::NumericDegeneracy`] for a non-finite mean.
pub fn try_feature_profile(table: &FeatureTable) -> Result<FeatureProfile, AnalysisError> {
    table.require_data()?;
    let mean = |column| table.mean(column).map(|value| round_to(value, 2));

    Ok(FeatureProfile {
        danceability: mean(Column::Danceability)?,
        energy: mean(Column::Energy)?,
        speechiness: mean(Column::Speechiness)?,
        acousticness: mean(Column::Acousticness)?,
        instrumentalness: mean(Column::Instrumentalness)?,
        liveness: mean(Column::Liveness)?,
        valence: mean(Column::Valence)?,
    })
}
