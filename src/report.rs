//! # Listener Report Module
//!
//! Runs every analyzer over one snapshot of collector data and bundles the
//! results into a single serializable structure for the presentation layer.
//!
//! ```
//! use muse_insights::config::AnalysisConfig;
//! use muse_insights::report::{ListenerActivity, ListenerReport};
//!
//! let report = ListenerReport::build(&ListenerActivity::default(), &AnalysisConfig::default());
//! assert_eq!(report.mood.value().primary_mood.as_str(), "Balanced");
//! ```

use crate::cluster::{self, TrackCluster};
use crate::config::AnalysisConfig;
use crate::error::Outcome;
use crate::features::{self, FeatureProfile, FeatureTable, RawAudioFeatures};
use crate::genres::{self, ArtistRecord, GenreCount, GenreDistribution};
use crate::mood::{self, MoodAnalysis};
use crate::patterns::{self, MusicPatterns};
use crate::taste::{self, TasteProfile};
use crate::trends::{self, ListeningTrends, PlayEvent};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything the collector gathered for one listener. Any part may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListenerActivity {
    #[serde(default)]
    pub audio_features: Option<Vec<Option<RawAudioFeatures>>>,
    #[serde(default)]
    pub top_artists: Option<Vec<ArtistRecord>>,
    #[serde(default)]
    pub recent_plays: Option<Vec<PlayEvent>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListenerReport {
    pub mood: Outcome<MoodAnalysis>,
    pub patterns: Outcome<MusicPatterns>,
    pub profile: Outcome<FeatureProfile>,
    pub genres: Outcome<GenreDistribution>,
    pub trends: Outcome<ListeningTrends>,
    pub clusters: Outcome<Vec<TrackCluster>>,
    pub taste: Outcome<TasteProfile>,
}

impl ListenerReport {
    /// Analyze `activity` with insights in rule order.
    #[must_use]
    pub fn build(activity: &ListenerActivity, config: &AnalysisConfig) -> Self {
        let table = features::build_feature_table(activity.audio_features.as_deref());
        Self::from_table(activity, table.value(), config, None::<&mut rand::rngs::StdRng>)
    }

    /// Analyze `activity`, shuffling taste insights with `rng`.
    #[must_use]
    pub fn build_with_rng<R: Rng>(activity: &ListenerActivity, config: &AnalysisConfig, rng: &mut R) -> Self {
        let table = features::build_feature_table(activity.audio_features.as_deref());
        Self::from_table(activity, table.value(), config, Some(rng))
    }

    fn from_table<R: Rng>(
        activity: &ListenerActivity,
        table: &FeatureTable,
        config: &AnalysisConfig,
        rng: Option<&mut R>,
    ) -> Self {
        let artists = activity.top_artists.as_deref();
        let genres = genres::genre_distribution(artists, config);
        // The placeholder ranking is display data, not the listener's genres
        let ranked: &[GenreCount] = if genres.is_fallback() {
            &[]
        } else {
            &genres.value().ranked
        };
        let taste = match rng {
            Some(rng) => {
                taste::narrate_taste_profile_with_rng(table, ranked, artists.unwrap_or_default(), rng)
            }
            None => taste::narrate_taste_profile(table, ranked, artists.unwrap_or_default()),
        };

        let report = Self {
            mood: mood::analyze_mood(table),
            patterns: patterns::analyze_patterns(table),
            profile: features::feature_profile(table),
            trends: trends::analyze_listening_trends(activity.recent_plays.as_deref(), config),
            clusters: cluster::cluster_tracks(table, config),
            genres,
            taste,
        };

        info!(
            "Built listener report over {} tracks ({} sections on fallback)",
            table.len(),
            report.fallback_count()
        );
        report
    }

    /// Number of sections that took their recovery branch.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        [
            self.mood.is_fallback(),
            self.patterns.is_fallback(),
            self.profile.is_fallback(),
            self.genres.is_fallback(),
            self.trends.is_fallback(),
            self.clusters.is_fallback(),
            self.taste.is_fallback(),
        ]
        .into_iter()
        .filter(|&fallback| fallback)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::MoodLabel;

    #[test]
    fn test_empty_activity_uses_defaults() {
        let report = ListenerReport::build(&ListenerActivity::default(), &AnalysisConfig::default());

        assert_eq!(*report.mood.value(), crate::mood::MoodAnalysis::fallback());
        assert_eq!(*report.clusters.value(), cluster::fallback_clusters());
        assert!(report.genres.is_fallback());
        assert!(report.trends.is_fallback());
        // With no rows and no real genres the taste profile is empty, not a fallback
        assert!(!report.taste.is_fallback());
        assert_eq!(report.fallback_count(), 6);
        assert_eq!(*report.taste.value(), TasteProfile::default());
    }

    #[test]
    fn test_placeholder_genres_do_not_reach_taste_profile() {
        // Truncated to three entries the placeholder would read as a loyal listener
        let config = AnalysisConfig {
            top_genres: 3,
            ..AnalysisConfig::default()
        };
        let activity = ListenerActivity {
            top_artists: Some(vec![ArtistRecord::new("Untagged", &[])]),
            ..ListenerActivity::default()
        };
        let report = ListenerReport::build(&activity, &config);

        assert!(report.genres.is_fallback());
        assert_eq!(report.genres.value().ranked.len(), 3);
        let taste = report.taste.value();
        assert!(!taste.personality_traits.iter().any(|t| t == "The Loyalist"));
        assert_eq!(*taste, TasteProfile::default());
    }

    #[test]
    fn test_report_serializes_values() {
        let report = ListenerReport::build(&ListenerActivity::default(), &AnalysisConfig::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["mood"]["primary_mood"], "Balanced");
        assert_eq!(json["genres"]["ranked"][0]["genre"], "Pop");
        assert_eq!(json["trends"]["favorite_day"], "Saturday");
    }

    #[test]
    fn test_activity_deserializes_from_collector_json() {
        let json = r#"{
            "audio_features": [null, {"id": "t1", "energy": 0.9, "valence": 0.9}],
            "top_artists": [{"name": "Neon Wave", "genres": ["Synthwave", "Electronic"]}],
            "recent_plays": [{"played_at": "2024-03-02T20:15:00Z",
                              "track": {"name": "Glow", "artists": [{"name": "Neon Wave"}]}}]
        }"#;
        let activity: ListenerActivity = serde_json::from_str(json).unwrap();
        let report = ListenerReport::build(&activity, &AnalysisConfig::default());

        assert_eq!(report.fallback_count(), 0);
        assert_eq!(report.mood.value().primary_mood, MoodLabel::Euphoric);
        assert_eq!(report.genres.value().main_genres[0].genre, "Synthwave");
        assert_eq!(report.trends.value().peak_hour, 20);
        assert_eq!(report.trends.value().unique_artists, 1);
    }
}
