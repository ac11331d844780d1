//! # Taste Profile Module
//!
//! Turns aggregate statistics into qualitative insights and personality
//! traits for display.
//!
//! Every rule is a threshold on one statistic. A rule that matches appends
//! its insight and, when it has one, its trait. Rules on the same statistic
//! in opposite directions (high/low energy, high/low acousticness) are the
//! only mutually exclusive ones.

use crate::error::{AnalysisError, Outcome};
use crate::features::{Column, FeatureTable};
use crate::genres::{ArtistRecord, GenreCount};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const DEFAULT_TRAIT: &str = "The Balanced Listener";
const FALLBACK_INSIGHT: &str = "Your music taste is one of a kind.";
const FALLBACK_TRAIT: &str = "The Eclectic Listener";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasteProfile {
    pub insights: Vec<String>,
    pub personality_traits: Vec<String>,
}

impl TasteProfile {
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            insights: vec![FALLBACK_INSIGHT.to_string()],
            personality_traits: vec![FALLBACK_TRAIT.to_string()],
        }
    }

    /// Reorder insights for display. The set of insights is unchanged.
    pub fn shuffle_insights<R: Rng>(&mut self, rng: &mut R) {
        self.insights.shuffle(rng);
    }
}

/// Statistics the rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Listening {
    features: Option<FeatureMeans>,
    genre_count: usize,
    dominant_genre: bool,
    artist_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FeatureMeans {
    danceability: f64,
    energy: f64,
    valence: f64,
    tempo: f64,
    acousticness: f64,
    instrumentalness: f64,
}

impl FeatureMeans {
    fn from_table(table: &FeatureTable) -> Result<Self, AnalysisError> {
        Ok(Self {
            danceability: table.mean(Column::Danceability)?,
            energy: table.mean(Column::Energy)?,
            valence: table.mean(Column::Valence)?,
            tempo: table.mean(Column::Tempo)?,
            acousticness: table.mean(Column::Acousticness)?,
            instrumentalness: table.mean(Column::Instrumentalness)?,
        })
    }
}

struct Rule {
    applies: fn(&Listening) -> bool,
    insight: &'static str,
    personality_trait: Option<&'static str>,
}

fn feature(listening: &Listening, test: impl Fn(&FeatureMeans) -> bool) -> bool {
    listening.features.as_ref().is_some_and(test)
}

const RULES: &[Rule] = &[
    Rule {
        applies: |l| feature(l, |f| f.danceability > 0.7),
        insight: "Your favorite tracks are made for the dance floor.",
        personality_trait: Some("The Dancer"),
    },
    Rule {
        applies: |l| feature(l, |f| f.energy > 0.7),
        insight: "High-energy music keeps your momentum going.",
        personality_trait: Some("The Energizer"),
    },
    Rule {
        applies: |l| feature(l, |f| f.energy < 0.4),
        insight: "You gravitate toward calm, low-energy soundscapes.",
        personality_trait: Some("The Chill Seeker"),
    },
    Rule {
        applies: |l| feature(l, |f| f.valence > 0.6),
        insight: "Your music leans toward bright, positive vibes.",
        personality_trait: Some("The Optimist"),
    },
    Rule {
        applies: |l| feature(l, |f| f.valence < 0.4),
        insight: "You connect with moody, introspective music.",
        personality_trait: Some("The Deep Thinker"),
    },
    Rule {
        applies: |l| feature(l, |f| f.tempo > 130.0),
        insight: "You like it fast: your tracks run at a high tempo.",
        personality_trait: Some("The Speed Demon"),
    },
    Rule {
        applies: |l| feature(l, |f| f.tempo < 100.0),
        insight: "Slower, laid-back tempos set the pace of your listening.",
        personality_trait: None,
    },
    Rule {
        applies: |l| feature(l, |f| f.acousticness > 0.6),
        insight: "Organic, acoustic sounds dominate your library.",
        personality_trait: Some("The Acoustic Soul"),
    },
    Rule {
        applies: |l| feature(l, |f| f.acousticness < 0.3),
        insight: "You favor produced, electronic textures over acoustic ones.",
        personality_trait: Some("The Electronic Explorer"),
    },
    Rule {
        applies: |l| feature(l, |f| f.instrumentalness > 0.5),
        insight: "Instrumental tracks make up a big part of your listening.",
        personality_trait: Some("The Instrumental Connoisseur"),
    },
    Rule {
        applies: |l| l.genre_count >= 10,
        insight: "Your taste spans an impressively wide range of genres.",
        personality_trait: Some("The Genre Hopper"),
    },
    Rule {
        applies: |l| (1..=3).contains(&l.genre_count),
        insight: "You know what you like and stay close to a few genres.",
        personality_trait: Some("The Loyalist"),
    },
    Rule {
        applies: |l| l.dominant_genre,
        insight: "One genre clearly leads your listening.",
        personality_trait: None,
    },
    Rule {
        applies: |l| l.artist_count >= 15,
        insight: "You spread your listening across many different artists.",
        personality_trait: None,
    },
];

/// Derive insights and personality traits from the feature means, the ranked
/// genres and the number of top artists.
///
/// # Returns
///
/// An empty [`TasteProfile`] when there are neither real feature rows nor
/// genres, [`TasteProfile::fallback`] if a statistic is degenerate, and the
/// matched insights in rule order otherwise.
///
/// # Examples
///
/// ```
/// use muse_insights::features::{AudioFeatures, FeatureTable};
/// use muse_insights::taste::narrate_taste_profile;
///
/// let table = FeatureTable::new(vec![AudioFeatures { energy: 0.9, ..AudioFeatures::default() }]);
/// let profile = narrate_taste_profile(&table, &[], &[]).into_value();
/// assert_eq!(profile.personality_traits, vec!["The Energizer"]);
/// ```
pub fn narrate_taste_profile(
    table: &FeatureTable,
    genres: &[GenreCount],
    artists: &[ArtistRecord],
) -> Outcome<TasteProfile> {
    Outcome::recover(
        "taste profile",
        || try_narrate_taste_profile(table, genres, artists),
        TasteProfile::fallback,
    )
}

/// Same as [`narrate_taste_profile`], with insights shuffled by `rng`.
pub fn narrate_taste_profile_with_rng<R: Rng>(
    table: &FeatureTable,
    genres: &[GenreCount],
    artists: &[ArtistRecord],
    rng: &mut R,
) -> Outcome<TasteProfile> {
    match narrate_taste_profile(table, genres, artists) {
        Outcome::Computed(mut profile) => {
            profile.shuffle_insights(rng);
            Outcome::Computed(profile)
        }
        fallback => fallback,
    }
}

/// Fallible core of [`narrate_taste_profile`].
///
/// # Errors
///
/// Returns [`AnalysisError::NumericDegeneracy`] if a feature mean is not
/// finite.
pub fn try_narrate_taste_profile(
    table: &FeatureTable,
    genres: &[GenreCount],
    artists: &[ArtistRecord],
) -> Result<TasteProfile, AnalysisError> {
    let has_rows = table.require_data().is_ok();
    if !has_rows && genres.is_empty() {
        return Ok(TasteProfile::default());
    }

    let features = if has_rows {
        Some(FeatureMeans::from_table(table)?)
    } else {
        None
    };
    let total_tags: usize = genres.iter().map(|g| g.count).sum();
    let listening = Listening {
        features,
        genre_count: genres.len(),
        dominant_genre: genres.len() > 1 && genres[0].count * 2 > total_tags,
        artist_count: artists.len(),
    };

    let mut profile = TasteProfile::default();
    for rule in RULES.iter().filter(|rule| (rule.applies)(&listening)) {
        profile.insights.push(rule.insight.to_string());
        if let Some(personality_trait) = rule.personality_trait {
            profile.personality_traits.push(personality_trait.to_string());
        }
    }
    if profile.personality_traits.is_empty() {
        profile.personality_traits.push(DEFAULT_TRAIT.to_string());
    }

    debug!(
        "Taste profile: {} insights, traits {:?}",
        profile.insights.len(),
        profile.personality_traits
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::AudioFeatures;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table_of(row: AudioFeatures) -> FeatureTable {
        FeatureTable::new(vec![row])
    }

    fn traits(profile: &TasteProfile) -> Vec<&str> {
        profile.personality_traits.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_empty_input_is_empty_profile() {
        let outcome = narrate_taste_profile(&FeatureTable::default(), &[], &[]);
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.into_value(), TasteProfile::default());
    }

    #[test]
    fn test_placeholder_table_counts_as_empty() {
        let profile = narrate_taste_profile(&FeatureTable::fallback(), &[], &[]).into_value();
        assert_eq!(profile, TasteProfile::default());
    }

    #[test]
    fn test_default_row_is_balanced() {
        let profile = narrate_taste_profile(&table_of(AudioFeatures::default()), &[], &[]).into_value();
        assert!(profile.insights.is_empty());
        assert_eq!(traits(&profile), vec!["The Balanced Listener"]);
    }

    #[test]
    fn test_energetic_dance_listener() {
        let table = table_of(AudioFeatures {
            danceability: 0.85,
            energy: 0.9,
            valence: 0.75,
            tempo: 135.0,
            acousticness: 0.1,
            instrumentalness: 0.0,
            ..AudioFeatures::default()
        });
        let profile = narrate_taste_profile(&table, &[], &[]).into_value();

        assert_eq!(
            traits(&profile),
            vec![
                "The Dancer",
                "The Energizer",
                "The Optimist",
                "The Speed Demon",
                "The Electronic Explorer"
            ]
        );
        assert_eq!(profile.insights.len(), 5);
    }

    #[test]
    fn test_quiet_acoustic_listener() {
        let table = table_of(AudioFeatures {
            energy: 0.2,
            valence: 0.3,
            tempo: 80.0,
            acousticness: 0.8,
            instrumentalness: 0.7,
            ..AudioFeatures::default()
        });
        let profile = narrate_taste_profile(&table, &[], &[]).into_value();

        assert_eq!(
            traits(&profile),
            vec![
                "The Chill Seeker",
                "The Deep Thinker",
                "The Acoustic Soul",
                "The Instrumental Connoisseur"
            ]
        );
        // The slow-tempo rule adds an insight without a trait
        assert_eq!(profile.insights.len(), 5);
    }

    #[test]
    fn test_genre_and_artist_rules() {
        let genres: Vec<GenreCount> = (0..10).map(|i| GenreCount::new(format!("Genre {i}"), 1)).collect();
        let artists: Vec<ArtistRecord> = (0..15).map(|i| ArtistRecord::new(format!("Artist {i}"), &[])).collect();
        let profile = narrate_taste_profile(&FeatureTable::default(), &genres, &artists).into_value();

        assert_eq!(traits(&profile), vec!["The Genre Hopper"]);
        assert!(profile
            .insights
            .contains(&"You spread your listening across many different artists.".to_string()));
    }

    #[test]
    fn test_dominant_genre_and_loyalist() {
        let genres = vec![GenreCount::new("Jazz", 5), GenreCount::new("Blues", 1)];
        let profile = narrate_taste_profile(&FeatureTable::default(), &genres, &[]).into_value();

        assert_eq!(traits(&profile), vec!["The Loyalist"]);
        assert_eq!(profile.insights.len(), 2);
    }

    #[test]
    fn test_shuffle_keeps_insight_set() {
        let table = table_of(AudioFeatures {
            danceability: 0.9,
            energy: 0.9,
            valence: 0.9,
            tempo: 140.0,
            acousticness: 0.1,
            instrumentalness: 0.8,
            ..AudioFeatures::default()
        });
        let plain = narrate_taste_profile(&table, &[], &[]).into_value();
        let shuffled = narrate_taste_profile_with_rng(&table, &[], &[], &mut StdRng::seed_from_u64(3)).into_value();

        let mut a = plain.insights.clone();
        let mut b = shuffled.insights.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(plain.personality_traits, shuffled.personality_traits);
    }

    #[test]
    fn test_non_finite_statistics_fall_back() {
        let table = table_of(AudioFeatures {
            tempo: f64::INFINITY,
            ..AudioFeatures::default()
        });
        let outcome = narrate_taste_profile(&table, &[], &[]);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_value(), TasteProfile::fallback());
    }
}
