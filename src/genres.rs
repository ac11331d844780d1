//! # Genre Distribution Module
//!
//! Counts and ranks the genre tags attached to a listener's top artists.
//!
//! An artist's first tag is its *main* genre, the remaining tags are *sub*
//! genres. Rankings are by descending count; equal counts keep the order in
//! which the genres were first encountered.
//!
//! The presentation layer always gets a non-empty ranking: when there are no
//! usable artists the analyzer returns a fixed placeholder.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Outcome};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A top artist as received from the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub name: String,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

impl ArtistRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, genres: &[&str]) -> Self {
        Self {
            name: name.into(),
            genres: Some(genres.iter().map(|g| (*g).to_string()).collect()),
        }
    }

    /// Non-blank genre tags in their original order.
    fn tags(&self) -> impl Iterator<Item = &str> {
        self.genres
            .iter()
            .flatten()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

impl GenreCount {
    #[must_use]
    pub fn new(genre: impl Into<String>, count: usize) -> Self {
        Self {
            genre: genre.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDistribution {
    /// Every tag, ranked, truncated to `top_genres`.
    pub ranked: Vec<GenreCount>,
    /// First tag of each artist, truncated to `main_genre_limit`.
    pub main_genres: Vec<GenreCount>,
    /// Remaining tags of each artist, truncated to `sub_genre_limit`.
    pub sub_genres: Vec<GenreCount>,
    /// Distinct genre strings across main and sub genres.
    pub genre_diversity: usize,
}

const PLACEHOLDER: [(&str, usize); 5] = [
    ("Pop", 5),
    ("Rock", 4),
    ("Hip-Hop", 3),
    ("Electronic", 2),
    ("Jazz", 1),
];

impl GenreDistribution {
    #[must_use]
    pub fn fallback(config: &AnalysisConfig) -> Self {
        let placeholder: Vec<GenreCount> = PLACEHOLDER
            .iter()
            .map(|&(genre, count)| GenreCount::new(genre, count))
            .collect();

        Self {
            ranked: truncated(&placeholder, config.top_genres),
            main_genres: truncated(&placeholder, config.main_genre_limit),
            sub_genres: Vec::new(),
            genre_diversity: placeholder.len(),
        }
    }
}

fn truncated(ranking: &[GenreCount], limit: usize) -> Vec<GenreCount> {
    ranking.iter().take(limit).cloned().collect()
}

/// Count `tags` and rank by descending count, ties in first-seen order.
pub fn rank_genres<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<GenreCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut ranking: Vec<GenreCount> = Vec::new();

    for tag in tags {
        match positions.get(tag) {
            Some(&index) => ranking[index].count += 1,
            None => {
                positions.insert(tag, ranking.len());
                ranking.push(GenreCount::new(tag, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking
}

/// Rank the genre tags of `artists`, overall and split into main and sub
/// genres.
///
/// # Returns
///
/// [`Outcome::Computed`] when at least one artist carries a tag, otherwise
/// [`GenreDistribution::fallback`] with the placeholder ranking.
///
/// # Examples
///
/// ```
/// use muse_insights::config::AnalysisConfig;
/// use muse_insights::genres::{genre_distribution, ArtistRecord};
///
/// let artists = vec![
///     ArtistRecord::new("Neon Wave", &["Synthwave", "Electronic"]),
///     ArtistRecord::new("Midnight Pulse", &["Synthwave"]),
/// ];
/// let distribution = genre_distribution(Some(artists.as_slice()), &AnalysisConfig::default());
/// assert_eq!(distribution.value().ranked[0].genre, "Synthwave");
/// assert_eq!(distribution.value().genre_diversity, 2);
/// ```
pub fn genre_distribution(
    artists: Option<&[ArtistRecord]>,
    config: &AnalysisConfig,
) -> Outcome<GenreDistribution> {
    Outcome::recover(
        "genres",
        || try_genre_distribution(artists, config),
        || GenreDistribution::fallback(config),
    )
}

/// Fallible core of [`genre_distribution`].
///
/// # Errors
///
/// - [`AnalysisError::MissingInput`] if `artists` is absent or empty
/// - [`AnalysisError::MalformedRecord`] if no artist has a non-blank tag
pub fn try_genre_distribution(
    artists: Option<&[ArtistRecord]>,
    config: &AnalysisConfig,
) -> Result<GenreDistribution, AnalysisError> {
    let artists = artists
        .filter(|artists| !artists.is_empty())
        .ok_or(AnalysisError::MissingInput)?;

    let all = rank_genres(artists.iter().flat_map(ArtistRecord::tags));
    if all.is_empty() {
        return Err(AnalysisError::MalformedRecord(format!(
            "none of {} artists carries a genre tag",
            artists.len()
        )));
    }

    let main = rank_genres(artists.iter().filter_map(|artist| artist.tags().next()));
    let sub = rank_genres(artists.iter().flat_map(|artist| artist.tags().skip(1)));

    debug!(
        "Ranked {} distinct genres from {} artists (top: {})",
        all.len(),
        artists.len(),
        all[0].genre
    );

    Ok(GenreDistribution {
        genre_diversity: all.len(),
        ranked: truncated(&all, config.top_genres),
        main_genres: truncated(&main, config.main_genre_limit),
        sub_genres: truncated(&sub, config.sub_genre_limit),
    })
}
