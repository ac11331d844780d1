//! # Listening Trends Module
//!
//! Peak hour, peak weekday and session statistics over recently played
//! tracks.
//!
//! ## Timestamps
//!
//! `played_at` is ISO-8601. RFC 3339 forms (`...Z` or `...+02:00`) are read
//! with their own offset; naive date-times are taken as UTC. Hour and weekday
//! are the wall-clock values in the timestamp's offset, while session gaps
//! compare absolute instants. Events whose timestamp does not parse are
//! dropped before aggregation.
//!
//! ## Tie-breaks
//!
//! - Peak hour: the smallest hour among the most frequent.
//! - Peak day: the first-encountered day among the most frequent.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Outcome};
use crate::stats::round_to;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

/// One entry of the recently-played history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub played_at: String,
    #[serde(default)]
    pub track: Option<PlayedTrack>,
}

impl PlayEvent {
    #[must_use]
    pub fn new(played_at: impl Into<String>, track: &str, artist: &str) -> Self {
        Self {
            played_at: played_at.into(),
            track: Some(PlayedTrack {
                name: track.to_string(),
                artists: vec![ArtistRef {
                    name: artist.to_string(),
                }],
            }),
        }
    }

    fn artist_names(&self) -> impl Iterator<Item = &str> {
        self.track
            .iter()
            .flat_map(|track| track.artists.iter())
            .map(|artist| artist.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListeningTrends {
    /// Hour of day (0-23) with the most plays.
    pub peak_hour: u32,
    /// Weekday name with the most plays.
    pub favorite_day: String,
    pub listening_sessions: usize,
    pub total_tracks: usize,
    pub unique_artists: usize,
    /// Plays per session, rounded to 1 decimal.
    pub avg_session_length: f64,
    /// Plays per wall-clock hour.
    pub hourly_activity: [usize; 24],
}

impl ListeningTrends {
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            peak_hour: 20,
            favorite_day: "Saturday".to_string(),
            listening_sessions: 15,
            total_tracks: 50,
            unique_artists: 10,
            avg_session_length: 3.3,
            hourly_activity: [0; 24],
        }
    }
}

/// Naive ISO-8601 forms accepted after RFC 3339, all read as UTC.
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a `played_at` value.
///
/// Accepts RFC 3339 (`T` or space separator), naive date-times with or
/// without seconds, and bare dates (midnight UTC).
///
/// # Examples
///
/// ```
/// use chrono::Timelike;
/// use muse_insights::trends::parse_played_at;
///
/// assert_eq!(parse_played_at("2024-03-02 20:15").unwrap().hour(), 20);
/// assert_eq!(parse_played_at("2024-03-02").unwrap().hour(), 0);
/// assert!(parse_played_at("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_played_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed);
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Plays per wall-clock hour; unparseable events are skipped.
#[must_use]
pub fn hourly_activity(events: &[PlayEvent]) -> [usize; 24] {
    let mut counts = [0usize; 24];
    for played_at in events.iter().filter_map(|e| parse_played_at(&e.played_at)) {
        counts[played_at.hour() as usize] += 1;
    }
    counts
}

/// Summarize recent plays into peak hour, peak day and session statistics.
///
/// # Returns
///
/// [`Outcome::Computed`] on success, otherwise [`ListeningTrends::fallback`]
/// together with the reason from [`try_analyze_listening_trends`].
///
/// # Examples
///
/// ```
/// use muse_insights::config::AnalysisConfig;
/// use muse_insights::trends::{analyze_listening_trends, PlayEvent};
///
/// let plays = vec![
///     PlayEvent::new("2024-03-02T20:00:00Z", "Glow", "Neon Wave"),
///     PlayEvent::new("2024-03-02T20:20:00Z", "Drift", "Neon Wave"),
/// ];
/// let trends = analyze_listening_trends(Some(plays.as_slice()), &AnalysisConfig::default());
/// assert_eq!(trends.value().peak_hour, 20);
/// assert_eq!(trends.value().listening_sessions, 1);
/// ```
pub fn analyze_listening_trends(
    events: Option<&[PlayEvent]>,
    config: &AnalysisConfig,
) -> Outcome<ListeningTrends> {
    Outcome::recover(
        "listening trends",
        || try_analyze_listening_trends(events, config),
        ListeningTrends::fallback,
    )
}

/// Fallible core of [`analyze_listening_trends`].
///
/// # Errors
///
/// - [`AnalysisError::MissingInput`] if `events` is absent or empty
/// - [`AnalysisError::MalformedRecord`] if no event has a parseable timestamp
/// - [`AnalysisError::NumericDegeneracy`] if `session_gap_minutes` does not
///   fit in a duration
pub fn try_analyze_listening_trends(
    events: Option<&[PlayEvent]>,
    config: &AnalysisConfig,
) -> Result<ListeningTrends, AnalysisError> {
    let events = events
        .filter(|events| !events.is_empty())
        .ok_or(AnalysisError::MissingInput)?;
    let session_gap = Duration::try_minutes(config.session_gap_minutes).ok_or_else(|| {
        AnalysisError::NumericDegeneracy(format!(
            "session gap of {} minutes is out of range",
            config.session_gap_minutes
        ))
    })?;

    let parsed: Vec<(DateTime<FixedOffset>, &PlayEvent)> = events
        .iter()
        .filter_map(|event| parse_played_at(&event.played_at).map(|at| (at, event)))
        .collect();
    if parsed.is_empty() {
        return Err(AnalysisError::MalformedRecord(format!(
            "none of {} play events has a parseable timestamp",
            events.len()
        )));
    }
    if parsed.len() < events.len() {
        debug!("Dropped {} play events with bad timestamps", events.len() - parsed.len());
    }

    let mut hourly = [0usize; 24];
    for (played_at, _) in &parsed {
        hourly[played_at.hour() as usize] += 1;
    }
    // Strict comparison keeps the smallest hour on ties
    let peak_hour = (0..24u32).fold(0u32, |best, hour| {
        if hourly[hour as usize] > hourly[best as usize] {
            hour
        } else {
            best
        }
    });

    let favorite_day = peak_day(parsed.iter().map(|(at, _)| at.format("%A").to_string()));

    let mut instants: Vec<DateTime<FixedOffset>> = parsed.iter().map(|(at, _)| *at).collect();
    instants.sort();
    let listening_sessions = count_sessions(&instants, session_gap);

    let unique_artists = parsed
        .iter()
        .flat_map(|(_, event)| event.artist_names())
        .collect::<HashSet<_>>()
        .len();

    let total_tracks = parsed.len();
    #[allow(clippy::cast_precision_loss)]
    let avg_session_length = round_to(total_tracks as f64 / listening_sessions.max(1) as f64, 1);

    debug!(
        "Trends over {total_tracks} plays: peak hour {peak_hour}, peak day {favorite_day}, {listening_sessions} sessions"
    );

    Ok(ListeningTrends {
        peak_hour,
        favorite_day,
        listening_sessions,
        total_tracks,
        unique_artists,
        avg_session_length,
        hourly_activity: hourly,
    })
}

/// Most frequent day name, first encountered on ties.
fn peak_day(days: impl Iterator<Item = String>) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for day in days {
        match counts.iter_mut().find(|(name, _)| *name == day) {
            Some((_, count)) => *count += 1,
            None => counts.push((day, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None::<(String, usize)>, |best, candidate| match best {
            Some(best) if best.1 >= candidate.1 => Some(best),
            _ => Some(candidate),
        })
        .map(|(day, _)| day)
        .unwrap_or_default()
}

/// Sessions in time-sorted `instants`; a gap longer than `gap` starts a new one.
fn count_sessions(instants: &[DateTime<FixedOffset>], gap: Duration) -> usize {
    if instants.is_empty() {
        return 0;
    }
    let breaks = instants
        .windows(2)
        .filter(|pair| {
            let elapsed = pair[1].signed_duration_since(pair[0]);
            if elapsed > gap {
                trace!("Session break after {} minutes", elapsed.num_minutes());
                true
            } else {
                false
            }
        })
        .count();
    breaks + 1
}
