//! Synthetic listener data in the same shapes the collector delivers.
//!
//! Used for demos without an account and for exercising the analyzers in
//! tests and benchmarks. The RNG and the reference time are always supplied
//! by the caller, so a fixed seed reproduces the same data set.

use crate::features::RawAudioFeatures;
use crate::genres::ArtistRecord;
use crate::report::ListenerActivity;
use crate::trends::{ArtistRef, PlayEvent, PlayedTrack};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const TRACK_COUNT: usize = 20;
const ARTIST_COUNT: usize = 20;
const PLAY_COUNT: usize = 50;

const PLAY_ARTISTS: [&str; 6] = [
    "The Digital Dreams",
    "Electronic Echo",
    "Midnight Pulse",
    "Neon Wave",
    "Cyber Symphony",
    "Virtual Voltage",
];

const MAIN_GENRES: [&str; 12] = [
    "Pop", "Rock", "Hip-Hop", "Electronic", "Jazz", "Classical", "Indie", "Folk", "R&B", "Metal",
    "Ambient", "Blues",
];

const SUB_GENRES: [&str; 8] = [
    "Synthwave",
    "Dream Pop",
    "Alternative",
    "Neo-Soul",
    "Post-Rock",
    "Trip-Hop",
    "Lo-Fi",
    "Future Bass",
];

#[derive(Debug, Clone, PartialEq)]
pub struct DemoData {
    pub audio_features: Vec<RawAudioFeatures>,
    pub artists: Vec<ArtistRecord>,
    /// Newest first.
    pub recent_plays: Vec<PlayEvent>,
}

impl DemoData {
    pub fn generate<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Self {
        Self {
            audio_features: (0..TRACK_COUNT).map(|i| audio_features(rng, i)).collect(),
            artists: (0..ARTIST_COUNT).map(|i| artist(rng, i)).collect(),
            recent_plays: recent_plays(rng, now),
        }
    }

    #[must_use]
    pub fn into_activity(self) -> ListenerActivity {
        ListenerActivity {
            audio_features: Some(self.audio_features.into_iter().map(Some).collect()),
            top_artists: Some(self.artists),
            recent_plays: Some(self.recent_plays),
        }
    }
}

fn audio_features<R: Rng>(rng: &mut R, index: usize) -> RawAudioFeatures {
    RawAudioFeatures {
        id: Some(format!("track_{index}")),
        danceability: Some(rng.gen_range(0.3..0.9)),
        energy: Some(rng.gen_range(0.4..0.95)),
        valence: Some(rng.gen_range(0.2..0.8)),
        tempo: Some(rng.gen_range(70.0..180.0)),
        acousticness: Some(rng.gen_range(0.1..0.9)),
        instrumentalness: Some(rng.gen_range(0.0..0.8)),
        liveness: Some(rng.gen_range(0.1..0.8)),
        speechiness: Some(rng.gen_range(0.03..0.6)),
        ..RawAudioFeatures::default()
    }
}

fn artist<R: Rng>(rng: &mut R, index: usize) -> ArtistRecord {
    let main = MAIN_GENRES.choose(rng).copied().unwrap_or("Pop");
    let mut genres = vec![main.to_string()];
    genres.extend(SUB_GENRES.choose_multiple(rng, 2).map(|g| (*g).to_string()));

    ArtistRecord {
        name: format!("Artist {index}"),
        genres: Some(genres),
    }
}

fn recent_plays<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<PlayEvent> {
    let mut plays: Vec<(DateTime<Utc>, PlayEvent)> = (0..PLAY_COUNT)
        .map(|index| {
            let played_at = now - Duration::hours(rng.gen_range(1..=168));
            let artist = PLAY_ARTISTS.choose(rng).copied().unwrap_or(PLAY_ARTISTS[0]);
            let event = PlayEvent {
                played_at: played_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                track: Some(PlayedTrack {
                    name: format!("Demo Track {index}"),
                    artists: vec![ArtistRef {
                        name: artist.to_string(),
                    }],
                }),
            };
            (played_at, event)
        })
        .collect();

    plays.sort_by(|a, b| b.0.cmp(&a.0));
    plays.into_iter().map(|(_, event)| event).collect()
}
