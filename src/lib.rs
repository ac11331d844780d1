//! Listening analytics over a listener's music-service activity.
//!
//! Core modules:
//! - [`features`] - Feature table construction and defaulting
//! - [`mood`] - Mood classification and emotional statistics
//! - [`patterns`] - Tempo, acoustic balance and complexity
//! - [`genres`] - Genre distribution from top artists
//! - [`trends`] - Peak hour, peak day and listening sessions
//! - [`cluster`] - k-means track clustering
//! - [`taste`] - Qualitative insights and personality traits
//!
//! ### Supporting Modules
//!
//! - [`report`] - One-call aggregate report over a listener snapshot
//! - [`demo`] - Synthetic listener data
//! - [`config`] - Analysis tunables and config-file loading
//! - [`error`] - Failure taxonomy and the [`Outcome`] type
//! - [`stats`] - Column statistics
//!
//! ## Quick Start Example
//!
//! ```
//! use muse_insights::{features, mood, cluster, config::AnalysisConfig};
//! use muse_insights::features::RawAudioFeatures;
//!
//! let records = vec![
//!     Some(RawAudioFeatures { valence: Some(0.8), energy: Some(0.9), ..Default::default() }),
//!     None,
//!     Some(RawAudioFeatures { valence: Some(0.7), energy: Some(0.8), ..Default::default() }),
//! ];
//!
//! let table = features::build_feature_table(Some(records.as_slice())).into_value();
//! let analysis = mood::analyze_mood(&table).into_value();
//! println!("Primary mood: {}", analysis.primary_mood);
//!
//! let clusters = cluster::cluster_tracks(&table, &AnalysisConfig::default()).into_value();
//! assert_eq!(clusters.iter().map(|c| c.count).sum::<usize>(), table.len());
//! ```
//!
//! ## Error Handling
//!
//! Analyzers never fail. Each returns an [`Outcome`]: either the computed
//! value or the documented default together with the [`AnalysisError`] that
//! caused it. The fallible cores are public as `try_*` functions.
//!
//! Config file loading is the only operation returning `anyhow::Result`.
//!
//! ## Logging
//!
//! Uses the `log` facade. Analyzers log computed summaries at `debug`,
//! recovery branches at `warn` and clustering iterations at `trace`; the
//! embedding application picks the logger.
//!
//! ## Determinism
//!
//! All randomness is injected. Clustering seeds its own RNG from
//! `cluster_seed`, so repeated calls on identical input give identical
//! output.

pub mod cluster;
pub mod config;
pub mod demo;
pub mod error;
pub mod features;
pub mod genres;
pub mod mood;
pub mod patterns;
pub mod report;
pub mod stats;
pub mod taste;
pub mod trends;

pub use error::{AnalysisError, Outcome};
