//! # Configuration Module
//!
//! Tunables for the analyzers and loading them from disk.
//!
//! ## Config File
//!
//! An optional JSON file in the platform-standard config directory:
//! - Linux: `~/.config/muse-insights/config.json`
//! - macOS: `~/Library/Application Support/muse-insights/config.json`
//! - Windows: `%APPDATA%\muse-insights\config.json`
//!
//! Every field is optional; missing fields keep their defaults.
//!
//! ```json
//! { "cluster_count": 4, "session_gap_minutes": 90 }
//! ```

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest accepted session gap: one year.
pub const MAX_SESSION_GAP_MINUTES: i64 = 60 * 24 * 365;

/// Analysis parameters shared by every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Requested number of track clusters. Capped at the row count.
    pub cluster_count: usize,
    /// Seed for centroid initialization, fixed for reproducibility.
    pub cluster_seed: u64,
    /// Independent initializations; the lowest-inertia run wins.
    pub cluster_restarts: usize,
    pub cluster_max_iterations: usize,
    /// Convergence threshold on total centroid movement.
    pub cluster_tolerance: f64,
    /// A gap longer than this starts a new listening session.
    pub session_gap_minutes: i64,
    /// Length of the flat genre ranking.
    pub top_genres: usize,
    pub main_genre_limit: usize,
    pub sub_genre_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cluster_count: 3,
            cluster_seed: 42,
            cluster_restarts: 10,
            cluster_max_iterations: 300,
            cluster_tolerance: 1e-4,
            session_gap_minutes: 120,
            top_genres: 10,
            main_genre_limit: 5,
            sub_genre_limit: 10,
        }
    }
}

impl AnalysisConfig {
    /// Read and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid JSON, or holds values
    /// rejected by [`AnalysisConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid JSON in config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid values in config file {}", path.display()))?;

        debug!("Loaded analysis config from {}", path.display());
        Ok(config)
    }

    /// Load the config from [`config_path`], or use defaults if there is
    /// none or it cannot be used.
    #[must_use]
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            debug!("No platform config directory, using default analysis config");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        Self::from_file(&path).unwrap_or_else(|e| {
            warn!("Ignoring config file: {e:#}");
            Self::default()
        })
    }

    /// Reject values that would make an analyzer meaningless.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.cluster_count == 0, "cluster_count must be at least 1"),
            (self.cluster_restarts == 0, "cluster_restarts must be at least 1"),
            (self.cluster_max_iterations == 0, "cluster_max_iterations must be at least 1"),
            (
                !(self.cluster_tolerance >= 0.0 && self.cluster_tolerance.is_finite()),
                "cluster_tolerance must be a non-negative number",
            ),
            (self.session_gap_minutes <= 0, "session_gap_minutes must be positive"),
            (
                self.session_gap_minutes > MAX_SESSION_GAP_MINUTES,
                "session_gap_minutes must be at most one year",
            ),
            (self.top_genres == 0, "top_genres must be at least 1"),
            (self.main_genre_limit == 0, "main_genre_limit must be at least 1"),
            (self.sub_genre_limit == 0, "sub_genre_limit must be at least 1"),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(anyhow::anyhow!(*message)),
            None => Ok(()),
        }
    }
}

/// Platform-appropriate location of the optional config file.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("muse-insights").join("config.json"))
}
