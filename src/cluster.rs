//! # Track Clustering Module
//!
//! Groups feature rows with k-means over five descriptor columns and labels
//! each group by its centroid.
//!
//! ## Algorithm
//!
//! ```text
//! k = min(cluster_count, rows)
//! repeat cluster_restarts times:
//!     seed centroids with k-means++
//!     loop until centroid shift <= tolerance or max iterations:
//!         assign every row to its nearest centroid
//!         move each centroid to the mean of its rows
//! keep the run with the lowest inertia
//! ```
//!
//! Randomness comes only from the injected RNG. [`cluster_tracks`] seeds a
//! [`StdRng`] from `cluster_seed`, so identical input gives identical output.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Outcome};
use crate::features::{Column, FeatureTable};
use crate::mood::MoodLabel;
use crate::stats::round_to;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Columns clustered on, in centroid order.
pub const CLUSTER_COLUMNS: [Column; 5] = [
    Column::Danceability,
    Column::Energy,
    Column::Valence,
    Column::Acousticness,
    Column::Instrumentalness,
];

const DANCEABLE_ABOVE: f64 = 0.7;
const ACOUSTIC_ABOVE: f64 = 0.6;
const INSTRUMENTAL_ABOVE: f64 = 0.6;

type Point = [f64; 5];

/// Qualitative tag derived from a centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    Danceable,
    Acoustic,
    Instrumental,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackCluster {
    pub cluster_id: usize,
    pub count: usize,
    /// Share of all rows, rounded to 1 decimal.
    pub percentage: f64,
    pub mood: MoodLabel,
    pub characteristics: Vec<Characteristic>,
}

/// Placeholder returned when clustering is impossible.
#[must_use]
pub fn fallback_clusters() -> Vec<TrackCluster> {
    vec![
        TrackCluster {
            cluster_id: 0,
            count: 5,
            percentage: 50.0,
            mood: MoodLabel::Balanced,
            characteristics: vec![Characteristic::Danceable],
        },
        TrackCluster {
            cluster_id: 1,
            count: 5,
            percentage: 50.0,
            mood: MoodLabel::Peaceful,
            characteristics: vec![Characteristic::Acoustic],
        },
    ]
}

/// A fitted partition of the feature rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterModel {
    centroids: Vec<Point>,
    assignments: Vec<usize>,
    inertia: f64,
}

impl ClusterModel {
    /// Centroids in [`CLUSTER_COLUMNS`] order.
    #[must_use]
    pub fn centroids(&self) -> &[[f64; 5]] {
        &self.centroids
    }

    /// Cluster index of each row, in table order.
    #[must_use]
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Sum of squared distances of rows to their centroid.
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// One summary per non-empty cluster, ordered by cluster id.
    #[must_use]
    pub fn summarize(&self) -> Vec<TrackCluster> {
        let total = self.assignments.len();
        let mut counts = vec![0usize; self.centroids.len()];
        for &cluster in &self.assignments {
            counts[cluster] += 1;
        }

        self.centroids
            .iter()
            .zip(counts)
            .enumerate()
            .filter(|(_, (_, count))| *count > 0)
            .map(|(cluster_id, (centroid, count))| {
                let [danceability, energy, valence, acousticness, instrumentalness] = *centroid;
                #[allow(clippy::cast_precision_loss)]
                let percentage = round_to(count as f64 / total as f64 * 100.0, 1);

                TrackCluster {
                    cluster_id,
                    count,
                    percentage,
                    mood: MoodLabel::classify(valence, energy),
                    characteristics: characteristics(danceability, acousticness, instrumentalness),
                }
            })
            .collect()
    }
}

fn characteristics(danceability: f64, acousticness: f64, instrumentalness: f64) -> Vec<Characteristic> {
    let mut tags = Vec::new();
    if danceability > DANCEABLE_ABOVE {
        tags.push(Characteristic::Danceable);
    }
    if acousticness > ACOUSTIC_ABOVE {
        tags.push(Characteristic::Acoustic);
    } else if instrumentalness > INSTRUMENTAL_ABOVE {
        tags.push(Characteristic::Instrumental);
    }
    tags
}

/// Cluster `table` with the configured fixed seed.
///
/// # Returns
///
/// One [`TrackCluster`] per non-empty cluster, or [`fallback_clusters`] when
/// [`fit_clusters`] fails.
///
/// # Examples
///
/// ```
/// use muse_insights::cluster::cluster_tracks;
/// use muse_insights::config::AnalysisConfig;
/// use muse_insights::features::{AudioFeatures, FeatureTable};
///
/// let table = FeatureTable::new(vec![AudioFeatures::default(); 4]);
/// let clusters = cluster_tracks(&table, &AnalysisConfig::default()).into_value();
/// assert_eq!(clusters.iter().map(|c| c.count).sum::<usize>(), 4);
/// ```
pub fn cluster_tracks(table: &FeatureTable, config: &AnalysisConfig) -> Outcome<Vec<TrackCluster>> {
    let mut rng = StdRng::seed_from_u64(config.cluster_seed);
    cluster_tracks_with_rng(table, config, &mut rng)
}

/// Same as [`cluster_tracks`], drawing centroid seeds from `rng`.
pub fn cluster_tracks_with_rng<R: Rng>(
    table: &FeatureTable,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Outcome<Vec<TrackCluster>> {
    Outcome::recover(
        "clustering",
        || fit_clusters(table, config, rng).map(|model| model.summarize()),
        fallback_clusters,
    )
}

/// Fit k-means over [`CLUSTER_COLUMNS`] with `min(cluster_count, rows)` clusters.
///
/// # Errors
///
/// - [`AnalysisError::MissingInput`] for the placeholder table
/// - [`AnalysisError::InsufficientRows`] with no rows or `cluster_count == 0`
/// - [`AnalysisError::NumericDegeneracy`] if a clustering column is not finite
pub fn fit_clusters<R: Rng>(
    table: &FeatureTable,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<ClusterModel, AnalysisError> {
    if table.is_placeholder() {
        return Err(AnalysisError::MissingInput);
    }
    let points: Vec<Point> = table
        .rows()
        .iter()
        .map(|row| CLUSTER_COLUMNS.map(|column| row.get(column)))
        .collect();

    if points.is_empty() || config.cluster_count == 0 {
        return Err(AnalysisError::InsufficientRows {
            requested: config.cluster_count,
            available: points.len(),
        });
    }
    if points.iter().flatten().any(|value| !value.is_finite()) {
        return Err(AnalysisError::NumericDegeneracy(
            "non-finite value in clustering columns".to_string(),
        ));
    }

    let k = config.cluster_count.min(points.len());
    let mut best: Option<ClusterModel> = None;

    for run in 0..config.cluster_restarts.max(1) {
        let model = lloyd(&points, seed_centroids(&points, k, rng), config);
        trace!("k-means run {run}: inertia {:.6}", model.inertia);

        if best.as_ref().map_or(true, |b| model.inertia < b.inertia) {
            best = Some(model);
        }
    }

    let best = best.ok_or_else(|| AnalysisError::NumericDegeneracy("no k-means run completed".to_string()))?;
    debug!(
        "Clustered {} tracks into {k} clusters (inertia {:.4})",
        points.len(),
        best.inertia
    );
    Ok(best)
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn seed_centroids<R: Rng>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|point| nearest(point, &centroids).1)
            .collect();
        let total: f64 = weights.iter().sum();

        let index = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            weights
                .iter()
                .position(|&weight| {
                    target -= weight;
                    target < 0.0
                })
                .unwrap_or(points.len() - 1)
        } else {
            // Every point already coincides with a centroid
            rng.gen_range(0..points.len())
        };
        centroids.push(points[index]);
    }
    centroids
}

fn lloyd(points: &[Point], mut centroids: Vec<Point>, config: &AnalysisConfig) -> ClusterModel {
    let mut assignments = assign(points, &centroids);

    for _ in 0..config.cluster_max_iterations {
        let updated = recompute(points, &assignments, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .sum();

        centroids = updated;
        assignments = assign(points, &centroids);
        if shift <= config.cluster_tolerance {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&assignments)
        .map(|(point, &cluster)| squared_distance(point, &centroids[cluster]))
        .sum();

    ClusterModel {
        centroids,
        assignments,
        inertia,
    }
}

fn assign(points: &[Point], centroids: &[Point]) -> Vec<usize> {
    points.iter().map(|point| nearest(point, centroids).0).collect()
}

/// Index of and squared distance to the nearest centroid, lowest index on ties.
fn nearest(point: &Point, centroids: &[Point]) -> (usize, f64) {
    centroids
        .iter()
        .map(|centroid| squared_distance(point, centroid))
        .enumerate()
        .fold((0, f64::INFINITY), |best, (index, distance)| {
            if distance < best.1 {
                (index, distance)
            } else {
                best
            }
        })
}

/// Mean of each cluster's points; an empty cluster keeps its centroid.
fn recompute(points: &[Point], assignments: &[usize], centroids: &[Point]) -> Vec<Point> {
    let mut sums = vec![[0.0; 5]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(point) {
            *sum += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(centroids)
        .map(|((sum, count), previous)| match count {
            0 => *previous,
            #[allow(clippy::cast_precision_loss)]
            n => sum.map(|value| value / n as f64),
        })
        .collect()
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::AudioFeatures;

    fn row(danceability: f64, energy: f64, valence: f64, acousticness: f64, instrumentalness: f64) -> AudioFeatures {
        AudioFeatures {
            danceability,
            energy,
            valence,
            acousticness,
            instrumentalness,
            ..AudioFeatures::default()
        }
    }

    /// Three well separated groups of 4, 3 and 2 rows.
    fn grouped_table() -> FeatureTable {
        let mut rows = Vec::new();
        for jitter in [0.0, 0.01, 0.02, 0.03] {
            rows.push(row(0.9 - jitter, 0.9 - jitter, 0.9 - jitter, 0.1, 0.0));
        }
        for jitter in [0.0, 0.01, 0.02] {
            rows.push(row(0.3, 0.1 + jitter, 0.8 + jitter, 0.9 - jitter, 0.1));
        }
        for jitter in [0.0, 0.01] {
            rows.push(row(0.4, 0.8 + jitter, 0.1 + jitter, 0.1, 0.9 - jitter));
        }
        FeatureTable::new(rows)
    }

    #[test]
    fn test_counts_sum_to_row_count() {
        let table = grouped_table();
        let clusters = cluster_tracks(&table, &AnalysisConfig::default()).into_value();

        assert_eq!(clusters.iter().map(|c| c.count).sum::<usize>(), table.len());
        let percentage: f64 = clusters.iter().map(|c| c.percentage).sum();
        assert!((percentage - 100.0).abs() <= 0.2, "percentages sum to {percentage}");
    }

    #[test]
    fn test_percentages_never_exceed_one_hundred() {
        // 14 / 1 / 1 of 16 rows: 87.5 + 6.25 + 6.25 before rounding
        let mut rows = vec![row(0.5, 0.5, 0.5, 0.5, 0.5); 14];
        rows.push(row(0.9, 0.9, 0.9, 0.1, 0.0));
        rows.push(row(0.1, 0.1, 0.1, 0.9, 0.9));
        let clusters = cluster_tracks(&FeatureTable::new(rows), &AnalysisConfig::default()).into_value();

        let mut layout: Vec<(usize, f64)> = clusters.iter().map(|c| (c.count, c.percentage)).collect();
        layout.sort_by(|a, b| b.0.cmp(&a.0));
        assert_eq!(layout, vec![(14, 87.5), (1, 6.2), (1, 6.2)]);

        let total: f64 = clusters.iter().map(|c| c.percentage).sum();
        assert!(total <= 100.0, "percentages sum to {total}");
    }

    #[test]
    fn test_separated_groups_are_recovered() {
        let clusters = cluster_tracks(&grouped_table(), &AnalysisConfig::default()).into_value();
        assert_eq!(clusters.len(), 3);

        let find = |count: usize| {
            clusters
                .iter()
                .find(|c| c.count == count)
                .unwrap_or_else(|| panic!("no cluster of size {count}"))
        };

        let party = find(4);
        assert_eq!(party.mood, MoodLabel::Euphoric);
        assert_eq!(party.characteristics, vec![Characteristic::Danceable]);
        assert_eq!(party.percentage, 44.4);

        let calm = find(3);
        assert_eq!(calm.mood, MoodLabel::Peaceful);
        assert_eq!(calm.characteristics, vec![Characteristic::Acoustic]);

        let tense = find(2);
        assert_eq!(tense.mood, MoodLabel::AngryTense);
        assert_eq!(tense.characteristics, vec![Characteristic::Instrumental]);
    }

    #[test]
    fn test_deterministic_with_fixed_seed() {
        let table = grouped_table();
        let config = AnalysisConfig::default();
        assert_eq!(cluster_tracks(&table, &config), cluster_tracks(&table, &config));

        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            fit_clusters(&table, &config, &mut a).unwrap(),
            fit_clusters(&table, &config, &mut b).unwrap()
        );
    }

    #[test]
    fn test_k_capped_at_row_count() {
        let table = FeatureTable::new(vec![row(0.8, 0.8, 0.8, 0.1, 0.1), row(0.1, 0.1, 0.1, 0.9, 0.1)]);
        let clusters = cluster_tracks(&table, &AnalysisConfig::default()).into_value();

        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.count == 1 && c.percentage == 50.0));
    }

    #[test]
    fn test_single_row_single_cluster() {
        let table = FeatureTable::new(vec![AudioFeatures::default()]);
        let outcome = cluster_tracks(&table, &AnalysisConfig::default());
        assert!(!outcome.is_fallback());

        let clusters = outcome.into_value();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].cluster_id, 0);
        assert_eq!(clusters[0].count, 1);
        assert_eq!(clusters[0].percentage, 100.0);
        assert_eq!(clusters[0].mood, MoodLabel::Balanced);
        assert!(clusters[0].characteristics.is_empty());
    }

    #[test]
    fn test_identical_rows_omit_empty_clusters() {
        let table = FeatureTable::new(vec![row(0.5, 0.5, 0.5, 0.5, 0.5); 6]);
        let model = fit_clusters(&table, &AnalysisConfig::default(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(model.assignments().len(), 6);
        assert_eq!(model.inertia(), 0.0);

        let clusters = model.summarize();
        assert_eq!(clusters.iter().map(|c| c.count).sum::<usize>(), 6);
        assert!(clusters.iter().all(|c| c.count > 0));
    }

    #[test]
    fn test_assignments_align_with_rows() {
        let table = grouped_table();
        let model = fit_clusters(&table, &AnalysisConfig::default(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(model.assignments().len(), table.len());
        assert_eq!(model.centroids().len(), 3);
        // Rows of the first group share a cluster
        assert!(model.assignments()[..4].iter().all(|&c| c == model.assignments()[0]));
    }

    #[test]
    fn test_characteristics_are_exclusive() {
        assert_eq!(
            characteristics(0.8, 0.9, 0.9),
            vec![Characteristic::Danceable, Characteristic::Acoustic]
        );
        assert_eq!(characteristics(0.7, 0.6, 0.61), vec![Characteristic::Instrumental]);
        assert!(characteristics(0.7, 0.6, 0.6).is_empty());
    }

    #[test]
    fn test_empty_table_falls_back() {
        let outcome = cluster_tracks(&FeatureTable::default(), &AnalysisConfig::default());
        assert_eq!(
            outcome.reason(),
            Some(&AnalysisError::InsufficientRows {
                requested: 3,
                available: 0
            })
        );
        assert_eq!(outcome.into_value(), fallback_clusters());
    }

    #[test]
    fn test_placeholder_table_falls_back() {
        let outcome = cluster_tracks(&FeatureTable::fallback(), &AnalysisConfig::default());
        assert_eq!(outcome.reason(), Some(&AnalysisError::MissingInput));
        assert_eq!(outcome.into_value().len(), 2);
    }

    #[test]
    fn test_non_finite_values_fall_back() {
        let table = FeatureTable::new(vec![row(f64::NAN, 0.5, 0.5, 0.5, 0.5)]);
        let outcome = cluster_tracks(&table, &AnalysisConfig::default());
        assert!(matches!(outcome.reason(), Some(AnalysisError::NumericDegeneracy(_))));
    }
}
