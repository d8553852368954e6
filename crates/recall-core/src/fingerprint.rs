//! Memory Fingerprint
//!
//! How strongly a subject's recall transitions are organized along each
//! stimulus feature.
//!
//! For every transition `current → next` between two fresh recalls, the
//! observed distance `t = d(current, next)` is ranked against the distances
//! from `current` to every item still unrecalled (the pool, which includes
//! `next`):
//!
//! ```text
//! rank  = |{d ∈ pool : d > t}| + (|{d ∈ pool : d = t}| + 1) / 2
//! score = rank / |pool|
//! ```
//!
//! Picking the closest remaining item scores 1, the farthest scores close to
//! 0, and a list's score is the mean over its transitions. The temporal
//! variant uses presentation position as the feature and `|i − j|` as the
//! distance.
//!
//! Raw scores depend on list length and on how many items were recalled, so
//! the corrected form compares the real score against scores from shuffled
//! recall orders and reports the fraction of shuffles that scored strictly
//! lower.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::distance::FeatureMetric;
use crate::error::{AnalysisError, Result};
use crate::params::AnalysisParams;
use crate::recall_matrix::RecallMatrix;
use crate::stimulus::Stimulus;

/// Name of the implicit presentation-position feature.
pub const TEMPORAL: &str = "temporal";

/// Score reported when a list has too few recalls to judge.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Fewest recall events that can produce a clustering score.
pub const MIN_RECALLS: usize = 3;

// ============================================================================
// Features & Distances
// ============================================================================

/// A dimension along which clustering is measured.
#[derive(Debug, Clone)]
pub enum ClusterFeature {
	/// Presentation position, compared by absolute difference
	Temporal,
	/// A stimulus feature with its distance function
	Stimulus(FeatureMetric),
}

impl ClusterFeature {
	/// Feature name as reported in results.
	#[must_use]
	pub fn name(&self) -> &str {
		match self {
			Self::Temporal => TEMPORAL,
			Self::Stimulus(metric) => &metric.feature,
		}
	}
}

/// Pairwise distances between the presented items of one list.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
	size: usize,
	values: Vec<f64>,
}

impl DistanceMatrix {
	/// Distances along one feature.
	#[must_use]
	pub fn new(presented: &[Stimulus], feature: &ClusterFeature) -> Self {
		let size = presented.len();
		let mut values = Vec::with_capacity(size * size);

		for (i, a) in presented.iter().enumerate() {
			for (j, b) in presented.iter().enumerate() {
				let d = match feature {
					#[allow(clippy::cast_precision_loss)]
					ClusterFeature::Temporal => i.abs_diff(j) as f64,
					ClusterFeature::Stimulus(metric) => metric.between(a, b).unwrap_or(f64::NAN),
				};
				values.push(d);
			}
		}

		Self { size, values }
	}

	/// Number of presented items.
	#[must_use]
	pub const fn len(&self) -> usize {
		self.size
	}

	/// Whether the list was empty.
	#[must_use]
	pub const fn is_empty(&self) -> bool {
		self.size == 0
	}

	/// Distance between presented items `i` and `j` (0-based).
	#[inline]
	#[must_use]
	pub fn get(&self, i: usize, j: usize) -> f64 {
		self.values[i * self.size + j]
	}
}

// ============================================================================
// Raw Score
// ============================================================================

/// Score of one transition given the pool distances and the observed one.
///
/// NaN pool entries are ignored; an empty pool gives NaN.
#[must_use]
pub fn step_score(pool: &[f64], observed: f64) -> f64 {
	let (farther, tied, size) = pool
		.iter()
		.filter(|d| !d.is_nan())
		.fold((0_usize, 0_usize, 0_usize), |(farther, tied, size), &d| {
			if d > observed {
				(farther + 1, tied, size + 1)
			} else if d == observed {
				(farther, tied + 1, size + 1)
			} else {
				(farther, tied, size + 1)
			}
		});

	if size == 0 {
		return f64::NAN;
	}

	#[allow(clippy::cast_precision_loss)]
	let rank = farther as f64 + (tied as f64 + 1.0) / 2.0;
	#[allow(clippy::cast_precision_loss)]
	let size = size as f64;
	rank / size
}

/// Mean transition score of one recall sequence along one feature.
///
/// `recalls` holds 0-based presentation indices (`None` for intrusions).
/// A transition is scored only when both ends are valid, `current` was not
/// recalled before and `next` was not recalled up to and including
/// `current`. Returns NaN when no transition qualifies.
#[must_use]
pub fn clustering_score(recalls: &[Option<usize>], distances: &DistanceMatrix) -> f64 {
	let n = distances.len();
	let valid = |p: &Option<usize>| p.filter(|&i| i < n);

	let mut recalled = vec![false; n];
	let mut total = 0.0;
	let mut steps = 0_usize;

	for pair in recalls.windows(2) {
		let current = valid(&pair[0]);
		let fresh = current.filter(|&c| !recalled[c]);
		if let Some(c) = current {
			recalled[c] = true;
		}

		let Some(c) = fresh else { continue };
		let Some(next) = valid(&pair[1]).filter(|&x| !recalled[x]) else {
			continue;
		};

		let observed = distances.get(c, next);
		if observed.is_nan() {
			continue;
		}

		let pool: Vec<f64> = (0..n)
			.filter(|&j| !recalled[j])
			.map(|j| distances.get(c, j))
			.collect();

		let score = step_score(&pool, observed);
		if !score.is_nan() {
			total += score;
			steps += 1;
		}
	}

	if steps == 0 {
		f64::NAN
	} else {
		#[allow(clippy::cast_precision_loss)]
		let steps = steps as f64;
		total / steps
	}
}

// ============================================================================
// Permutation Correction
// ============================================================================

/// Settings for scoring one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusteringConfig {
	/// Report permutation-corrected scores
	pub permute: bool,
	/// Number of shuffles
	pub n_perms: usize,
	/// Base seed; trial `t` uses `seed + t`
	pub seed: Option<u64>,
	/// Run trials on the rayon pool
	pub parallel: bool,
}

impl Default for ClusteringConfig {
	fn default() -> Self {
		Self {
			permute: false,
			n_perms: 1000,
			seed: None,
			parallel: true,
		}
	}
}

impl From<&AnalysisParams> for ClusteringConfig {
	fn from(params: &AnalysisParams) -> Self {
		Self {
			permute: params.permute,
			n_perms: params.n_perms,
			seed: params.seed,
			parallel: params.parallel,
		}
	}
}

/// Fraction of shuffled recall orders that score strictly below the real
/// score, per feature.
///
/// `real` pairs with `distances` by index; entries without a matching
/// distance matrix come back NaN.
///
/// Each trial owns its RNG, so seeded runs give the same answer serially
/// and in parallel.
#[must_use]
pub fn permutation_correct(
	recalls: &[Option<usize>],
	distances: &[DistanceMatrix],
	real: &[f64],
	config: &ClusteringConfig,
) -> Vec<f64> {
	if config.n_perms == 0 {
		return vec![f64::NAN; real.len()];
	}

	let base_seed = config.seed.unwrap_or_else(rand::random);
	let trial = |t: usize| -> Vec<f64> {
		let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(t as u64));
		let mut shuffled = recalls.to_vec();
		shuffled.shuffle(&mut rng);
		distances
			.iter()
			.map(|matrix| clustering_score(&shuffled, matrix))
			.collect()
	};

	let trials: Vec<Vec<f64>> = if config.parallel {
		(0..config.n_perms).into_par_iter().map(trial).collect()
	} else {
		(0..config.n_perms).map(trial).collect()
	};

	#[allow(clippy::cast_precision_loss)]
	let n_perms = config.n_perms as f64;

	real.iter()
		.enumerate()
		.map(|(f, &score)| {
			if score.is_nan() || f >= distances.len() {
				return f64::NAN;
			}
			let below = trials.iter().filter(|scores| scores[f] < score).count();
			#[allow(clippy::cast_precision_loss)]
			let below = below as f64;
			below / n_perms
		})
		.collect()
}

/// Clustering scores of one list along each feature.
///
/// Fewer than [`MIN_RECALLS`] recall events yields [`NEUTRAL_SCORE`] for
/// every feature.
///
/// # Errors
///
/// Returns [`AnalysisError::UnsupportedMatchMode`] for a smooth (non-discrete)
/// recall matrix.
pub fn list_fingerprint(
	matrix: &RecallMatrix,
	distances: &[DistanceMatrix],
	config: &ClusteringConfig,
) -> Result<Vec<f64>> {
	if !matrix.is_discrete() {
		return Err(AnalysisError::UnsupportedMatchMode {
			analysis: "fingerprint",
			mode: matrix.mode().as_str(),
		});
	}

	if matrix.len() < MIN_RECALLS {
		warn!(
			recalls = matrix.len(),
			minimum = MIN_RECALLS,
			"too few recalls for clustering; using neutral score"
		);
		return Ok(vec![NEUTRAL_SCORE; distances.len()]);
	}

	let recalls = matrix.indices();
	let real: Vec<f64> = distances
		.iter()
		.map(|m| clustering_score(&recalls, m))
		.collect();

	if !config.permute {
		return Ok(real);
	}

	debug!(n_perms = config.n_perms, "permutation-correcting clustering scores");
	Ok(permutation_correct(&recalls, distances, &real, config))
}

// ============================================================================
// Named Scores & Running State
// ============================================================================

/// Clustering score per named feature, in a fixed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScores {
	features: Vec<String>,
	scores: Vec<f64>,
}

impl FeatureScores {
	/// Pair names with scores.
	///
	/// # Errors
	///
	/// Returns [`AnalysisError::InvalidParameter`] if the lengths differ.
	pub fn new(features: Vec<String>, scores: Vec<f64>) -> Result<Self> {
		if features.len() != scores.len() {
			return Err(AnalysisError::InvalidParameter {
				name: "scores",
				reason: format!("{} features but {} scores", features.len(), scores.len()),
			});
		}
		Ok(Self { features, scores })
	}

	/// Score of a feature.
	#[must_use]
	pub fn get(&self, feature: &str) -> Option<f64> {
		self.features
			.iter()
			.position(|f| f == feature)
			.map(|i| self.scores[i])
	}

	/// Feature names.
	#[must_use]
	pub fn features(&self) -> &[String] {
		&self.features
	}

	/// Scores, aligned with [`FeatureScores::features`].
	#[must_use]
	pub fn scores(&self) -> &[f64] {
		&self.scores
	}

	/// `(feature, score)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
		self.features
			.iter()
			.map(String::as_str)
			.zip(self.scores.iter().copied())
	}
}

/// Running average of a subject's fingerprint across analyzed lists.
///
/// Immutable: [`FingerprintState::update`] returns the next state and the
/// caller decides which one to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintState {
	features: Vec<String>,
	means: Vec<f64>,
	counts: Vec<usize>,
	n_lists: usize,
	history: Vec<FeatureScores>,
}

impl FingerprintState {
	/// Neutral state: [`NEUTRAL_SCORE`] for every feature, nothing observed.
	#[must_use]
	pub fn new(features: &[String]) -> Self {
		Self {
			features: features.to_vec(),
			means: vec![NEUTRAL_SCORE; features.len()],
			counts: vec![0; features.len()],
			n_lists: 0,
			history: Vec::new(),
		}
	}

	/// Fold one observation into the running mean.
	///
	/// NaN scores leave that feature unchanged; features the state has not
	/// seen before are added. Only observations with at least one real score
	/// count towards [`FingerprintState::n_lists`] and the history.
	#[must_use]
	pub fn update(&self, observation: &FeatureScores) -> Self {
		let mut next = self.clone();

		for (feature, score) in observation.iter() {
			let idx = match next.features.iter().position(|f| f == feature) {
				Some(idx) => idx,
				None => {
					next.features.push(feature.to_owned());
					next.means.push(NEUTRAL_SCORE);
					next.counts.push(0);
					next.features.len() - 1
				}
			};

			if score.is_nan() {
				continue;
			}

			let count = next.counts[idx];
			next.means[idx] = if count == 0 {
				score
			} else {
				#[allow(clippy::cast_precision_loss)]
				let n = (count + 1) as f64;
				next.means[idx] + (score - next.means[idx]) / n
			};
			next.counts[idx] = count + 1;
		}

		if observation.scores.iter().any(|s| !s.is_nan()) {
			next.n_lists += 1;
			next.history.push(observation.clone());
		}
		next
	}

	/// Current mean scores.
	#[must_use]
	pub fn scores(&self) -> FeatureScores {
		FeatureScores {
			features: self.features.clone(),
			scores: self.means.clone(),
		}
	}

	/// Current mean for one feature.
	#[must_use]
	pub fn get(&self, feature: &str) -> Option<f64> {
		self.features
			.iter()
			.position(|f| f == feature)
			.map(|i| self.means[i])
	}

	/// Number of lists that contributed at least one real score.
	#[must_use]
	pub const fn n_lists(&self) -> usize {
		self.n_lists
	}

	/// Every observation, oldest first.
	#[must_use]
	pub fn history(&self) -> &[FeatureScores] {
		&self.history
	}
}
