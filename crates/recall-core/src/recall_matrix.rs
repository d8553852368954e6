//! Recall Matrix
//!
//! Aligns one recall list to its presentation list. Each recall event maps
//! to the 1-indexed presentation position it matched, or NaN when nothing
//! matched (intrusions, items missing a required feature).
//!
//! Three strategies:
//! 1. **exact** - identity equality, first presented duplicate wins
//! 2. **best** - nearest presented item by mean feature distance, earliest
//!    index wins ties
//! 3. **smooth** - inverse-distance weights over every presented item; the
//!    reported position is the weighted mean position
//!
//! Matches never consume presentation slots: repeats of an item all map to
//! the same position.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::distance::{stimulus_distance, FeatureMetric};
use crate::params::MatchMode;
use crate::stimulus::Stimulus;

/// Per-list alignment of recall events to presentation positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallMatrix {
	positions: Vec<f64>,
	weights: Option<Vec<Vec<f64>>>,
	list_length: usize,
	mode: MatchMode,
}

impl RecallMatrix {
	/// Wrap precomputed 1-indexed positions (NaN = no match).
	#[must_use]
	pub const fn from_positions(positions: Vec<f64>, list_length: usize) -> Self {
		Self {
			positions,
			weights: None,
			list_length,
			mode: MatchMode::Exact,
		}
	}

	/// 1-indexed matched positions (soft positions under smooth matching).
	#[must_use]
	pub fn positions(&self) -> &[f64] {
		&self.positions
	}

	/// Number of recall events.
	#[must_use]
	pub fn len(&self) -> usize {
		self.positions.len()
	}

	/// Whether there are no recall events.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	/// Length of the presentation list.
	#[must_use]
	pub const fn list_length(&self) -> usize {
		self.list_length
	}

	/// Strategy that produced the matrix.
	#[must_use]
	pub const fn mode(&self) -> MatchMode {
		self.mode
	}

	/// Whether entries are discrete positions (exact/best) rather than soft
	/// weights.
	#[must_use]
	pub const fn is_discrete(&self) -> bool {
		self.weights.is_none()
	}

	/// 0-based presentation index per recall event, `None` for NaN, soft or
	/// out-of-range entries.
	#[must_use]
	pub fn indices(&self) -> Vec<Option<usize>> {
		self.positions
			.iter()
			.map(|&p| self.to_index(p))
			.collect()
	}

	fn to_index(&self, position: f64) -> Option<usize> {
		if !self.is_discrete() || position.is_nan() || position < 1.0 || position.fract() != 0.0 {
			return None;
		}
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let index = position as usize - 1;
		(index < self.list_length).then_some(index)
	}

	/// Per-event match weights over presentation positions.
	///
	/// Discrete matrices give one-hot rows (all zero for an intrusion); smooth
	/// matrices lend their normalized weights without copying. A row is all
	/// NaN when the event could not be compared at all.
	#[must_use]
	pub fn weight_rows(&self) -> Cow<'_, [Vec<f64>]> {
		match &self.weights {
			Some(weights) => Cow::Borrowed(weights),
			None => Cow::Owned(
				self.positions
					.iter()
					.map(|&p| self.one_hot(p))
					.collect(),
			),
		}
	}

	/// Weight row of the `n`-th recall event (zero-indexed).
	#[must_use]
	pub fn event_row(&self, n: usize) -> Option<Cow<'_, [f64]>> {
		match &self.weights {
			Some(weights) => weights.get(n).map(|row| Cow::Borrowed(row.as_slice())),
			None => self
				.positions
				.get(n)
				.map(|&p| Cow::Owned(self.one_hot(p))),
		}
	}

	fn one_hot(&self, position: f64) -> Vec<f64> {
		let mut row = vec![0.0; self.list_length];
		if let Some(index) = self.to_index(position) {
			row[index] = 1.0;
		} else if position.is_nan() && self.mode != MatchMode::Exact {
			// best-mode NaN means "not comparable", not "intrusion"
			row.fill(f64::NAN);
		}
		row
	}
}

// ============================================================================
// Builder
// ============================================================================

/// Build the recall matrix for one list.
///
/// `metrics` are the features compared under best/smooth matching; exact
/// matching ignores them.
#[must_use]
pub fn build_recall_matrix(
	presented: &[Stimulus],
	recalled: &[Stimulus],
	mode: MatchMode,
	metrics: &[FeatureMetric],
) -> RecallMatrix {
	let list_length = presented.len();

	match mode {
		MatchMode::Exact => RecallMatrix {
			positions: recalled
				.iter()
				.map(|stim| exact_position(presented, stim))
				.collect(),
			weights: None,
			list_length,
			mode,
		},
		MatchMode::Best => RecallMatrix {
			positions: recalled
				.iter()
				.enumerate()
				.map(|(r, stim)| {
					recall_distances(presented, stim, r, metrics).map_or(f64::NAN, |d| best_position(&d, r))
				})
				.collect(),
			weights: None,
			list_length,
			mode,
		},
		MatchMode::Smooth => {
			let weights: Vec<Vec<f64>> = recalled
				.iter()
				.enumerate()
				.map(|(r, stim)| {
					recall_distances(presented, stim, r, metrics)
						.map_or_else(|| vec![f64::NAN; list_length], |d| smooth_weights(&d))
				})
				.collect();

			let positions = weights
				.iter()
				.map(|row| {
					row.iter()
						.enumerate()
						.map(|(i, w)| {
							#[allow(clippy::cast_precision_loss)]
							let position = (i + 1) as f64;
							w * position
						})
						.sum()
				})
				.collect();

			RecallMatrix {
				positions,
				weights: Some(weights),
				list_length,
				mode,
			}
		}
	}
}

/// 1-indexed position of the first presented item with the same identity.
#[must_use]
pub fn exact_position(presented: &[Stimulus], recalled: &Stimulus) -> f64 {
	presented
		.iter()
		.position(|stim| stim.item == recalled.item)
		.map_or(f64::NAN, |i| {
			#[allow(clippy::cast_precision_loss)]
			let position = (i + 1) as f64;
			position
		})
}

/// Distances from one recalled item to every presented item.
///
/// `None` (with a warning) if the recalled item lacks a compared feature;
/// individual NaN entries where a presented item does.
fn recall_distances(
	presented: &[Stimulus],
	recalled: &Stimulus,
	recall_index: usize,
	metrics: &[FeatureMetric],
) -> Option<Vec<f64>> {
	if let Some(missing) = metrics
		.iter()
		.find(|m| recalled.feature(&m.feature).is_none())
	{
		warn!(
			recall = recall_index,
			item = %recalled.item,
			feature = %missing.feature,
			"recalled item lacks a compared feature; entry left unmatched"
		);
		return None;
	}
	if metrics.is_empty() {
		return None;
	}

	Some(
		presented
			.iter()
			.map(|stim| stimulus_distance(metrics, recalled, stim).unwrap_or(f64::NAN))
			.collect(),
	)
}

/// Nearest position (1-indexed); earliest index on ties.
fn best_position(distances: &[f64], recall_index: usize) -> f64 {
	let Some(min) = distances
		.iter()
		.copied()
		.filter(|d| !d.is_nan())
		.reduce(f64::min)
	else {
		return f64::NAN;
	};

	let tied: SmallVec<[usize; 4]> = distances
		.iter()
		.enumerate()
		.filter(|(_, &d)| d == min)
		.map(|(i, _)| i)
		.collect();

	if tied.len() > 1 {
		debug!(
			recall = recall_index,
			candidates = ?tied.as_slice(),
			"best-match tie resolved to earliest presentation index"
		);
	}

	#[allow(clippy::cast_precision_loss)]
	let position = (tied[0] + 1) as f64;
	position
}

/// Normalized inverse-distance weights.
///
/// Zero distances take all the weight, split evenly; NaN distances get
/// none. All-NaN input gives an all-NaN row.
#[must_use]
pub fn smooth_weights(distances: &[f64]) -> Vec<f64> {
	let exact_hits = distances.iter().filter(|&&d| d == 0.0).count();
	if exact_hits > 0 {
		#[allow(clippy::cast_precision_loss)]
		let share = 1.0 / exact_hits as f64;
		return distances
			.iter()
			.map(|&d| if d == 0.0 { share } else { 0.0 })
			.collect();
	}

	let inverse: Vec<f64> = distances
		.iter()
		.map(|&d| if d.is_nan() { 0.0 } else { 1.0 / d })
		.collect();
	let total: f64 = inverse.iter().sum();

	if total > 0.0 && total.is_finite() {
		inverse.into_iter().map(|w| w / total).collect()
	} else {
		vec![f64::NAN; distances.len()]
	}
}
