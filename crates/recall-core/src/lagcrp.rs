//! Lag Conditional Response Probability
//!
//! For every lag `d = j − i` between two presentation positions, the
//! probability that a transition of that lag was made, given that it could
//! have been made:
//!
//! ```text
//! CRP(d) = actual(d) / possible(d)        (0 when possible(d) = 0)
//! ```
//!
//! Transitions to or from an already-recalled item are not counted, and the
//! "possible" histogram at each step only includes items not yet recalled.
//!
//! Output covers lags `−L..=L` (length `2L + 1`) with NaN at lag 0.

use crate::recall_matrix::RecallMatrix;

/// Lag labels matching [`lag_crp`] output: `−L..=L`.
#[must_use]
pub fn lag_labels(list_length: usize) -> Vec<i64> {
	let l = i64::try_from(list_length).unwrap_or(i64::MAX);
	(-l..=l).collect()
}

/// Lag-CRP for one list, dispatching on the matrix kind.
#[must_use]
pub fn lag_crp(matrix: &RecallMatrix) -> Vec<f64> {
	if matrix.is_discrete() {
		let indices: Vec<usize> = matrix.indices().into_iter().flatten().collect();
		lag_crp_discrete(&indices, matrix.list_length())
	} else {
		lag_crp_smooth(&matrix.weight_rows(), matrix.list_length())
	}
}

/// Lag-CRP from 0-based recalled positions (intrusions already removed).
#[must_use]
pub fn lag_crp_discrete(recalls: &[usize], list_length: usize) -> Vec<f64> {
	let width = 2 * list_length + 1;
	let mut actual = vec![0.0; width];
	let mut possible = vec![0.0; width];

	let valid: Vec<usize> = recalls
		.iter()
		.copied()
		.filter(|&p| p < list_length)
		.collect();

	// Actual transitions
	let mut recalled = vec![false; list_length];
	for pair in valid.windows(2) {
		let (a, b) = (pair[0], pair[1]);
		if a != b && !recalled[a] && !recalled[b] {
			actual[list_length + b - a] += 1.0;
		}
		recalled[a] = true;
	}

	// Possible transitions
	let mut recalled = vec![false; list_length];
	for &a in &valid {
		if recalled[a] {
			continue;
		}
		recalled[a] = true;
		for (j, _) in recalled.iter().enumerate().filter(|(_, &r)| !r) {
			possible[list_length + j - a] += 1.0;
		}
	}

	finish(&actual, &possible, list_length)
}

/// Lag-CRP from soft match weights.
///
/// With `A_r[j]` the probability that item `j` is still unrecalled before
/// event `r`, each event spreads its weight `w_r[i]·A_r[i]` over the lags it
/// could take next (`A_{r+1}[j]`) and the lag it did take
/// (`w_{r+1}[j]·A_{r+1}[j]`). One-hot weights reproduce
/// [`lag_crp_discrete`] exactly.
#[must_use]
pub fn lag_crp_smooth(weights: &[Vec<f64>], list_length: usize) -> Vec<f64> {
	let width = 2 * list_length + 1;
	let mut actual = vec![0.0; width];
	let mut possible = vec![0.0; width];

	let rows: Vec<&Vec<f64>> = weights
		.iter()
		.filter(|row| row.len() == list_length && !row.iter().any(|w| w.is_nan()))
		.collect();

	let mut available = vec![1.0; list_length];
	for (r, row) in rows.iter().enumerate() {
		let source: Vec<f64> = row.iter().zip(&available).map(|(w, a)| w * a).collect();
		let next_available: Vec<f64> = available
			.iter()
			.zip(row.iter())
			.map(|(a, w)| a * (1.0 - w))
			.collect();
		let next_row = rows.get(r + 1);

		for (i, &s) in source.iter().enumerate() {
			if s == 0.0 {
				continue;
			}
			for (j, &avail) in next_available.iter().enumerate() {
				if i == j {
					continue;
				}
				let lag = list_length + j - i;
				possible[lag] += s * avail;
				if let Some(next) = next_row {
					actual[lag] += s * next[j] * avail;
				}
			}
		}

		available = next_available;
	}

	finish(&actual, &possible, list_length)
}

fn finish(actual: &[f64], possible: &[f64], list_length: usize) -> Vec<f64> {
	actual
		.iter()
		.zip(possible)
		.enumerate()
		.map(|(idx, (&a, &p))| {
			if idx == list_length {
				f64::NAN
			} else if p == 0.0 {
				0.0
			} else {
				a / p
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::distance::{DistanceRegistry, FeatureSchema};
	use crate::params::MatchMode;
	use crate::recall_matrix::build_recall_matrix;
	use crate::stimulus::{items, Stimulus};

	const THIRD: f64 = 1.0 / 3.0;

	fn assert_close(actual: &[f64], expected: &[f64]) {
		assert_eq!(actual.len(), expected.len());
		for (a, e) in actual.iter().zip(expected) {
			if e.is_nan() {
				assert!(a.is_nan(), "expected NaN, got {a}");
			} else {
				assert!((a - e).abs() < 1e-9, "expected {e}, got {a}");
			}
		}
	}

	fn scenario() -> RecallMatrix {
		let pres = items(&["1", "2", "3", "4", "5", "6", "7", "8"]);
		let rec = items(&["8", "7", "1", "2", "3", "5", "6", "4"]);
		build_recall_matrix(&pres, &rec, MatchMode::Exact, &[])
	}

	#[test]
	fn known_lagcrp_vector() {
		let expected = [
			0.0, 0.0, 0.5, 0.0, 0.0, 0.0, THIRD, THIRD, f64::NAN, 0.75, THIRD, 0.0, 0.0, 0.0, 0.0,
			0.0, 0.0,
		];
		assert_close(&lag_crp(&scenario()), &expected);
	}

	#[test]
	fn labels_line_up_with_output() {
		let labels = lag_labels(8);
		assert_eq!(labels.len(), lag_crp(&scenario()).len());
		assert_eq!(labels[0], -8);
		assert_eq!(labels[8], 0);
		assert_eq!(labels[16], 8);
	}

	#[test]
	fn smooth_with_one_hot_weights_matches_discrete() {
		let matrix = scenario();
		let discrete = lag_crp(&matrix);
		let smooth = lag_crp_smooth(&matrix.weight_rows(), matrix.list_length());
		assert_close(&smooth, &discrete);
	}

	#[test]
	fn smooth_halfway_recall_spreads_transitions() {
		let sized = |item: &str, size: f64| Stimulus::new(item).with_feature("size", size);
		let pres = vec![sized("a", 0.0), sized("b", 2.0)];
		// x sits halfway (weights ½, ½); b is an exact hit
		let rec = vec![sized("x", 1.0), sized("b", 2.0)];
		let metrics = FeatureSchema::default()
			.with_distance("size", "euclidean")
			.resolve(&DistanceRegistry::default(), None, None)
			.unwrap();
		let matrix = build_recall_matrix(&pres, &rec, MatchMode::Smooth, &metrics);

		// From a (mass ½·1): +1 possible ½·½, taken ½·1·½.
		// From b (mass ½·1): −1 possible ½·½, never taken.
		// Then b (mass 1·½): −1 possible ½·½ more.
		// +1 = ¼ / ¼, −1 = 0 / ½
		assert_close(&lag_crp(&matrix), &[0.0, 0.0, f64::NAN, 1.0, 0.0]);
	}

	#[test]
	fn repeats_and_intrusions_are_skipped() {
		let pres = items(&["a", "b", "c", "d"]);
		let rec = items(&["a", "x", "b", "a", "c"]);
		let crp = lag_crp(&build_recall_matrix(&pres, &rec, MatchMode::Exact, &[]));

		// a→b counted (lag +1); b→a and a→c involve a repeat.
		// possible: from a {+1,+2,+3}, from b {+1,+2}, from c {+1}
		assert_close(
			&crp,
			&[0.0, 0.0, 0.0, 0.0, f64::NAN, 1.0 / 3.0, 0.0, 0.0, 0.0],
		);
	}

	#[test]
	fn values_are_probabilities() {
		let crp = lag_crp(&scenario());
		assert!(crp
			.iter()
			.enumerate()
			.all(|(i, v)| if i == 8 { v.is_nan() } else { (0.0..=1.0).contains(v) }));
	}

	#[test]
	fn empty_recall_is_all_zero_except_centre() {
		let pres = items(&["a", "b", "c"]);
		let crp = lag_crp(&build_recall_matrix(&pres, &[], MatchMode::Exact, &[]));
		assert_close(&crp, &[0.0, 0.0, 0.0, f64::NAN, 0.0, 0.0, 0.0]);
	}
}
