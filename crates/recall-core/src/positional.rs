//! Positional Statistics
//!
//! Accuracy, serial position curve (SPC) and probability of nth recall
//! (PNR/PFR) for one list.
//!
//! All three read the recall matrix as per-event weight rows, so discrete and
//! smooth matching share one implementation: a discrete row is one-hot and
//! the formulas collapse to plain 0/1 indicators.
//!
//! ```text
//! SPC(p)      = 1 − Π_r (1 − w_r[p])     probability p was recalled at all
//! accuracy    = mean_p SPC(p)
//! PNR(n, p)   = w_n[p]
//! ```

use tracing::warn;

use crate::recall_matrix::RecallMatrix;

/// Fraction of presented positions recalled at least once.
///
/// NaN for an empty presentation list.
#[must_use]
pub fn accuracy(matrix: &RecallMatrix) -> f64 {
	let curve = spc(matrix);
	if curve.is_empty() {
		return f64::NAN;
	}

	#[allow(clippy::cast_precision_loss)]
	let n = curve.len() as f64;
	curve.iter().sum::<f64>() / n
}

/// Per-position recall indicator (or probability under smooth matching).
///
/// Events that could not be compared at all (NaN rows) are skipped.
#[must_use]
pub fn spc(matrix: &RecallMatrix) -> Vec<f64> {
	let mut missed = vec![1.0; matrix.list_length()];

	for row in matrix.weight_rows().iter() {
		if row.iter().any(|w| w.is_nan()) {
			continue;
		}
		for (m, w) in missed.iter_mut().zip(row) {
			*m *= 1.0 - w;
		}
	}

	missed.into_iter().map(|m| 1.0 - m).collect()
}

/// Which position the `n`-th recall (zero-indexed) landed on.
///
/// A list with `n` or fewer recalls yields all NaN, so it drops out of
/// NaN-aware averages instead of counting as "never recalled first".
#[must_use]
pub fn pnr(matrix: &RecallMatrix, n: usize) -> Vec<f64> {
	match matrix.event_row(n) {
		Some(row) => row.into_owned(),
		None => {
			warn!(
				position = n,
				recalls = matrix.len(),
				"recall position beyond available recalls; list contributes NaN"
			);
			vec![f64::NAN; matrix.list_length()]
		}
	}
}

/// Probability of first recall: [`pnr`] with `n = 0`.
#[must_use]
pub fn pfr(matrix: &RecallMatrix) -> Vec<f64> {
	pnr(matrix, 0)
}
