//! NaN-aware reducers.
//!
//! Every aggregation in this crate treats NaN as "no data" rather than as a
//! poison value: lists that could not produce a number are skipped, not
//! counted as zero.

/// Mean of the finite-or-infinite (non-NaN) values, or NaN if there are none.
#[must_use]
pub fn nan_mean(values: &[f64]) -> f64 {
	let (sum, count) = values
		.iter()
		.filter(|v| !v.is_nan())
		.fold((0.0, 0_usize), |(sum, count), &v| (sum + v, count + 1));

	if count == 0 {
		f64::NAN
	} else {
		#[allow(clippy::cast_precision_loss)]
		let n = count as f64;
		sum / n
	}
}

/// Column-wise NaN-aware mean of ragged rows.
///
/// Rows shorter than the longest row are treated as NaN-padded, so a short
/// list never drags the tail of the average towards zero.
#[must_use]
pub fn nan_mean_columns(rows: &[Vec<f64>]) -> Vec<f64> {
	let width = rows.iter().map(Vec::len).max().unwrap_or(0);

	(0..width)
		.map(|col| {
			let column: Vec<f64> = rows
				.iter()
				.map(|row| row.get(col).copied().unwrap_or(f64::NAN))
				.collect();
			nan_mean(&column)
		})
		.collect()
}

/// Pad a vector with NaN up to `len`.
#[must_use]
pub fn pad_nan(mut values: Vec<f64>, len: usize) -> Vec<f64> {
	if values.len() < len {
		values.resize(len, f64::NAN);
	}
	values
}
