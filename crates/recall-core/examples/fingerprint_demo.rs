//! Walk one simulated subject through several lists and track how their
//! memory fingerprint evolves.
//!
//! Run with `cargo run --example fingerprint_demo`.

#![allow(clippy::expect_used)] // Fine in demos

use recall_core::{
	analyze, lag_labels, Analysis, AnalysisParams, Dataset, FingerprintState, Stimulus, Trial,
};

fn word(item: &str, category: &str, length: f64) -> Stimulus {
	Stimulus::new(item)
		.with_feature("category", category)
		.with_feature("length", length)
}

fn presented() -> Vec<Stimulus> {
	vec![
		word("apple", "fruit", 5.0),
		word("hammer", "tool", 6.0),
		word("pear", "fruit", 4.0),
		word("saw", "tool", 3.0),
		word("plum", "fruit", 4.0),
		word("drill", "tool", 5.0),
	]
}

fn recall(order: &[usize]) -> Vec<Stimulus> {
	let pres = presented();
	order.iter().map(|&i| pres[i].clone()).collect()
}

fn main() {
	// Early lists recall in presentation order; later ones group by category
	let lists = vec![
		Trial::new(presented(), recall(&[0, 1, 2, 3, 4])),
		Trial::new(presented(), recall(&[0, 1, 2, 3, 5])),
		Trial::new(presented(), recall(&[0, 2, 4, 1, 3, 5])),
		Trial::new(presented(), recall(&[4, 2, 0, 5, 3, 1])),
	];
	let dataset = Dataset::new(vec![lists]).expect("valid dataset");

	let params = AnalysisParams::builder()
		.permute(true)
		.n_perms(500)
		.seed(42)
		.build();

	let spc = analyze(&dataset, Analysis::Spc, &params).expect("spc");
	println!("SPC (mean over lists): {:?}", spc.mean());

	let crp = analyze(&dataset, Analysis::LagCrp, &params).expect("lag-crp");
	let lags = lag_labels(dataset.max_list_length());
	println!("\nLag-CRP:");
	for (lag, value) in lags.iter().zip(crp.mean()) {
		if !value.is_nan() {
			println!("  {lag:>3}: {value:.3}");
		}
	}

	let fingerprint =
		analyze(&dataset, Analysis::FingerprintTemporal, &params).expect("fingerprint");
	let mut state = FingerprintState::new(&fingerprint.labels);

	println!("\nFingerprint per list (permutation-corrected):");
	for (row, scores) in fingerprint.rows.iter().zip(fingerprint.feature_scores()) {
		state = state.update(&scores);
		let summary: Vec<String> = state
			.scores()
			.iter()
			.map(|(feature, score)| format!("{feature}={score:.2}"))
			.collect();
		println!("  list {}: running {}", row.list_group, summary.join(", "));
	}
}
