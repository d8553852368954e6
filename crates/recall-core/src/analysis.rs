//! Analysis Pipeline
//!
//! Runs one [`Analysis`] over every (subject, list) of a [`Dataset`] and
//! averages the per-list results within (subject group, list group):
//!
//! 1. Validate parameters and resolve distances/features (fatal on error)
//! 2. Build each list's recall matrix
//! 3. Compute the per-list statistic (in parallel when enabled)
//! 4. NaN-aware average within each group
//!
//! Lists never share state, so parallel and serial runs give identical
//! results in identical order.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::distance::{DistanceRegistry, FeatureMetric};
use crate::error::{AnalysisError, Result};
use crate::fingerprint::{list_fingerprint, ClusterFeature, ClusteringConfig, DistanceMatrix, FeatureScores};
use crate::lagcrp::{lag_crp, lag_labels};
use crate::params::{Analysis, AnalysisParams, MatchMode};
use crate::positional::{accuracy, pnr, spc};
use crate::recall_matrix::{build_recall_matrix, RecallMatrix};
use crate::stats::{nan_mean_columns, pad_nan};
use crate::stimulus::{Dataset, Trial};

// ============================================================================
// Results
// ============================================================================

/// Averaged result for one (subject group, list group).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
	/// Subject group label
	pub subject_group: String,
	/// List group label
	pub list_group: String,
	/// Lists averaged into this row
	pub n_lists: usize,
	/// NaN-aware mean of the per-list values, aligned with the result labels
	pub values: Vec<f64>,
}

/// What a renderer needs to lay out a result without recomputing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
	/// Longest presentation list
	pub list_length: usize,
	/// Largest number of lists per subject
	pub n_lists: usize,
	/// Number of subjects
	pub n_subjects: usize,
	/// Recall rank queried (PFR/PNR only)
	pub position: Option<usize>,
	/// Matching strategy used
	pub match_mode: MatchMode,
	/// Whether scores are permutation-corrected
	pub permuted: bool,
}

/// Tagged output of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
	/// Analysis that produced the result
	pub analysis: Analysis,
	/// Column labels: positions, lags, feature names or `accuracy`
	pub labels: Vec<String>,
	/// One row per group, in first-seen order
	pub rows: Vec<GroupRow>,
	/// Layout metadata
	pub metadata: ResultMetadata,
}

impl AnalysisResult {
	/// NaN-aware mean across every group row.
	#[must_use]
	pub fn mean(&self) -> Vec<f64> {
		let rows: Vec<Vec<f64>> = self.rows.iter().map(|r| r.values.clone()).collect();
		pad_nan(nan_mean_columns(&rows), self.labels.len())
	}

	/// Row for a (subject group, list group) pair.
	#[must_use]
	pub fn row(&self, subject_group: &str, list_group: &str) -> Option<&GroupRow> {
		self.rows
			.iter()
			.find(|r| r.subject_group == subject_group && r.list_group == list_group)
	}

	/// Rows as named feature scores (fingerprint analyses only).
	#[must_use]
	pub fn feature_scores(&self) -> Vec<FeatureScores> {
		if !matches!(
			self.analysis,
			Analysis::Fingerprint | Analysis::Temporal | Analysis::FingerprintTemporal
		) {
			return Vec::new();
		}

		self.rows
			.iter()
			.filter_map(|row| FeatureScores::new(self.labels.clone(), row.values.clone()).ok())
			.collect()
	}
}

// ============================================================================
// Analyzer
// ============================================================================

/// Runs analyses against a distance registry.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
	registry: DistanceRegistry,
}

/// What each list needs besides its trial.
enum ListTask {
	Accuracy,
	Spc,
	Pnr(usize),
	LagCrp,
	Fingerprint(Vec<ClusterFeature>, ClusteringConfig),
}

impl Analyzer {
	/// Analyzer using a custom registry.
	#[must_use]
	pub const fn new(registry: DistanceRegistry) -> Self {
		Self { registry }
	}

	/// Registry used to resolve distance names.
	#[must_use]
	pub const fn registry(&self) -> &DistanceRegistry {
		&self.registry
	}

	/// Run one analysis over the whole dataset.
	///
	/// # Errors
	///
	/// Configuration errors only: unknown distance or feature names,
	/// unsupported match modes, bad parameters or grouping labels. Per-list
	/// data problems become NaN (or neutral) values instead.
	#[instrument(skip_all, fields(analysis = %analysis, mode = %params.match_mode, subjects = dataset.n_subjects()))]
	pub fn analyze(
		&self,
		dataset: &Dataset,
		analysis: Analysis,
		params: &AnalysisParams,
	) -> Result<AnalysisResult> {
		params.validate()?;
		let (subject_labels, list_labels) = group_labels(dataset, params)?;
		let metrics = self.matching_metrics(dataset, params)?;
		let task = self.list_task(dataset, analysis, params)?;

		let units: Vec<(usize, usize, &Trial)> = dataset.trials().collect();
		let run = |&(s, l, trial): &(usize, usize, &Trial)| -> Result<Vec<f64>> {
			let matrix = build_recall_matrix(&trial.presented, &trial.recalled, params.match_mode, &metrics);
			let values = run_list(&task, trial, &matrix)?;
			debug!(subject = s, list = l, recalls = matrix.len(), "analyzed list");
			Ok(values)
		};

		let per_list: Vec<Vec<f64>> = if params.parallel {
			units.par_iter().map(run).collect::<Result<_>>()?
		} else {
			units.iter().map(run).collect::<Result<_>>()?
		};

		let list_length = dataset.max_list_length();
		let labels = column_labels(analysis, &task, list_length);

		let mut order: Vec<(String, String)> = Vec::new();
		let mut groups: HashMap<(String, String), Vec<Vec<f64>>> = HashMap::new();
		for (&(s, l, trial), values) in units.iter().zip(per_list) {
			let key = (subject_labels[s].clone(), list_labels[l].clone());
			let aligned = align(&task, values, trial.presented.len(), list_length);
			groups
				.entry(key.clone())
				.or_insert_with(|| {
					order.push(key);
					Vec::new()
				})
				.push(aligned);
		}

		let rows = order
			.into_iter()
			.filter_map(|key| {
				let lists = groups.remove(&key)?;
				Some(GroupRow {
					n_lists: lists.len(),
					values: pad_nan(nan_mean_columns(&lists), labels.len()),
					subject_group: key.0,
					list_group: key.1,
				})
			})
			.collect();

		Ok(AnalysisResult {
			analysis,
			labels,
			rows,
			metadata: ResultMetadata {
				list_length,
				n_lists: dataset.n_lists(),
				n_subjects: dataset.n_subjects(),
				position: analysis.query_position(),
				match_mode: params.match_mode,
				permuted: params.permute && matches!(task, ListTask::Fingerprint(..)),
			},
		})
	}

	/// Recall matrix of every list, grouped by subject.
	///
	/// # Errors
	///
	/// Same configuration errors as [`Analyzer::analyze`] for matching.
	pub fn recall_matrices(
		&self,
		dataset: &Dataset,
		params: &AnalysisParams,
	) -> Result<Vec<Vec<RecallMatrix>>> {
		let metrics = self.matching_metrics(dataset, params)?;
		Ok(dataset
			.subjects()
			.iter()
			.map(|lists| {
				lists
					.iter()
					.map(|t| build_recall_matrix(&t.presented, &t.recalled, params.match_mode, &metrics))
					.collect()
			})
			.collect())
	}

	/// Features compared when matching. Empty under exact matching.
	fn matching_metrics(&self, dataset: &Dataset, params: &AnalysisParams) -> Result<Vec<FeatureMetric>> {
		if let Some(name) = &params.distance {
			let _ = self.registry.resolve(name)?;
		}
		if params.match_mode == MatchMode::Exact {
			return Ok(Vec::new());
		}

		let metrics = dataset.schema().resolve(
			&self.registry,
			params.features.as_deref(),
			params.distance.as_deref(),
		)?;
		if metrics.is_empty() {
			return Err(AnalysisError::InvalidParameter {
				name: "features",
				reason: format!("{} matching needs at least one stimulus feature", params.match_mode),
			});
		}
		Ok(metrics)
	}

	fn list_task(&self, dataset: &Dataset, analysis: Analysis, params: &AnalysisParams) -> Result<ListTask> {
		let task = match analysis {
			Analysis::Accuracy => ListTask::Accuracy,
			Analysis::Spc => ListTask::Spc,
			Analysis::Pfr => ListTask::Pnr(0),
			Analysis::Pnr { position } => ListTask::Pnr(position),
			Analysis::LagCrp => ListTask::LagCrp,
			Analysis::Fingerprint | Analysis::Temporal | Analysis::FingerprintTemporal => {
				if params.match_mode == MatchMode::Smooth {
					return Err(AnalysisError::UnsupportedMatchMode {
						analysis: analysis.name(),
						mode: params.match_mode.as_str(),
					});
				}

				let mut features: Vec<ClusterFeature> = Vec::new();
				if analysis != Analysis::Temporal {
					let metrics = dataset
						.schema()
						.resolve(&self.registry, params.features.as_deref(), None)?;
					if metrics.is_empty() && analysis == Analysis::Fingerprint {
						return Err(AnalysisError::InvalidParameter {
							name: "features",
							reason: "fingerprint needs at least one stimulus feature".to_owned(),
						});
					}
					features.extend(metrics.into_iter().map(ClusterFeature::Stimulus));
				}
				if analysis != Analysis::Fingerprint {
					features.push(ClusterFeature::Temporal);
				}

				ListTask::Fingerprint(features, ClusteringConfig::from(params))
			}
		};
		Ok(task)
	}
}

/// Run one analysis with the built-in distances.
///
/// # Errors
///
/// See [`Analyzer::analyze`].
pub fn analyze(dataset: &Dataset, analysis: Analysis, params: &AnalysisParams) -> Result<AnalysisResult> {
	Analyzer::default().analyze(dataset, analysis, params)
}

impl Dataset {
	/// Recall matrix of every list using the built-in distances.
	///
	/// # Errors
	///
	/// See [`Analyzer::recall_matrices`].
	pub fn recall_matrices(&self, params: &AnalysisParams) -> Result<Vec<Vec<RecallMatrix>>> {
		Analyzer::default().recall_matrices(self, params)
	}
}

// ============================================================================
// Helpers
// ============================================================================

fn run_list(task: &ListTask, trial: &Trial, matrix: &RecallMatrix) -> Result<Vec<f64>> {
	let values = match task {
		ListTask::Accuracy => vec![accuracy(matrix)],
		ListTask::Spc => spc(matrix),
		ListTask::Pnr(n) => pnr(matrix, *n),
		ListTask::LagCrp => lag_crp(matrix),
		ListTask::Fingerprint(features, config) => {
			let distances: Vec<DistanceMatrix> = features
				.iter()
				.map(|f| DistanceMatrix::new(&trial.presented, f))
				.collect();
			list_fingerprint(matrix, &distances, config)?
		}
	};
	Ok(values)
}

/// Line a list's values up with the dataset-wide columns.
///
/// Lag vectors are centred on lag 0, so shorter lists pad on both sides.
fn align(task: &ListTask, values: Vec<f64>, own_length: usize, list_length: usize) -> Vec<f64> {
	match task {
		ListTask::LagCrp if own_length < list_length => {
			let pad = list_length - own_length;
			let mut centred = vec![f64::NAN; pad];
			centred.extend(values);
			centred.resize(2 * list_length + 1, f64::NAN);
			centred
		}
		_ => values,
	}
}

fn column_labels(analysis: Analysis, task: &ListTask, list_length: usize) -> Vec<String> {
	match task {
		ListTask::Accuracy => vec![analysis.name().to_owned()],
		ListTask::Spc | ListTask::Pnr(_) => (1..=list_length).map(|p| p.to_string()).collect(),
		ListTask::LagCrp => lag_labels(list_length).iter().map(ToString::to_string).collect(),
		ListTask::Fingerprint(features, _) => features.iter().map(|f| f.name().to_owned()).collect(),
	}
}

fn group_labels(dataset: &Dataset, params: &AnalysisParams) -> Result<(Vec<String>, Vec<String>)> {
	let subjects = match &params.subject_groups {
		Some(labels) if labels.len() != dataset.n_subjects() => {
			return Err(AnalysisError::InvalidParameter {
				name: "subject_groups",
				reason: format!("{} labels for {} subjects", labels.len(), dataset.n_subjects()),
			});
		}
		Some(labels) => labels.clone(),
		None => (0..dataset.n_subjects()).map(|s| s.to_string()).collect(),
	};

	let lists = match &params.list_groups {
		Some(labels) if labels.len() < dataset.n_lists() => {
			return Err(AnalysisError::InvalidParameter {
				name: "list_groups",
				reason: format!("{} labels for up to {} lists", labels.len(), dataset.n_lists()),
			});
		}
		Some(labels) => labels.clone(),
		None => (0..dataset.n_lists()).map(|l| l.to_string()).collect(),
	};

	Ok((subjects, lists))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::distance::FeatureSchema;
	use crate::fingerprint::{FingerprintState, TEMPORAL};
	use crate::stimulus::Stimulus;

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

	fn serial() -> AnalysisParams {
		AnalysisParams::builder().parallel(false).build()
	}

	fn two_subjects() -> Dataset {
		Dataset::new(vec![
			vec![
				Trial::from_items(&["cat", "bat", "hat", "goat"], &["bat", "cat", "goat", "hat"]),
				Trial::from_items(&["zoo", "moo", "boo", "goo"], &["zoo", "dog"]),
			],
			vec![
				Trial::from_items(&["a", "b", "c", "d"], &["d", "c"]),
				Trial::from_items(&["e", "f", "g", "h"], &[] as &[&str]),
			],
		])
		.unwrap()
	}

	fn featured() -> Dataset {
		let stim = |item: &str, category: &str, size: f64| {
			Stimulus::new(item)
				.with_feature("category", category)
				.with_feature("size", size)
		};
		let pres = vec![
			stim("cat", "animal", 3.0),
			stim("hat", "clothing", 1.0),
			stim("dog", "animal", 4.0),
			stim("sock", "clothing", 0.5),
		];
		let rec = vec![
			stim("dog", "animal", 4.0),
			stim("cat", "animal", 3.0),
			stim("sock", "clothing", 0.5),
			stim("hat", "clothing", 1.0),
		];
		Dataset::new(vec![vec![Trial::new(pres, rec)]]).unwrap()
	}

	#[test]
	fn accuracy_per_subject_and_list() {
		let result = analyze(&two_subjects(), Analysis::Accuracy, &serial()).unwrap();

		assert_eq!(result.labels, vec!["accuracy"]);
		assert_eq!(result.rows.len(), 4);
		assert_close(&result.row("0", "0").unwrap().values, &[1.0]);
		assert_close(&result.row("0", "1").unwrap().values, &[0.25]);
		assert_close(&result.row("1", "0").unwrap().values, &[0.5]);
		assert_close(&result.row("1", "1").unwrap().values, &[0.0]);
		assert_close(&result.mean(), &[0.4375]);
	}

	#[test]
	fn list_groups_average_lists() {
		let params = AnalysisParams::builder()
			.parallel(false)
			.list_groups(vec!["all".to_owned(), "all".to_owned()])
			.subject_groups(vec!["g".to_owned(), "g".to_owned()])
			.build();
		let result = analyze(&two_subjects(), Analysis::Spc, &params).unwrap();

		assert_eq!(result.rows.len(), 1);
		let row = result.row("g", "all").unwrap();
		assert_eq!(row.n_lists, 4);
		// position 1: cat, zoo recalled; position 4: goat, d recalled
		assert_close(&row.values, &[0.5, 0.25, 0.5, 0.5]);
	}

	#[test]
	fn bad_group_labels_are_configuration_errors() {
		let params = AnalysisParams::builder()
			.subject_groups(vec!["only-one".to_owned()])
			.build();
		let err = analyze(&two_subjects(), Analysis::Accuracy, &params).unwrap_err();
		assert!(err.is_configuration());
	}

	#[test]
	fn pfr_records_query_position() {
		let result = analyze(&two_subjects(), Analysis::Pfr, &serial()).unwrap();
		assert_eq!(result.metadata.position, Some(0));
		assert_close(&result.row("0", "0").unwrap().values, &[0.0, 1.0, 0.0, 0.0]);
		// No recalls: NaN everywhere rather than zeros
		assert!(result.row("1", "1").unwrap().values.iter().all(|v| v.is_nan()));
	}

	#[test]
	fn lagcrp_centres_lists_of_different_length() {
		let ds = Dataset::new(vec![vec![
			Trial::from_items(&["a", "b", "c"], &["a", "b", "c"]),
			Trial::from_items(&["d", "e"], &["d", "e"]),
		]])
		.unwrap();
		let params = AnalysisParams::builder()
			.parallel(false)
			.list_groups(vec!["x".to_owned(), "x".to_owned()])
			.build();
		let result = analyze(&ds, Analysis::LagCrp, &params).unwrap();

		assert_eq!(result.labels, vec!["-3", "-2", "-1", "0", "1", "2", "3"]);
		// Both lists only ever step +1, and it was always available
		assert_close(
			&result.rows[0].values,
			&[0.0, 0.0, 0.0, f64::NAN, 1.0, 0.0, 0.0],
		);
	}

	#[test]
	fn parallel_matches_serial() {
		let ds = two_subjects();
		for analysis in [Analysis::Accuracy, Analysis::Spc, Analysis::LagCrp, Analysis::Temporal] {
			let par = analyze(&ds, analysis, &AnalysisParams::default()).unwrap();
			let ser = analyze(&ds, analysis, &serial()).unwrap();
			assert_eq!(par.labels, ser.labels);
			for (a, b) in par.rows.iter().zip(&ser.rows) {
				assert_close(&a.values, &b.values);
			}
		}
	}

	#[test]
	fn fingerprint_columns_follow_schema_then_temporal() {
		let result = analyze(&featured(), Analysis::FingerprintTemporal, &serial()).unwrap();
		assert_eq!(result.labels, vec!["category", "size", TEMPORAL]);

		// dog→cat stays within category, sock→hat too
		let category = result.rows[0].values[0];
		assert!(category > 0.8, "category clustering {category}");
	}

	#[test]
	fn best_matching_fingerprint_recovers_misspelled_recalls() {
		let stim = |item: &str, category: &str, size: f64| {
			Stimulus::new(item)
				.with_feature("category", category)
				.with_feature("size", size)
		};
		let pres = vec![
			stim("cat", "animal", 3.0),
			stim("hat", "clothing", 1.0),
			stim("dog", "animal", 4.0),
			stim("sock", "clothing", 0.5),
		];
		// Same order as the exact-spelling recall in `featured`
		let rec = vec![
			stim("dgo", "animal", 4.0),
			stim("kat", "animal", 3.0),
			stim("sokc", "clothing", 0.5),
			stim("hta", "clothing", 1.0),
		];
		let misspelled = Dataset::new(vec![vec![Trial::new(pres, rec)]]).unwrap();

		let best = analyze(
			&misspelled,
			Analysis::FingerprintTemporal,
			&AnalysisParams::builder()
				.match_mode(MatchMode::Best)
				.parallel(false)
				.build(),
		)
		.unwrap();
		let exact = analyze(&featured(), Analysis::FingerprintTemporal, &serial()).unwrap();

		assert_eq!(best.labels, exact.labels);
		assert_eq!(best.metadata.match_mode, MatchMode::Best);
		assert_close(&best.rows[0].values, &exact.rows[0].values);
		assert!(best.rows[0].values.iter().all(|v| !v.is_nan()));
	}

	#[test]
	fn smooth_lagcrp_through_the_pipeline() {
		let sized = |item: &str, size: f64| Stimulus::new(item).with_feature("size", size);
		let ds = Dataset::new(vec![vec![Trial::new(
			vec![sized("a", 0.0), sized("b", 2.0)],
			vec![sized("x", 1.0), sized("b", 2.0)],
		)]])
		.unwrap();
		let params = AnalysisParams::builder()
			.match_mode(MatchMode::Smooth)
			.parallel(false)
			.build();

		let result = analyze(&ds, Analysis::LagCrp, &params).unwrap();
		assert_eq!(result.labels, vec!["-2", "-1", "0", "1", "2"]);
		assert_close(&result.rows[0].values, &[0.0, 0.0, f64::NAN, 1.0, 0.0]);
	}

	#[test]
	fn fingerprint_rejects_smooth_matching() {
		let params = AnalysisParams::builder().match_mode(MatchMode::Smooth).build();
		let err = analyze(&featured(), Analysis::Fingerprint, &params).unwrap_err();
		assert!(matches!(err, AnalysisError::UnsupportedMatchMode { .. }));
	}

	#[test]
	fn unknown_distance_fails_fast() {
		let params = AnalysisParams::builder().distance("cosine").build();
		let err = analyze(&featured(), Analysis::Accuracy, &params).unwrap_err();
		assert_eq!(err, AnalysisError::UnknownDistance("cosine".into()));
	}

	#[test]
	fn unknown_feature_fails_fast() {
		let params = AnalysisParams::builder()
			.features(vec!["color".to_owned()])
			.build();
		let err = analyze(&featured(), Analysis::Fingerprint, &params).unwrap_err();
		assert_eq!(err, AnalysisError::UnknownFeature("color".into()));
	}

	#[test]
	fn best_matching_without_features_is_rejected() {
		let params = AnalysisParams::builder().match_mode(MatchMode::Best).build();
		let err = analyze(&two_subjects(), Analysis::Spc, &params).unwrap_err();
		assert!(matches!(err, AnalysisError::InvalidParameter { name: "features", .. }));
	}

	#[test]
	fn best_matching_tolerates_misspelled_recalls() {
		let pres = vec![
			Stimulus::new("cat").with_feature("size", 3.0),
			Stimulus::new("hat").with_feature("size", 1.0),
		];
		let rec = vec![Stimulus::new("kat").with_feature("size", 2.9)];
		let ds = Dataset::new(vec![vec![Trial::new(pres, rec)]]).unwrap();

		let exact = analyze(&ds, Analysis::Spc, &serial()).unwrap();
		let best = analyze(
			&ds,
			Analysis::Spc,
			&AnalysisParams::builder()
				.match_mode(MatchMode::Best)
				.parallel(false)
				.build(),
		)
		.unwrap();

		assert_close(&exact.rows[0].values, &[0.0, 0.0]);
		assert_close(&best.rows[0].values, &[1.0, 0.0]);
	}

	#[test]
	fn custom_distance_through_registry() {
		let mut registry = DistanceRegistry::default();
		registry.register("size_bucket", |a, b| {
			let bucket = |v: &crate::stimulus::FeatureValue| {
				v.as_numeric().map_or(f64::NAN, |x| (x[0] / 2.0).floor())
			};
			(bucket(a) - bucket(b)).abs()
		});
		let ds = featured();
		let schema = FeatureSchema::default().with_distance("size", "size_bucket");
		let ds = ds.with_schema(schema);

		let result = Analyzer::new(registry)
			.analyze(&ds, Analysis::Fingerprint, &serial())
			.unwrap();
		assert_eq!(result.labels, vec!["size"]);
		assert!(!result.rows[0].values[0].is_nan());
	}

	#[test]
	fn feature_scores_feed_running_state() {
		let result = analyze(&featured(), Analysis::FingerprintTemporal, &serial()).unwrap();
		let observations = result.feature_scores();
		assert_eq!(observations.len(), 1);

		let state = FingerprintState::new(&result.labels).update(&observations[0]);
		assert_eq!(state.n_lists(), 1);
		assert_eq!(state.get("category"), observations[0].get("category"));

		let accuracy = analyze(&featured(), Analysis::Accuracy, &serial()).unwrap();
		assert!(accuracy.feature_scores().is_empty());
	}

	#[test]
	fn permuted_fingerprint_is_a_fraction() {
		let params = AnalysisParams::builder()
			.permute(true)
			.n_perms(100)
			.seed(3)
			.build();
		let result = analyze(&featured(), Analysis::FingerprintTemporal, &params).unwrap();

		assert!(result.metadata.permuted);
		for v in &result.rows[0].values {
			assert!((0.0..=1.0).contains(v), "corrected score {v}");
		}
	}

	#[test]
	fn recall_matrices_by_subject() {
		let matrices = two_subjects().recall_matrices(&serial()).unwrap();
		assert_eq!(matrices.len(), 2);
		assert_eq!(matrices[0][1].len(), 2);
		assert!(matrices[0][1].positions()[1].is_nan());
		assert!(matrices[1][1].is_empty());
	}

	#[test]
	fn results_serialize_to_plain_json() {
		let result = analyze(&two_subjects(), Analysis::Pnr { position: 1 }, &serial()).unwrap();
		let json = serde_json::to_value(&result).unwrap();

		assert_eq!(json["analysis"]["kind"], "pnr");
		assert_eq!(json["analysis"]["position"], 1);
		assert_eq!(json["metadata"]["n_subjects"], 2);
		assert_eq!(json["metadata"]["list_length"], 4);
	}
}
