//! Stimuli, lists and datasets.
//!
//! A stimulus is an item identity plus an open set of named features. Lists
//! are plain ordered vectors of stimuli; a [`Trial`] pairs the list a subject
//! studied with what they reported, and a [`Dataset`] nests trials per
//! subject.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::distance::FeatureSchema;
use crate::error::{AnalysisError, Result};

// ============================================================================
// Feature Values
// ============================================================================

/// Value of one stimulus feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
	/// Categorical or free-text value
	Text(String),
	/// Numeric scalar
	Scalar(f64),
	/// Numeric vector (embedding, RGB triple, ...)
	Vector(Vec<f64>),
}

impl FeatureValue {
	/// Numeric view of the value. Scalars broadcast to 1-vectors; text has none.
	#[must_use]
	pub fn as_numeric(&self) -> Option<&[f64]> {
		match self {
			Self::Text(_) => None,
			Self::Scalar(v) => Some(std::slice::from_ref(v)),
			Self::Vector(v) => Some(v),
		}
	}

	/// Whether the value is text.
	#[must_use]
	pub const fn is_text(&self) -> bool {
		matches!(self, Self::Text(_))
	}
}

impl From<&str> for FeatureValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}

impl From<String> for FeatureValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<f64> for FeatureValue {
	fn from(value: f64) -> Self {
		Self::Scalar(value)
	}
}

impl From<Vec<f64>> for FeatureValue {
	fn from(value: Vec<f64>) -> Self {
		Self::Vector(value)
	}
}

// ============================================================================
// Stimulus
// ============================================================================

/// A presented or recalled item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
	/// Item identity, used for exact matching
	pub item: String,
	/// Named features, used for best/smooth matching and fingerprints
	#[serde(default)]
	pub features: BTreeMap<String, FeatureValue>,
}

impl Stimulus {
	/// Create a stimulus with no features.
	pub fn new(item: impl Into<String>) -> Self {
		Self {
			item: item.into(),
			features: BTreeMap::new(),
		}
	}

	/// Add a feature (builder style).
	#[must_use]
	pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
		let _ = self.features.insert(name.into(), value.into());
		self
	}

	/// Look up a feature value.
	#[must_use]
	pub fn feature(&self, name: &str) -> Option<&FeatureValue> {
		self.features.get(name)
	}
}

impl From<&str> for Stimulus {
	fn from(item: &str) -> Self {
		Self::new(item)
	}
}

/// Build a feature-less list from identities.
pub fn items<S: AsRef<str>>(identities: &[S]) -> Vec<Stimulus> {
	identities
		.iter()
		.map(|s| Stimulus::new(s.as_ref()))
		.collect()
}

// ============================================================================
// Trial & Dataset
// ============================================================================

/// One study/recall block for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
	/// Presentation order
	pub presented: Vec<Stimulus>,
	/// Recall order (may contain intrusions and repeats)
	pub recalled: Vec<Stimulus>,
}

impl Trial {
	/// Pair a presentation list with a recall list.
	#[must_use]
	pub const fn new(presented: Vec<Stimulus>, recalled: Vec<Stimulus>) -> Self {
		Self {
			presented,
			recalled,
		}
	}

	/// Convenience constructor from bare identities.
	pub fn from_items<P: AsRef<str>, R: AsRef<str>>(presented: &[P], recalled: &[R]) -> Self {
		Self::new(items(presented), items(recalled))
	}
}

/// Validated collection of trials indexed by (subject, list).
///
/// The feature schema is inferred once, here, and carried alongside the
/// data so every analysis sees the same feature → distance mapping.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
	subjects: Vec<Vec<Trial>>,
	schema: FeatureSchema,
}

impl Dataset {
	/// Validate trials and infer the feature schema.
	///
	/// # Errors
	///
	/// Returns [`AnalysisError::InvalidStimulus`] if any stimulus has an empty
	/// identity.
	pub fn new(subjects: Vec<Vec<Trial>>) -> Result<Self> {
		for (s, lists) in subjects.iter().enumerate() {
			for (l, trial) in lists.iter().enumerate() {
				validate_list(&trial.presented, s, l)?;
				validate_list(&trial.recalled, s, l)?;
			}
		}

		let schema = subjects
			.iter()
			.flatten()
			.find_map(|trial| trial.presented.first())
			.map(FeatureSchema::infer)
			.unwrap_or_default();

		Ok(Self { subjects, schema })
	}

	/// Build from separate presentation and recall collections
	/// (subject → list → stimuli).
	///
	/// # Errors
	///
	/// Returns [`AnalysisError::ShapeMismatch`] if the two collections do not
	/// have the same subjects and list counts, plus anything [`Dataset::new`]
	/// rejects.
	pub fn from_lists(
		presented: Vec<Vec<Vec<Stimulus>>>,
		recalled: Vec<Vec<Vec<Stimulus>>>,
	) -> Result<Self> {
		if presented.len() != recalled.len() {
			return Err(AnalysisError::ShapeMismatch(format!(
				"{} presented subjects vs {} recalled subjects",
				presented.len(),
				recalled.len()
			)));
		}

		let mut subjects = Vec::with_capacity(presented.len());
		for (s, (pres, rec)) in presented.into_iter().zip(recalled).enumerate() {
			if pres.len() != rec.len() {
				return Err(AnalysisError::ShapeMismatch(format!(
					"subject {s}: {} presented lists vs {} recalled lists",
					pres.len(),
					rec.len()
				)));
			}
			subjects.push(pres.into_iter().zip(rec).map(|(p, r)| Trial::new(p, r)).collect());
		}

		Self::new(subjects)
	}

	/// Replace the inferred schema (e.g. to assign custom distances).
	#[must_use]
	pub fn with_schema(mut self, schema: FeatureSchema) -> Self {
		self.schema = schema;
		self
	}

	/// Feature → distance mapping used by this dataset.
	#[must_use]
	pub const fn schema(&self) -> &FeatureSchema {
		&self.schema
	}

	/// Trials grouped by subject.
	#[must_use]
	pub fn subjects(&self) -> &[Vec<Trial>] {
		&self.subjects
	}

	/// Number of subjects.
	#[must_use]
	pub fn n_subjects(&self) -> usize {
		self.subjects.len()
	}

	/// Largest number of lists any subject has.
	#[must_use]
	pub fn n_lists(&self) -> usize {
		self.subjects.iter().map(Vec::len).max().unwrap_or(0)
	}

	/// Longest presentation list in the dataset.
	#[must_use]
	pub fn max_list_length(&self) -> usize {
		self.trials()
			.map(|(_, _, trial)| trial.presented.len())
			.max()
			.unwrap_or(0)
	}

	/// Iterate `(subject, list, trial)` in subject-major order.
	pub fn trials(&self) -> impl Iterator<Item = (usize, usize, &Trial)> + '_ {
		self.subjects.iter().enumerate().flat_map(|(s, lists)| {
			lists
				.iter()
				.enumerate()
				.map(move |(l, trial)| (s, l, trial))
		})
	}
}

fn validate_list(list: &[Stimulus], subject: usize, list_index: usize) -> Result<()> {
	match list.iter().position(|stim| stim.item.trim().is_empty()) {
		Some(index) => Err(AnalysisError::InvalidStimulus {
			subject,
			list: list_index,
			index,
			reason: "missing item identity".to_owned(),
		}),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scalar_broadcasts_to_one_vector() {
		let v = FeatureValue::Scalar(2.5);
		assert_eq!(v.as_numeric(), Some(&[2.5][..]));
		assert_eq!(FeatureValue::from("red").as_numeric(), None);
	}

	#[test]
	fn rejects_missing_identity() {
		let trial = Trial::from_items(&["cat", "bat"], &["cat", " "]);
		let err = Dataset::new(vec![vec![trial]]).unwrap_err();

		assert_eq!(
			err,
			AnalysisError::InvalidStimulus {
				subject: 0,
				list: 0,
				index: 1,
				reason: "missing item identity".into(),
			}
		);
	}

	#[test]
	fn from_lists_checks_shape() {
		let pres = vec![vec![items(&["a", "b"])], vec![items(&["c"])]];
		let rec = vec![vec![items(&["a"])]];
		assert!(matches!(
			Dataset::from_lists(pres, rec),
			Err(AnalysisError::ShapeMismatch(_))
		));
	}

	#[test]
	fn counts_and_iteration_order() {
		let ds = Dataset::new(vec![
			vec![
				Trial::from_items(&["a", "b", "c"], &["a"]),
				Trial::from_items(&["d", "e"], &["e"]),
			],
			vec![Trial::from_items(&["f", "g", "h", "i"], &["i", "f"])],
		])
		.unwrap();

		assert_eq!(ds.n_subjects(), 2);
		assert_eq!(ds.n_lists(), 2);
		assert_eq!(ds.max_list_length(), 4);

		let keys: Vec<(usize, usize)> = ds.trials().map(|(s, l, _)| (s, l)).collect();
		assert_eq!(keys, vec![(0, 0), (0, 1), (1, 0)]);
	}

	#[test]
	fn schema_is_inferred_from_first_stimulus() {
		let pres = vec![
			Stimulus::new("cat")
				.with_feature("category", "animal")
				.with_feature("size", 3.0),
			Stimulus::new("hat")
				.with_feature("category", "clothing")
				.with_feature("size", 1.0),
		];
		let ds = Dataset::new(vec![vec![Trial::new(pres, items(&["hat"]))]]).unwrap();

		assert_eq!(ds.schema().distance_name("category"), Some("match"));
		assert_eq!(ds.schema().distance_name("size"), Some("euclidean"));
	}

	#[test]
	fn stimulus_deserializes_from_plain_json() {
		let json = r#"{"item":"cat","features":{"category":"animal","size":3.0,"rgb":[0.1,0.2,0.3]}}"#;
		let stim: Stimulus = serde_json::from_str(json).unwrap();

		assert_eq!(stim.item, "cat");
		assert_eq!(stim.feature("category"), Some(&FeatureValue::Text("animal".into())));
		assert_eq!(stim.feature("size"), Some(&FeatureValue::Scalar(3.0)));
		assert_eq!(
			stim.feature("rgb"),
			Some(&FeatureValue::Vector(vec![0.1, 0.2, 0.3]))
		);
	}
}
