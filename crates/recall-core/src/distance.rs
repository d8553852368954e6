//! Distance Functions
//!
//! Named pairwise distances between feature values, and the schema that says
//! which distance each feature uses.
//!
//! Built-ins:
//! - `match`: `0` if equal, `1` otherwise (categorical features)
//! - `euclidean`: `‖a − b‖₂`, scalars broadcast to 1-vectors
//! - `correlation`: `1 − r(a, b)` (Pearson), for vector features
//!
//! Values a function cannot compare (text under `euclidean`, vectors of
//! different lengths, constant vectors under `correlation`) give NaN, which
//! every downstream consumer treats as "no information".

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::stimulus::{FeatureValue, Stimulus};

/// Name of the categorical mismatch distance.
pub const MATCH: &str = "match";
/// Name of the Euclidean distance.
pub const EUCLIDEAN: &str = "euclidean";
/// Name of the correlation distance.
pub const CORRELATION: &str = "correlation";

type DistanceImpl = dyn Fn(&FeatureValue, &FeatureValue) -> f64 + Send + Sync;

/// A named, pure distance between two feature values.
#[derive(Clone)]
pub struct DistanceFn {
	name: String,
	func: Arc<DistanceImpl>,
}

impl DistanceFn {
	/// Wrap a closure under a name.
	pub fn new<F>(name: impl Into<String>, func: F) -> Self
	where
		F: Fn(&FeatureValue, &FeatureValue) -> f64 + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			func: Arc::new(func),
		}
	}

	/// Registered name.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Evaluate the distance.
	#[inline]
	#[must_use]
	pub fn distance(&self, a: &FeatureValue, b: &FeatureValue) -> f64 {
		(self.func)(a, b)
	}
}

impl fmt::Debug for DistanceFn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("DistanceFn").field(&self.name).finish()
	}
}

// ============================================================================
// Built-in Distances
// ============================================================================

/// `0` if the values are equal, `1` otherwise.
#[inline]
#[must_use]
pub fn match_distance(a: &FeatureValue, b: &FeatureValue) -> f64 {
	if a == b {
		0.0
	} else {
		1.0
	}
}

/// Euclidean distance between numeric values.
#[must_use]
pub fn euclidean_distance(a: &FeatureValue, b: &FeatureValue) -> f64 {
	match (a.as_numeric(), b.as_numeric()) {
		(Some(x), Some(y)) if x.len() == y.len() => x
			.iter()
			.zip(y)
			.fold(0.0, |acc: f64, (&xi, &yi)| (xi - yi).mul_add(xi - yi, acc))
			.sqrt(),
		_ => f64::NAN,
	}
}

/// One minus the Pearson correlation of two numeric vectors.
#[must_use]
pub fn correlation_distance(a: &FeatureValue, b: &FeatureValue) -> f64 {
	let (Some(x), Some(y)) = (a.as_numeric(), b.as_numeric()) else {
		return f64::NAN;
	};
	if x.len() != y.len() || x.len() < 2 {
		return f64::NAN;
	}

	#[allow(clippy::cast_precision_loss)]
	let n = x.len() as f64;
	let mean_x = x.iter().sum::<f64>() / n;
	let mean_y = y.iter().sum::<f64>() / n;

	let (cov, var_x, var_y) = x
		.iter()
		.zip(y)
		.fold((0.0, 0.0, 0.0), |(cov, vx, vy): (f64, f64, f64), (&xi, &yi)| {
			let dx = xi - mean_x;
			let dy = yi - mean_y;
			(dx.mul_add(dy, cov), dx.mul_add(dx, vx), dy.mul_add(dy, vy))
		});

	let magnitude = (var_x * var_y).sqrt();
	if magnitude == 0.0 {
		f64::NAN
	} else {
		1.0 - cov / magnitude
	}
}

// ============================================================================
// Registry
// ============================================================================

/// Lookup table from distance name to function.
///
/// `Default` holds the three built-ins; callers add their own with
/// [`DistanceRegistry::register`].
#[derive(Debug, Clone)]
pub struct DistanceRegistry {
	functions: HashMap<String, DistanceFn>,
}

impl Default for DistanceRegistry {
	fn default() -> Self {
		let mut registry = Self {
			functions: HashMap::new(),
		};
		registry.register(MATCH, match_distance);
		registry.register(EUCLIDEAN, euclidean_distance);
		registry.register(CORRELATION, correlation_distance);
		registry
	}
}

impl DistanceRegistry {
	/// Register (or replace) a named distance.
	pub fn register<F>(&mut self, name: &str, func: F)
	where
		F: Fn(&FeatureValue, &FeatureValue) -> f64 + Send + Sync + 'static,
	{
		let _ = self
			.functions
			.insert(name.to_owned(), DistanceFn::new(name, func));
	}

	/// Look a distance up by name.
	///
	/// # Errors
	///
	/// Returns [`AnalysisError::UnknownDistance`] if nothing is registered
	/// under `name`.
	pub fn resolve(&self, name: &str) -> Result<DistanceFn> {
		self.functions
			.get(name)
			.cloned()
			.ok_or_else(|| AnalysisError::UnknownDistance(name.to_owned()))
	}
}

// ============================================================================
// Feature Schema
// ============================================================================

/// Feature name → distance name, inferred once per dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
	distances: BTreeMap<String, String>,
}

impl FeatureSchema {
	/// Infer default distances from one stimulus: text → `match`,
	/// numeric → `euclidean`.
	#[must_use]
	pub fn infer(stimulus: &Stimulus) -> Self {
		let distances = stimulus
			.features
			.iter()
			.map(|(name, value)| {
				let distance = if value.is_text() { MATCH } else { EUCLIDEAN };
				(name.clone(), distance.to_owned())
			})
			.collect();
		Self { distances }
	}

	/// Assign a distance to a feature, adding the feature if needed.
	#[must_use]
	pub fn with_distance(mut self, feature: impl Into<String>, distance: impl Into<String>) -> Self {
		let _ = self.distances.insert(feature.into(), distance.into());
		self
	}

	/// Distance name assigned to a feature.
	#[must_use]
	pub fn distance_name(&self, feature: &str) -> Option<&str> {
		self.distances.get(feature).map(String::as_str)
	}

	/// All feature names, sorted.
	pub fn feature_names(&self) -> impl Iterator<Item = &str> + '_ {
		self.distances.keys().map(String::as_str)
	}

	/// Whether the schema has no features.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.distances.is_empty()
	}

	/// Resolve the selected features into callable metrics.
	///
	/// `features = None` selects every feature in the schema. A non-`None`
	/// `distance_override` replaces each feature's own distance.
	///
	/// # Errors
	///
	/// [`AnalysisError::UnknownFeature`] for a selected feature the schema
	/// does not know; [`AnalysisError::UnknownDistance`] for a distance name
	/// the registry does not know.
	pub fn resolve(
		&self,
		registry: &DistanceRegistry,
		features: Option<&[String]>,
		distance_override: Option<&str>,
	) -> Result<Vec<FeatureMetric>> {
		let selected: Vec<&str> = match features {
			Some(names) => names.iter().map(String::as_str).collect(),
			None => self.feature_names().collect(),
		};

		selected
			.into_iter()
			.map(|feature| {
				let own = self
					.distance_name(feature)
					.ok_or_else(|| AnalysisError::UnknownFeature(feature.to_owned()))?;
				let distance = registry.resolve(distance_override.unwrap_or(own))?;
				Ok(FeatureMetric {
					feature: feature.to_owned(),
					distance,
				})
			})
			.collect()
	}
}

/// One feature paired with the distance used to compare it.
#[derive(Debug, Clone)]
pub struct FeatureMetric {
	/// Feature name
	pub feature: String,
	/// Distance for this feature
	pub distance: DistanceFn,
}

impl FeatureMetric {
	/// Distance between two stimuli along this feature, or `None` if either
	/// lacks the feature.
	#[must_use]
	pub fn between(&self, a: &Stimulus, b: &Stimulus) -> Option<f64> {
		let x = a.feature(&self.feature)?;
		let y = b.feature(&self.feature)?;
		Some(self.distance.distance(x, y))
	}
}

/// Mean per-feature distance between two stimuli.
///
/// `None` if either stimulus lacks one of the features; NaN if any
/// feature's distance is undefined.
#[must_use]
pub fn stimulus_distance(metrics: &[FeatureMetric], a: &Stimulus, b: &Stimulus) -> Option<f64> {
	if metrics.is_empty() {
		return None;
	}

	let mut total = 0.0;
	for metric in metrics {
		total += metric.between(a, b)?;
	}

	#[allow(clippy::cast_precision_loss)]
	let n = metrics.len() as f64;
	Some(total / n)
}
