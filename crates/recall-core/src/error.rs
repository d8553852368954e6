//! Error types for recall analyses.

/// Errors that can abort an analysis call.
///
/// Per-list data problems (too few recalls, intrusions, missing features on a
/// recalled item) are not errors: they degrade that list's result to NaN or a
/// neutral value and are reported through `tracing`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
	/// Distance function name is not registered.
	#[error("Unknown distance function: {0}")]
	UnknownDistance(String),

	/// Feature is not part of the dataset schema and cannot be inferred.
	#[error("Unknown feature: {0}")]
	UnknownFeature(String),

	/// Match mode string could not be parsed.
	#[error("Unknown match mode: {0} (expected exact, best or smooth)")]
	UnknownMatchMode(String),

	/// Analysis kind string could not be parsed.
	#[error("Unknown analysis: {0}")]
	UnknownAnalysis(String),

	/// The analysis cannot run under the requested match mode.
	#[error("{analysis} does not support {mode} matching")]
	UnsupportedMatchMode {
		/// Analysis that rejected the mode
		analysis: &'static str,
		/// Rejected mode
		mode: &'static str,
	},

	/// A parameter value is out of range or inconsistent with the dataset.
	#[error("Invalid parameter `{name}`: {reason}")]
	InvalidParameter {
		/// Parameter name
		name: &'static str,
		/// Why it was rejected
		reason: String,
	},

	/// Malformed stimulus on input.
	#[error("Invalid stimulus at subject {subject}, list {list}, index {index}: {reason}")]
	InvalidStimulus {
		/// Subject index
		subject: usize,
		/// List index within the subject
		list: usize,
		/// Stimulus index within the list
		index: usize,
		/// What is wrong with it
		reason: String,
	},

	/// Presentation and recall data disagree on subject/list structure.
	#[error("Presented and recalled data differ in shape: {0}")]
	ShapeMismatch(String),
}

impl AnalysisError {
	/// Check if this is a configuration error (bad names, modes or parameters)
	/// rather than malformed input data.
	#[must_use]
	pub const fn is_configuration(&self) -> bool {
		matches!(
			self,
			Self::UnknownDistance(_)
				| Self::UnknownFeature(_)
				| Self::UnknownMatchMode(_)
				| Self::UnknownAnalysis(_)
				| Self::UnsupportedMatchMode { .. }
				| Self::InvalidParameter { .. }
		)
	}
}

/// Result type alias for recall analyses.
pub type Result<T> = std::result::Result<T, AnalysisError>;
