//! Analysis kinds and parameters.

use std::fmt;
use std::str::FromStr;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

// ============================================================================
// Match Mode
// ============================================================================

/// How recalled items are aligned to presented items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
	/// Identity equality
	#[default]
	Exact,
	/// Nearest presented item by feature distance
	Best,
	/// Inverse-distance weighting over all presented items
	Smooth,
}

impl MatchMode {
	/// Lowercase name.
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Exact => "exact",
			Self::Best => "best",
			Self::Smooth => "smooth",
		}
	}
}

impl fmt::Display for MatchMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for MatchMode {
	type Err = AnalysisError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"exact" => Ok(Self::Exact),
			"best" => Ok(Self::Best),
			"smooth" => Ok(Self::Smooth),
			other => Err(AnalysisError::UnknownMatchMode(other.to_owned())),
		}
	}
}

// ============================================================================
// Analysis Kind
// ============================================================================

/// The analyses this crate can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
	/// Fraction of presented items recalled
	Accuracy,
	/// Serial position curve
	Spc,
	/// Probability of first recall
	Pfr,
	/// Probability of nth recall (zero-indexed recall position)
	Pnr {
		/// Recall rank being queried
		position: usize,
	},
	/// Lag conditional response probability
	#[serde(rename = "lagcrp")]
	LagCrp,
	/// Feature clustering scores
	Fingerprint,
	/// Temporal clustering score
	Temporal,
	/// Feature clustering scores plus temporal clustering
	FingerprintTemporal,
}

impl Analysis {
	/// Short name used in logs and results.
	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::Accuracy => "accuracy",
			Self::Spc => "spc",
			Self::Pfr => "pfr",
			Self::Pnr { .. } => "pnr",
			Self::LagCrp => "lagcrp",
			Self::Fingerprint => "fingerprint",
			Self::Temporal => "temporal",
			Self::FingerprintTemporal => "fingerprint_temporal",
		}
	}

	/// Recall rank queried by PFR/PNR.
	#[must_use]
	pub const fn query_position(self) -> Option<usize> {
		match self {
			Self::Pfr => Some(0),
			Self::Pnr { position } => Some(position),
			_ => None,
		}
	}
}

impl fmt::Display for Analysis {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Pnr { position } => write!(f, "pnr:{position}"),
			other => f.write_str(other.name()),
		}
	}
}

impl FromStr for Analysis {
	type Err = AnalysisError;

	/// Parses `accuracy`, `spc`, `pfr`, `pnr` / `pnr:N`, `lagcrp`,
	/// `fingerprint`, `temporal`, `fingerprint_temporal`.
	fn from_str(s: &str) -> Result<Self> {
		let lowered = s.trim().to_ascii_lowercase();
		if let Some(position) = lowered.strip_prefix("pnr:") {
			return position
				.parse()
				.map(|position| Self::Pnr { position })
				.map_err(|_| AnalysisError::UnknownAnalysis(s.to_owned()));
		}

		match lowered.as_str() {
			"accuracy" => Ok(Self::Accuracy),
			"spc" => Ok(Self::Spc),
			"pfr" => Ok(Self::Pfr),
			"pnr" => Ok(Self::Pnr { position: 0 }),
			"lagcrp" => Ok(Self::LagCrp),
			"fingerprint" => Ok(Self::Fingerprint),
			"temporal" => Ok(Self::Temporal),
			"fingerprint_temporal" => Ok(Self::FingerprintTemporal),
			_ => Err(AnalysisError::UnknownAnalysis(s.to_owned())),
		}
	}
}

// ============================================================================
// Parameters
// ============================================================================

/// Parameters shared by every analysis entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct AnalysisParams {
	/// Matching strategy
	#[builder(default)]
	pub match_mode: MatchMode,
	/// Distance name for best/smooth matching (overrides per-feature distances)
	#[builder(into)]
	pub distance: Option<String>,
	/// Features to include (`None` = every feature in the schema)
	pub features: Option<Vec<String>>,
	/// Permutations for fingerprint correction
	#[builder(default = 1000)]
	pub n_perms: usize,
	/// Whether to permutation-correct fingerprint scores
	#[builder(default)]
	pub permute: bool,
	/// Seed for permutation shuffles (`None` = entropy)
	pub seed: Option<u64>,
	/// Run lists and permutation trials on the rayon pool
	#[builder(default = true)]
	pub parallel: bool,
	/// One group label per subject (`None` = one group per subject)
	pub subject_groups: Option<Vec<String>>,
	/// One group label per list index (`None` = one group per list)
	pub list_groups: Option<Vec<String>>,
}

impl Default for AnalysisParams {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl AnalysisParams {
	/// Check parameter ranges.
	///
	/// # Errors
	///
	/// Returns [`AnalysisError::InvalidParameter`] when permutation
	/// correction is requested with zero permutations.
	pub fn validate(&self) -> Result<()> {
		if self.permute && self.n_perms == 0 {
			return Err(AnalysisError::InvalidParameter {
				name: "n_perms",
				reason: "must be positive when permute is enabled".to_owned(),
			});
		}
		Ok(())
	}
}
