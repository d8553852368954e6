//! # Recall Core
//!
//! Analysis engine for free-recall memory experiments: a subject studies a
//! list of items, then recalls as many as they can in any order.
//!
//! ## Core Concepts
//!
//! ### Recall Matrix
//!
//! Every recall event is mapped back onto the presentation list:
//!
//! 1. **Exact** - identity equality, intrusions become NaN
//! 2. **Best** - nearest presented item by feature distance
//! 3. **Smooth** - a weight per presented item, inversely related to distance
//!
//! ### Analyses
//!
//! - **Accuracy** - fraction of presented items recalled
//! - **SPC** - recall probability by serial position
//! - **PFR / PNR** - where the first (nth) recall came from
//! - **Lag-CRP** - conditional probability of each transition lag
//!    ```text
//!    CRP(d) = actual(d) / possible(d)
//!    ```
//! - **Memory fingerprint** - per-feature clustering of recall transitions,
//!   optionally corrected against shuffled recall orders
//!
//! Per-list results are averaged within (subject group, list group) pairs,
//! ignoring NaN.
//!
//! ## Example
//!
//! ```rust
//! use recall_core::{analyze, Analysis, AnalysisParams, Dataset, Stimulus, Trial};
//!
//! let animal = |name: &str, size: f64| Stimulus::new(name).with_feature("size", size);
//!
//! let trial = Trial::new(
//!     vec![animal("mouse", 0.1), animal("cat", 4.0), animal("horse", 500.0), animal("dog", 20.0)],
//!     vec![animal("horse", 500.0), animal("dog", 20.0), animal("cat", 4.0)],
//! );
//! let dataset = Dataset::new(vec![vec![trial]]).expect("valid dataset");
//!
//! let params = AnalysisParams::default();
//! let spc = analyze(&dataset, Analysis::Spc, &params).expect("spc");
//! assert_eq!(spc.mean(), vec![0.0, 1.0, 1.0, 1.0]);
//!
//! let fingerprint = analyze(&dataset, Analysis::FingerprintTemporal, &params).expect("fingerprint");
//! for (feature, score) in fingerprint.labels.iter().zip(fingerprint.mean()) {
//!     println!("{feature}: {score:.3}");
//! }
//! ```
//!
//! ## References
//!
//! - Kahana, M. J. (1996). *Associative retrieval processes in free recall* -
//!   Lag-CRP
//! - Polyn, S. M., Norman, K. A., & Kahana, M. J. (2009). *A context
//!   maintenance and retrieval model of organizational processes in free
//!   recall* - Temporal and semantic clustering scores

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod distance;
pub mod error;
pub mod fingerprint;
pub mod lagcrp;
pub mod params;
pub mod positional;
pub mod recall_matrix;
pub mod stats;
pub mod stimulus;

pub use analysis::{analyze, AnalysisResult, Analyzer, GroupRow, ResultMetadata};
pub use distance::{
	correlation_distance, euclidean_distance, match_distance, stimulus_distance, DistanceFn,
	DistanceRegistry, FeatureMetric, FeatureSchema, CORRELATION, EUCLIDEAN, MATCH,
};
pub use error::{AnalysisError, Result};
pub use fingerprint::{
	clustering_score, list_fingerprint, permutation_correct, ClusterFeature, ClusteringConfig,
	DistanceMatrix, FeatureScores, FingerprintState, MIN_RECALLS, NEUTRAL_SCORE, TEMPORAL,
};
pub use lagcrp::{lag_crp, lag_labels};
pub use params::{Analysis, AnalysisParams, MatchMode};
pub use positional::{accuracy, pfr, pnr, spc};
pub use recall_matrix::{build_recall_matrix, RecallMatrix};
pub use stimulus::{items, Dataset, FeatureValue, Stimulus, Trial};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
