#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retain/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod attribution;
pub mod capability;
pub mod context;
pub mod error;
pub mod linear;
pub mod ranking;
pub mod risk;
pub mod scoring;

// Re-export main types
pub use attribution::{AttributionEngine, BATCH_TOP_K, DETAIL_TOP_K, Explanation, ExplanationSet};
pub use capability::{AttributionOutput, Attributor, BaselineOutput, Classifier};
pub use context::{ModelConfig, ModelHandle, ModelSnapshot};
pub use error::{ModelError, Result};
pub use linear::{LinearArtifact, LinearModel, load_snapshot};
pub use ranking::{Attribution, RankingPolicy, rank};
pub use risk::{HIGH_RISK_THRESHOLD, RiskLevel};
pub use scoring::{PROBABILITY_CEILING, ScoringEngine, clamp_probability};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
