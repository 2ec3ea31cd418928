#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retain/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod service;

// Re-export main types from sub-crates
pub use retain_data as data;
pub use retain_features as features;
pub use retain_model as model;
pub use retain_output as output;

pub use error::{Result, ServiceError};
pub use service::ChurnService;

// Re-export common types
pub use retain_data::{RawCustomerRecord, RecordBatch};
pub use retain_model::{ModelHandle, ModelSnapshot, RiskLevel};
pub use retain_output::{
    BatchPredictionReport, PredictionReport, RetentionConfig, RetentionReport, RetentionValuation,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
