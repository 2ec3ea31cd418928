#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retain/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod prediction;
pub mod report;
pub mod retention;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter};
pub use prediction::{BatchPrediction, BatchPredictionReport, PredictionReport};
pub use report::{Report, ReportBuilder, ReportError, ReportKind};
pub use retention::{
    AccountSnapshot, OutputError, RetentionCandidate, RetentionConfig, RetentionReport,
    RetentionValuation, RetentionValueEngine, ScoredAccount, value_customer,
};
pub use summary::RetentionSummary;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
