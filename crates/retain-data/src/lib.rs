#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retain/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod csv_reader;
pub mod error;
pub mod parse;
pub mod record;
pub mod request;

pub use csv_reader::{read_records, read_records_from_path};
pub use error::{DataError, Result};
pub use record::{CustomerRef, RawCustomerRecord, RecordBatch, RowError};
pub use request::PredictionRequest;

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
