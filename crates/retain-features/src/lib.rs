#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retain/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod registry;
pub mod schema;
pub mod transform;
pub mod validate;

pub use batch::{EngineeredBatch, FeatureRow, FeatureValue};
pub use encoding::{AgeBucket, Encoded, Gender, Geography};
pub use error::FeatureError;
pub use frame::records_to_frame;
pub use registry::{FeatureInfo, FeatureStage, engineered_features, get_feature_info};
pub use schema::{FeatureKind, FeatureSchema, FeatureSpec, PipelineVersion, names};
pub use transform::{
    FeatureTransformer, PLACEHOLDER_ID, TransformConfig, TransformContext, v1_stage, v2_stage,
};
pub use validate::{check_record, screen_records};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
