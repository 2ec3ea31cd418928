//! Model lifecycle.
//!
//! A [`ModelSnapshot`] bundles everything resolved at load time: the model
//! configuration, the transformer matching its feature schema, and the two
//! engines. [`ModelHandle`] publishes the current snapshot through an atomic
//! pointer; callers take one snapshot per request and use it throughout, so a
//! reload mid-request never mixes two models.

use crate::attribution::AttributionEngine;
use crate::capability::{Attributor, Classifier};
use crate::error::{ModelError, Result};
use crate::scoring::ScoringEngine;
use arc_swap::ArcSwapOption;
use retain_features::{
    FeatureSchema, FeatureTransformer, PipelineVersion, TransformConfig, TransformContext,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration of a loaded model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name, for logs and reports
    pub name: String,
    /// Pipeline version the model was fit with
    pub pipeline_version: PipelineVersion,
    /// Whether the model was fit with the customer identifier as a feature
    #[serde(default)]
    pub requires_identifier_feature: bool,
}

impl ModelConfig {
    /// Transformer configuration for scoring with this model.
    pub const fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            version: self.pipeline_version,
            include_identifier: self.requires_identifier_feature,
            context: TransformContext::Inference,
        }
    }

    /// Feature layout the model consumes.
    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.pipeline_version, self.requires_identifier_feature)
    }
}

/// Immutable view of a loaded model.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    config: ModelConfig,
    transformer: FeatureTransformer,
    scoring: ScoringEngine,
    attribution: AttributionEngine,
}

impl ModelSnapshot {
    /// Assemble a snapshot from a configuration and two capabilities.
    pub fn new(
        config: ModelConfig,
        classifier: Arc<dyn Classifier>,
        attributor: Arc<dyn Attributor>,
    ) -> Self {
        Self {
            transformer: FeatureTransformer::new(config.transform_config()),
            scoring: ScoringEngine::new(classifier),
            attribution: AttributionEngine::new(attributor),
            config,
        }
    }

    /// Model configuration.
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Transformer producing this model's feature layout.
    pub const fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    /// Scoring engine.
    pub const fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    /// Attribution engine.
    pub const fn attribution(&self) -> &AttributionEngine {
        &self.attribution
    }
}

/// Shared, atomically replaceable reference to the current model.
#[derive(Debug, Default)]
pub struct ModelHandle {
    current: ArcSwapOption<ModelSnapshot>,
}

impl ModelHandle {
    /// Handle with no model loaded.
    pub fn empty() -> Self {
        Self {
            current: ArcSwapOption::from(None),
        }
    }

    /// Handle with a model loaded.
    pub fn with_snapshot(snapshot: ModelSnapshot) -> Self {
        let handle = Self::empty();
        handle.load(snapshot);
        handle
    }

    /// Publish a snapshot. Calls already holding the previous one finish on it.
    pub fn load(&self, snapshot: ModelSnapshot) {
        tracing::info!(
            model = %snapshot.config.name,
            pipeline_version = %snapshot.config.pipeline_version,
            identifier_feature = snapshot.config.requires_identifier_feature,
            "model loaded"
        );
        self.current.store(Some(Arc::new(snapshot)));
    }

    /// Remove the current model.
    pub fn unload(&self) {
        if self.current.swap(None).is_some() {
            tracing::info!("model unloaded");
        }
    }

    /// Whether a model is loaded.
    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Result<Arc<ModelSnapshot>> {
        self.current
            .load_full()
            .ok_or_else(|| ModelError::Unavailable("no model loaded".to_string()))
    }
}
