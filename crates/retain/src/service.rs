//! Churn Service
//!
//! Orchestrates transform, scoring, attribution and retention valuation
//! against the currently loaded model. Each call takes one model snapshot and
//! uses it for every step, so a concurrent reload never mixes two models in
//! one result.

use crate::error::Result;
use retain_data::{PredictionRequest, RawCustomerRecord, RecordBatch};
use retain_features::{check_record, screen_records};
use retain_model::{ModelHandle, ModelSnapshot, load_snapshot};
use retain_output::{
    AccountSnapshot, BatchPrediction, BatchPredictionReport, PredictionReport, RetentionConfig,
    RetentionReport, RetentionValuation, RetentionValueEngine, value_customer,
};
use std::path::Path;

/// Entry point for churn predictions and retention valuations.
#[derive(Debug, Default)]
pub struct ChurnService {
    model: ModelHandle,
}

impl ChurnService {
    /// Service over an existing handle.
    pub const fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    /// Service with a model already loaded.
    pub fn with_model(snapshot: ModelSnapshot) -> Self {
        Self::new(ModelHandle::with_snapshot(snapshot))
    }

    /// Service with the linear model at `path` loaded.
    pub fn from_model_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_model(load_snapshot(path)?))
    }

    /// Model handle.
    pub const fn handle(&self) -> &ModelHandle {
        &self.model
    }

    /// Swap in a new model. Calls in flight finish on the previous one.
    pub fn reload(&self, snapshot: ModelSnapshot) {
        self.model.load(snapshot);
    }

    /// Swap in the linear model at `path`. The current model stays on failure.
    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = load_snapshot(path)?;
        self.reload(snapshot);
        Ok(())
    }

    /// Score and explain one customer.
    pub fn predict_one(&self, record: &RawCustomerRecord) -> Result<PredictionReport> {
        let snapshot = self.model.snapshot()?;
        check_record(record)?;
        let batch = snapshot
            .transformer()
            .transform_records(std::slice::from_ref(record))?;

        let probability = snapshot.scoring().score_one(&batch)?;
        let explanation = snapshot.attribution().explain_one(&batch)?;

        Ok(PredictionReport::new(
            record.reference(1),
            snapshot.config().name.as_str(),
            probability,
            explanation,
        ))
    }

    /// Score and explain a customer submitted as JSON.
    pub fn predict_request(&self, json: &str) -> Result<PredictionReport> {
        let record = PredictionRequest::from_json(json)?.into_record()?;
        self.predict_one(&record)
    }

    /// Score every valid record of a batch, with its top reasons.
    ///
    /// Rows rejected during ingestion, or whose values cannot be encoded, are
    /// carried into the report as row errors.
    pub fn predict_batch(&self, batch: &RecordBatch) -> Result<BatchPredictionReport> {
        let span = tracing::info_span!("predict_batch", rows = batch.len());
        let _guard = span.enter();

        let snapshot = self.model.snapshot()?;
        let name = snapshot.config().name.as_str();
        let batch = screen_records(batch);
        let (rows, records): (Vec<usize>, Vec<RawCustomerRecord>) =
            batch.records.iter().cloned().unzip();

        let engineered = snapshot.transformer().transform_records(&records)?;
        let probabilities = snapshot.scoring().score_batch(&engineered)?;
        let reasons = snapshot.attribution().explain_batch(&engineered)?;

        let predictions = rows
            .into_iter()
            .zip(&records)
            .zip(probabilities.into_iter().zip(reasons))
            .map(|((row, record), (probability, reasons))| {
                BatchPrediction::new(record.reference(row), probability, reasons)
            })
            .collect();

        let report = BatchPredictionReport::new(name, predictions, batch.errors);
        tracing::info!(
            model = name,
            scored = report.predictions.len(),
            rejected = report.errors.len(),
            high_risk = report.high_risk_count(),
            "batch scored"
        );
        Ok(report)
    }

    /// Value retention offers for every valid record of a batch.
    ///
    /// Rows rejected during ingestion, screening or valuation are all
    /// reported as row errors, ordered by row.
    pub fn value_retention(
        &self,
        batch: &RecordBatch,
        config: RetentionConfig,
    ) -> Result<RetentionReport> {
        let span = tracing::info_span!("value_retention", rows = batch.len());
        let _guard = span.enter();

        let engine = RetentionValueEngine::new(config)?;
        let snapshot = self.model.snapshot()?;
        let batch = screen_records(batch);
        let records: Vec<RawCustomerRecord> =
            batch.records.iter().map(|(_, r)| r.clone()).collect();

        let engineered = snapshot.transformer().transform_records(&records)?;
        let probabilities = snapshot.scoring().score_batch(&engineered)?;

        let mut report = engine.evaluate_records(&batch.records, &probabilities)?;
        report.errors.extend(batch.errors);
        report.errors.sort_by_key(|e| e.row);

        tracing::info!(
            model = %snapshot.config().name,
            actionable = report.summary.actionable_count,
            rejected = report.errors.len(),
            total_expected_return = report.summary.total_expected_return,
            "retention valued"
        );
        Ok(report)
    }

    /// Score one customer and value a retention offer.
    pub fn value_one(
        &self,
        record: &RawCustomerRecord,
        config: RetentionConfig,
    ) -> Result<RetentionValuation> {
        config.validate()?;
        let snapshot = self.model.snapshot()?;
        check_record(record)?;
        let batch = snapshot
            .transformer()
            .transform_records(std::slice::from_ref(record))?;
        let probability = snapshot.scoring().score_one(&batch)?;

        Ok(value_customer(
            probability,
            &AccountSnapshot::from(record),
            &config,
        )?)
    }
}
