//! Integration tests for the engines over the linear backend

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retain_data::RawCustomerRecord;
use retain_features::{
    EngineeredBatch, FeatureKind, FeatureSchema, PipelineVersion, TransformConfig,
};
use retain_model::linear::{AttributionShape, LinearTerm, TermEffect};
use retain_model::{
    Attributor, BATCH_TOP_K, DETAIL_TOP_K, LinearArtifact, LinearModel, ModelHandle,
    ModelSnapshot, RiskLevel,
};

fn weight_for(name: &str) -> (f64, f64) {
    match name {
        "CreditScore" => (-0.0007, 650.0),
        "Gender" => (0.5, 0.45),
        "Age" => (0.07, 38.9),
        "Balance" => (0.000_002_5, 76_485.0),
        "NumOfProducts" => (-0.1, 1.53),
        "HasCrCard" => (-0.05, 0.7),
        "IsActiveMember" => (-1.05, 0.51),
        "EstimatedSalary" => (0.000_000_5, 100_090.0),
        "is_two_products" => (-1.5, 0.46),
        "germany_female" => (0.2, 0.11),
        "germany_inactive" => (0.3, 0.13),
        "has_zero_balance" => (-0.15, 0.36),
        "tenure_log" => (-0.08, 1.6),
        "is_mature_inactive_transit" => (0.9, 0.08),
        _ => (0.0, 0.0),
    }
}

fn artifact(shape: AttributionShape, include_identifier: bool) -> LinearArtifact {
    let schema = FeatureSchema::new(PipelineVersion::V2, include_identifier);
    let terms = schema
        .features()
        .iter()
        .map(|spec| {
            let effect = match spec.kind {
                FeatureKind::Categorical(levels) => TermEffect::Categorical {
                    weights: levels
                        .iter()
                        .enumerate()
                        .map(|(i, level)| (level.to_string(), 0.25 * i as f64))
                        .collect(),
                    frequencies: levels
                        .iter()
                        .map(|level| (level.to_string(), 1.0 / levels.len() as f64))
                        .collect(),
                },
                _ => {
                    let (weight, mean) = weight_for(spec.name);
                    TermEffect::Numeric { weight, mean }
                }
            };
            LinearTerm {
                feature: spec.name.to_string(),
                effect,
            }
        })
        .collect();

    LinearArtifact {
        name: "churn-linear-test".to_string(),
        pipeline_version: PipelineVersion::V2,
        requires_identifier_feature: include_identifier,
        intercept: -1.2,
        attribution_output: shape,
        terms,
    }
}

fn snapshot(shape: AttributionShape) -> ModelSnapshot {
    LinearModel::from_artifact(artifact(shape, false))
        .unwrap()
        .into_snapshot()
}

fn random_customers(n: usize, seed: u64) -> Vec<RawCustomerRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| RawCustomerRecord {
            customer_id: Some(15_600_000 + i as i64),
            surname: None,
            credit_score: rng.gen_range(350..=850),
            geography: ["France", "Germany", "Spain"][rng.gen_range(0..3)].to_string(),
            gender: ["Male", "Female", "X"][rng.gen_range(0..3)].to_string(),
            age: rng.gen_range(18..=92),
            tenure: rng.gen_range(0..=10),
            balance: if rng.gen_bool(0.35) {
                0.0
            } else {
                rng.gen_range(1_000.0..250_000.0)
            },
            num_products: rng.gen_range(1..=4),
            has_credit_card: rng.gen_bool(0.7),
            is_active_member: rng.gen_bool(0.5),
            estimated_salary: rng.gen_range(10.0..200_000.0),
        })
        .collect()
}

fn transform(snap: &ModelSnapshot, customers: &[RawCustomerRecord]) -> EngineeredBatch {
    snap.transformer().transform_records(customers).unwrap()
}

#[test]
fn test_score_batch_matches_score_one() {
    let snap = snapshot(AttributionShape::PositiveClass);
    let customers = random_customers(40, 11);
    let batch = transform(&snap, &customers);
    let scores = snap.scoring().score_batch(&batch).unwrap();

    for (i, score) in scores.iter().enumerate() {
        let one = snap.scoring().score_one(&batch.slice(i, 1)).unwrap();
        assert_eq!(*score, one);
        assert!((0.0..=0.999).contains(score));
    }
}

#[test]
fn test_single_and_batch_explanations_agree() {
    let snap = snapshot(AttributionShape::PerClass);
    let customers = random_customers(25, 5);
    let batch = transform(&snap, &customers);
    let reasons = snap.attribution().explain_batch(&batch).unwrap();

    for (i, customer) in customers.iter().enumerate() {
        let single = transform(&snap, std::slice::from_ref(customer));
        let explanation = snap.attribution().explain_one(&single).unwrap();
        assert_eq!(explanation.attributions.len(), DETAIL_TOP_K);
        assert_eq!(reasons[i].len(), BATCH_TOP_K);
        assert_eq!(reasons[i].as_slice(), &explanation.attributions[..BATCH_TOP_K]);
    }
}

#[test]
fn test_output_shape_does_not_change_explanations() {
    let per_class = snapshot(AttributionShape::PerClass);
    let positive = snapshot(AttributionShape::PositiveClass);
    let customers = random_customers(10, 23);

    for customer in &customers {
        let batch = transform(&positive, std::slice::from_ref(customer));
        assert_eq!(
            per_class.attribution().explain_one(&batch).unwrap(),
            positive.attribution().explain_one(&batch).unwrap()
        );
    }
}

#[test]
fn test_contributions_sum_to_logit() {
    let model = LinearModel::from_artifact(artifact(AttributionShape::PositiveClass, false)).unwrap();
    let snap = model.clone().into_snapshot();
    let batch = transform(&snap, &random_customers(30, 2));

    let baseline = model.baseline().into_positive_class().unwrap();
    let contributions = model.attribute(&batch).unwrap().into_positive_class().unwrap();
    let scores = snap.scoring().score_batch(&batch).unwrap();

    for (row, p) in contributions.rows().into_iter().zip(scores) {
        let logit = baseline + row.sum();
        if p < 0.999 {
            assert_relative_eq!(1.0 / (1.0 + (-logit).exp()), p, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_unknown_gender_contributes_nothing() {
    let snap = snapshot(AttributionShape::PositiveClass);
    let mut customer = random_customers(1, 8).remove(0);
    customer.gender = "Unspecified".to_string();
    let batch = transform(&snap, &[customer]);

    let explanation = snap.attribution().explain_one(&batch).unwrap();
    if let Some(gender) = explanation.attributions.iter().find(|a| a.feature == "Gender") {
        assert_eq!(gender.impact, 0.0);
        assert_eq!(gender.raw_value, "NA");
    }
}

#[test]
fn test_identifier_model_uses_identifier_layout() {
    let model = LinearModel::from_artifact(artifact(AttributionShape::PositiveClass, true)).unwrap();
    let snap = model.into_snapshot();
    let config: &TransformConfig = snap.transformer().config();
    assert!(config.include_identifier);

    let mut customers = random_customers(2, 4);
    customers[1].customer_id = None;
    let batch = transform(&snap, &customers);
    assert_eq!(batch.feature_names()[0], "CustomerId");
    assert_eq!(snap.scoring().score_batch(&batch).unwrap().len(), 2);
}

#[test]
fn test_mismatched_layout_is_rejected() {
    let v2 = snapshot(AttributionShape::PositiveClass);
    let v1 = retain_features::FeatureTransformer::new(TransformConfig {
        version: PipelineVersion::V1,
        ..Default::default()
    });
    let batch = v1.transform_records(&random_customers(1, 1)).unwrap();
    assert!(v2.scoring().score_batch(&batch).is_err());
    assert!(v2.attribution().explain_one(&batch).is_err());
}

#[test]
fn test_handle_serves_loaded_model() {
    let handle = ModelHandle::with_snapshot(snapshot(AttributionShape::PositiveClass));
    let snap = handle.snapshot().unwrap();
    let batch = transform(&snap, &random_customers(1, 99));
    let p = snap.scoring().score_one(&batch).unwrap();
    let explanation = snap.attribution().explain_one(&batch).unwrap();
    let risk = RiskLevel::from_probability(p);
    let reason = explanation.primary_reason(risk).unwrap();
    match risk {
        RiskLevel::High => assert!(explanation.attributions.iter().all(|a| a.impact <= reason.impact)),
        RiskLevel::Low => assert!(explanation.attributions.iter().all(|a| a.impact >= reason.impact)),
    }
}
