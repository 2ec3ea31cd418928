//! Integration tests for the feature pipeline

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retain_data::{RawCustomerRecord, RecordBatch};
use retain_features::{
    AgeBucket, FeatureError, FeatureTransformer, FeatureValue, PipelineVersion, TransformConfig,
    names, screen_records,
};

const GEOGRAPHIES: [&str; 3] = ["France", "Germany", "Spain"];
const GENDERS: [&str; 3] = ["Male", "Female", "Unknown"];

fn random_customer(rng: &mut StdRng, id: i64) -> RawCustomerRecord {
    RawCustomerRecord {
        customer_id: Some(id),
        surname: Some(format!("Customer{id}")),
        credit_score: rng.gen_range(350..=850),
        geography: GEOGRAPHIES[rng.gen_range(0..3)].to_string(),
        gender: GENDERS[rng.gen_range(0..3)].to_string(),
        age: rng.gen_range(18..=92),
        tenure: rng.gen_range(0..=10),
        balance: if rng.gen_bool(0.3) {
            0.0
        } else {
            rng.gen_range(1.0..250_000.0)
        },
        num_products: rng.gen_range(1..=4),
        has_credit_card: rng.gen_bool(0.7),
        is_active_member: rng.gen_bool(0.5),
        estimated_salary: rng.gen_range(10.0..200_000.0),
    }
}

fn customer_aged(age: i64) -> RawCustomerRecord {
    RawCustomerRecord {
        customer_id: None,
        surname: None,
        credit_score: 650,
        geography: "Spain".to_string(),
        gender: "Female".to_string(),
        age,
        tenure: 3,
        balance: 1_000.0,
        num_products: 1,
        has_credit_card: false,
        is_active_member: true,
        estimated_salary: 40_000.0,
    }
}

#[test]
fn test_batch_rows_match_single_row_transforms() {
    let mut rng = StdRng::seed_from_u64(17);
    let customers: Vec<RawCustomerRecord> = (0..64).map(|i| random_customer(&mut rng, i)).collect();

    for version in [PipelineVersion::V1, PipelineVersion::V2] {
        for include_identifier in [false, true] {
            let transformer = FeatureTransformer::new(TransformConfig {
                version,
                include_identifier,
                ..Default::default()
            });
            let batch = transformer.transform_records(&customers).unwrap();
            let rows = batch.rows().unwrap();
            assert_eq!(rows.len(), customers.len());

            for (i, customer) in customers.iter().enumerate() {
                let single = transformer
                    .transform_records(std::slice::from_ref(customer))
                    .unwrap();
                assert_eq!(single.schema(), batch.schema());
                assert_eq!(single.row(0).unwrap(), rows[i], "row {i} differs");
            }
        }
    }
}

#[test]
fn test_row_order_is_preserved() {
    let mut rng = StdRng::seed_from_u64(3);
    let customers: Vec<RawCustomerRecord> = (0..20).map(|i| random_customer(&mut rng, i)).collect();
    let transformer = FeatureTransformer::default();

    let forward = transformer.transform_records(&customers).unwrap().rows().unwrap();
    let reversed: Vec<RawCustomerRecord> = customers.iter().rev().cloned().collect();
    let mut backward = transformer.transform_records(&reversed).unwrap().rows().unwrap();
    backward.reverse();

    assert_eq!(forward, backward);
}

#[test]
fn test_age_bucket_edges_through_pipeline() {
    let ages = [0, 25, 26, 35, 36, 45, 46, 60, 61, 92];
    let customers: Vec<RawCustomerRecord> = ages.iter().map(|&a| customer_aged(a)).collect();
    let batch = FeatureTransformer::default().transform_records(&customers).unwrap();
    let buckets = batch.column_values(names::AGE_BUCKET).unwrap();

    for (age, bucket) in ages.iter().zip(&buckets) {
        let expected = AgeBucket::from_age(*age)
            .known()
            .map_or(FeatureValue::Missing, |b| FeatureValue::Category(b.label().to_string()));
        assert_eq!(bucket, &expected, "age {age}");
    }
    assert!(!buckets.contains(&FeatureValue::Missing));
}

#[test]
fn test_negative_age_rejects_batch_naming_rows() {
    let customers: Vec<RawCustomerRecord> = [30, -3, 45].iter().map(|&a| customer_aged(a)).collect();
    let err = FeatureTransformer::default()
        .transform_records(&customers)
        .unwrap_err();
    match err {
        FeatureError::InvalidValues { column, rows, .. } => {
            assert_eq!(column, "Age");
            assert_eq!(rows, vec![2]);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let screened = screen_records(&RecordBatch::from_records(customers));
    assert_eq!(screened.len(), 2);
    assert_eq!(screened.errors[0].row, 2);
    let batch = FeatureTransformer::default()
        .transform_records(&screened.records.iter().map(|(_, r)| r.clone()).collect::<Vec<_>>())
        .unwrap();
    assert_eq!(batch.len(), 2);
}

#[test]
fn test_tenure_log_column() {
    let customers: Vec<RawCustomerRecord> = (0..=10)
        .map(|t| RawCustomerRecord {
            tenure: t,
            ..customer_aged(30)
        })
        .collect();
    let batch = FeatureTransformer::default().transform_records(&customers).unwrap();
    let values: Vec<f64> = batch
        .column_values(names::TENURE_LOG)
        .unwrap()
        .iter()
        .filter_map(FeatureValue::as_f64)
        .collect();

    assert_eq!(values.len(), 11);
    assert_eq!(values[0], 0.0);
    for (t, v) in values.iter().enumerate() {
        approx::assert_relative_eq!(*v, (t as f64).ln_1p());
    }
}

#[test]
fn test_categorical_levels_do_not_depend_on_batch() {
    let only_spain = FeatureTransformer::default()
        .transform_records(&[customer_aged(30)])
        .unwrap();
    let geography = only_spain.column_values("Geography").unwrap();
    assert_eq!(geography, vec![FeatureValue::Category("Spain".to_string())]);

    let schema = only_spain.schema();
    let spec = schema.features()[schema.position("Geography").unwrap()];
    assert_eq!(spec.kind.level_code("Spain"), Some(2));
}
