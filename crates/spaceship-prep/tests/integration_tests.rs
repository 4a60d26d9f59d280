//! Integration tests for the passenger preprocessor.
//!
//! These tests run the full pipeline over CSV fixtures shaped like the
//! passenger manifests it is meant for.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use spaceship_prep::stats::{OutlierDetector, mean_ci_for_column, proportion_ci};
use spaceship_prep::{
    MalformedCabinPolicy, PipelineStage, PreprocessingError, Preprocessor, PreprocessorConfig,
    ProgressUpdate, Transformer,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn ints(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .map(|v| v.expect("unexpected null"))
        .collect()
}

fn floats(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.expect("unexpected null"))
        .collect()
}

fn strings(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.expect("unexpected null").to_string())
        .collect()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_transform_train_fixture() {
    let df = load_csv("train.csv");

    let df = Preprocessor::default().transform(df).unwrap();

    assert_eq!(df.height(), 8);
    assert_eq!(
        df.get_column_names_str(),
        vec![
            "PassengerId",
            "HomePlanet",
            "CryoSleep",
            "Destination",
            "Age",
            "VIP",
            "RoomService",
            "FoodCourt",
            "ShoppingMall",
            "Spa",
            "VRDeck",
            "Transported",
            "RoomService_cat",
            "FoodCourt_cat",
            "ShoppingMall_cat",
            "Spa_cat",
            "VRDeck_cat",
            "Deck",
            "Number",
            "Side",
            "GroupID",
            "GroupSize",
            "FamilySize",
            "IsSolo",
            "ServiceCount",
            "UsedAnyService",
        ]
    );

    // Spending indicators
    assert_eq!(ints(&df, "RoomService_cat"), vec![0, 1, 1, 0, 1, 0, 0, 0]);
    assert_eq!(ints(&df, "ShoppingMall_cat"), vec![0, 1, 0, 1, 1, 0, 0, 0]);

    // Binary columns
    assert_eq!(ints(&df, "CryoSleep"), vec![0, 0, 0, 0, 0, 0, 1, 1]);
    assert_eq!(ints(&df, "VIP"), vec![0, 0, 1, 0, 0, 0, 0, 0]);

    // Median of the observed ages is 30.5
    assert_eq!(
        floats(&df, "Age"),
        vec![39.0, 24.0, 58.0, 33.0, 16.0, 30.5, 30.5, 28.0]
    );

    // Categorical fill
    assert_eq!(strings(&df, "HomePlanet")[4], "Unknown");
    assert_eq!(strings(&df, "Destination")[6], "Unknown");

    // Cabin decomposition
    assert_eq!(
        strings(&df, "Deck"),
        vec!["B", "F", "A", "A", "F", "Unknown", "G", "G"]
    );
    assert_eq!(
        floats(&df, "Number"),
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]
    );
    assert_eq!(strings(&df, "Side")[5], "Unknown");

    // Group features
    assert_eq!(
        strings(&df, "GroupID"),
        vec!["0001", "0002", "0003", "0003", "0004", "0005", "0006", "0006"]
    );
    assert_eq!(ints(&df, "GroupSize"), vec![1, 1, 2, 2, 1, 1, 2, 2]);
    // Row 6 has no name, so its family size is its group size
    assert_eq!(ints(&df, "FamilySize"), vec![1, 1, 2, 2, 1, 1, 2, 1]);
    assert_eq!(ints(&df, "IsSolo"), vec![1, 1, 0, 0, 1, 1, 0, 1]);

    // Aggregates
    assert_eq!(
        floats(&df, "ServiceCount"),
        vec![0.0, 736.0, 10383.0, 5176.0, 1091.0, 774.0, 0.0, 0.0]
    );
    assert_eq!(ints(&df, "UsedAnyService"), vec![0, 1, 1, 1, 1, 1, 0, 0]);

    // Target column passes through
    assert_eq!(df.column("Transported").unwrap().null_count(), 0);
}

#[test]
fn test_train_and_test_use_their_own_statistics() {
    let mut preprocessor = Preprocessor::default();

    let train = preprocessor.fit_transform(load_csv("train.csv")).unwrap();
    let test = preprocessor.transform(load_csv("test.csv")).unwrap();

    assert_eq!(floats(&train, "Age")[5], 30.5);
    // Median of the test table's own ages (10, 20, 50)
    assert_eq!(floats(&test, "Age"), vec![10.0, 20.0, 20.0, 50.0]);
    assert_eq!(ints(&test, "GroupSize"), vec![1, 1, 1, 1]);
    assert_eq!(ints(&test, "UsedAnyService"), vec![0, 1, 0, 1]);
}

#[test]
fn test_transform_twice_is_identity() {
    let preprocessor = Preprocessor::default();

    let once = preprocessor.transform(load_csv("train.csv")).unwrap();
    let twice = preprocessor.transform(once.clone()).unwrap();

    assert_eq!(once.get_column_names(), twice.get_column_names());
    assert!(once.equals_missing(&twice));
}

#[test]
fn test_summary_on_fixture() {
    let (_, summary) = Preprocessor::default()
        .transform_with_summary(load_csv("train.csv"))
        .unwrap();

    assert_eq!(summary.rows, 8);
    assert_eq!(summary.columns_before, 14);
    assert_eq!(summary.columns_after, 26);
    assert_eq!(
        summary.columns_removed,
        vec!["Cabin".to_string(), "Name".to_string()]
    );
    assert_eq!(summary.columns_added.len(), 14);
    assert!(summary.warnings().is_empty());
    assert!(summary.skipped_stages().is_empty());

    let imputation = summary.stage(PipelineStage::NumericImputation).unwrap();
    assert!(imputation.steps[0].contains("30.50"));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["rows"], 8);
}

// ============================================================================
// Optional and Required Columns
// ============================================================================

#[test]
fn test_optional_columns_absent() {
    let df = load_csv("test.csv").drop_many(["Cabin", "Name"]);

    let (df, summary) = Preprocessor::default().transform_with_summary(df).unwrap();

    assert_eq!(
        summary.skipped_stages(),
        vec![
            PipelineStage::CabinDecomposition,
            PipelineStage::GroupFeatures
        ]
    );
    for absent in ["Deck", "Number", "Side", "GroupID", "FamilySize"] {
        assert!(df.column(absent).is_err(), "{} should not exist", absent);
    }
    assert!(df.column("ServiceCount").is_ok());
}

#[test]
fn test_missing_required_column() {
    let df = load_csv("train.csv").drop("Age").unwrap();

    let err = Preprocessor::default().transform(df).unwrap_err();

    assert!(err.is_precondition_failure());
    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "COLUMN_NOT_FOUND");
    assert!(json["message"].as_str().unwrap().contains("Age"));
}

#[test]
fn test_name_requires_passenger_id() {
    let df = load_csv("test.csv").drop("PassengerId").unwrap();

    let err = Preprocessor::default().transform(df).unwrap_err();
    assert!(matches!(err, PreprocessingError::ColumnNotFound(ref c) if c == "PassengerId"));
}

// ============================================================================
// Configuration
// ============================================================================

fn with_malformed_cabin(mut df: DataFrame) -> DataFrame {
    let cabins = Series::new(
        "Cabin".into(),
        [Some("G/3/S"), Some("F/4"), None, Some("C/1/S")],
    );
    df.with_column(cabins).unwrap();
    df
}

#[test]
fn test_malformed_cabin_fails_by_default() {
    let df = with_malformed_cabin(load_csv("test.csv"));

    let err = Preprocessor::default().transform(df).unwrap_err();

    assert_eq!(err.error_code(), "MALFORMED_VALUE");
    assert!(err.to_string().contains("F/4"));
}

#[test]
fn test_malformed_cabin_as_unknown() {
    let df = with_malformed_cabin(load_csv("test.csv"));
    let config = PreprocessorConfig::builder()
        .malformed_cabin(MalformedCabinPolicy::Unknown)
        .build()
        .unwrap();

    let (df, summary) = Preprocessor::builder()
        .config(config)
        .build()
        .unwrap()
        .transform_with_summary(df)
        .unwrap();

    assert_eq!(strings(&df, "Deck"), vec!["G", "Unknown", "Unknown", "C"]);
    assert_eq!(summary.warnings().len(), 1);
}

#[test]
fn test_config_from_json() {
    let config = PreprocessorConfig::from_json(
        r#"{ "categorical_sentinel": "Missing", "cabin_sentinel": "Z/-1/Z" }"#,
    )
    .unwrap();

    let df = Preprocessor::builder()
        .config(config)
        .build()
        .unwrap()
        .transform(load_csv("train.csv"))
        .unwrap();

    assert_eq!(strings(&df, "HomePlanet")[4], "Missing");
    assert_eq!(strings(&df, "Deck")[5], "Z");
    assert_eq!(floats(&df, "Number")[5], -1.0);
}

#[test]
fn test_invalid_json_config() {
    let err = PreprocessorConfig::from_json(r#"{ "cabin_sentinel": "Unknown" }"#).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CONFIG");
}

// ============================================================================
// Progress and Threading
// ============================================================================

#[test]
fn test_progress_reporting_on_worker_thread() {
    let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();

    let preprocessor = Preprocessor::builder()
        .on_progress(move |update| sink.lock().unwrap().push(update))
        .build()
        .unwrap();
    let df = load_csv("train.csv");

    let handle = std::thread::spawn(move || preprocessor.transform(df));
    let df = handle.join().unwrap().unwrap();
    assert_eq!(df.height(), 8);

    let updates = updates.lock().unwrap();
    let last = updates.last().unwrap();
    assert_eq!(last.stage, PipelineStage::Complete);
    assert_eq!(last.progress, 1.0);
    assert_eq!(updates[0].stage, PipelineStage::SpendingEncoding);
    assert!(updates.iter().all(|u| (0.0..=1.0).contains(&u.progress)));
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn test_stats_on_fixture() {
    let df = load_csv("train.csv");

    let interval = mean_ci_for_column(&df, "Age", 0.95).unwrap();
    assert!(interval.contains(33.0));

    let transported = df
        .column("Transported")
        .unwrap()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .filter(|v| v.is_some_and(|s| s.eq_ignore_ascii_case("true")))
        .count() as u64;
    let interval = proportion_ci(transported, df.height() as u64, 0.95)
        .unwrap()
        .unwrap();
    assert!(interval.contains(5.0 / 8.0));

    let features = Preprocessor::default().transform(df).unwrap();
    let flags = OutlierDetector::flag_iqr(&features, "ServiceCount").unwrap();
    let flags: Vec<i64> = flags.i64().unwrap().into_iter().flatten().collect();
    // Only the 10383 spender lies above the upper fence
    assert_eq!(flags, vec![0, 0, 1, 0, 0, 0, 0, 0]);
}
