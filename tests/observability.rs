use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dataset_diet::reduce::{JsonFileObserver, ReduceObserver, ReduceOptions, Reducer};
use dataset_diet::types::{Column, ColumnData, DataSet};

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("dataset-diet-obs-{nanos}.{ext}"))
}

fn sample_dataset() -> DataSet {
    DataSet::new(vec![
        Column::new("a", ColumnData::Int64(vec![1, 2, 3])),
        Column::new("b", ColumnData::Float64(vec![0.1, 0.2, 0.3])),
    ])
    .unwrap()
}

#[test]
fn json_file_observer_writes_one_event_per_line() {
    let path = tmp_file("jsonl");
    let observer: Arc<dyn ReduceObserver> = Arc::new(JsonFileObserver::new(&path));
    let reducer = Reducer::new(ReduceOptions::default())
        .unwrap()
        .with_observer(observer);

    reducer.reduce(&sample_dataset());

    let log = std::fs::read_to_string(&path).unwrap();
    let events: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    std::fs::remove_file(&path).ok();

    // run_started, one event per column, run_finished.
    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["event"], "run_started");
    assert_eq!(events[0]["columns"], 2);
    assert_eq!(events[0]["rows"], 3);

    let finished = events.last().unwrap();
    assert_eq!(finished["event"], "run_finished");
    assert!(finished["bytes_after"].as_u64().unwrap() <= finished["bytes_before"].as_u64().unwrap());
    assert_eq!(finished["metrics"]["columns_processed"], 2);
}

#[test]
fn converted_columns_are_reported_with_both_dtypes() {
    let path = tmp_file("jsonl");
    let observer: Arc<dyn ReduceObserver> = Arc::new(JsonFileObserver::new(&path));
    let reducer = Reducer::new(ReduceOptions::default())
        .unwrap()
        .with_observer(observer);

    reducer.reduce(&sample_dataset());

    let log = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let converted: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .filter(|e| e["event"] == "column_converted")
        .collect();

    assert_eq!(converted.len(), 2);
    let a = converted.iter().find(|e| e["column"] == "a").unwrap();
    assert_eq!(a["from"], "int64");
    assert_eq!(a["to"], "uint8");
}

#[test]
fn metrics_snapshot_reports_size_change() {
    let reducer = Reducer::new(ReduceOptions::default()).unwrap();
    let ds = sample_dataset();
    let out = reducer.reduce(&ds);

    let snap = reducer.metrics().snapshot();
    assert_eq!(snap.columns_processed, 2);
    assert_eq!(snap.columns_converted, 2);
    assert_eq!(snap.bytes_before, ds.estimated_size() as u64);
    assert_eq!(snap.bytes_after, out.estimated_size() as u64);
    assert!(snap.bytes_after <= snap.bytes_before);
    assert!(snap.elapsed.is_some());

    // The snapshot is serializable for downstream log shipping.
    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["columns_converted"], 2);
}
