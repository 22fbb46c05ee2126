mod common;

use common::csv_text;
use inventory_import::batch::{BatchPayload, to_batch};
use inventory_import::ingestion::{RowErrorPolicy, parse_products};

#[test]
fn example_file_pivots_into_eight_columns_of_two() {
    let text = csv_text(&[
        "INV-001,Apples,Produce,100,kg,2024-01-01,30,Refrigerated",
        ",Bread,Bakery,50,loaves,2024-01-02,7,Dry",
        "bad,row,only,three",
    ]);
    let parsed = parse_products(&text, RowErrorPolicy::Collect).unwrap();
    let batch = to_batch(&parsed.records);

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.uids(), ["INV-001", ""]);
    assert_eq!(batch.names(), ["Apples", "Bread"]);
    assert_eq!(batch.categories(), ["Produce", "Bakery"]);
    assert_eq!(batch.quantities(), [100, 50]);
    assert_eq!(batch.units(), ["kg", "loaves"]);
    assert_eq!(batch.production_timestamps(), [1_704_067_200, 1_704_153_600]);
    assert_eq!(batch.shelf_life_days(), [30, 7]);
    assert_eq!(batch.storage_requirements(), ["Refrigerated", "Dry"]);
}

#[test]
fn position_i_describes_record_i_in_every_column() {
    let rows: Vec<String> = (0..40)
        .map(|i| format!("U{i},N{i},C{i},{i},unit{i},2024-01-01,{},S{i}", i * 2))
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let records = parse_products(&csv_text(&refs), RowErrorPolicy::Abort)
        .unwrap()
        .records;

    let batch = BatchPayload::from(records.as_slice());
    for (i, record) in records.iter().enumerate() {
        assert_eq!(batch.uids()[i], record.uid);
        assert_eq!(batch.names()[i], record.name);
        assert_eq!(batch.categories()[i], record.category);
        assert_eq!(batch.quantities()[i], record.quantity);
        assert_eq!(batch.units()[i], record.unit);
        assert_eq!(batch.production_timestamps()[i], record.production_timestamp);
        assert_eq!(batch.shelf_life_days()[i], record.shelf_life_days);
        assert_eq!(batch.storage_requirements()[i], record.storage_requirements);
    }

    let args = batch.into_call_args();
    assert_eq!(args.len(), 8);
    assert!(args.iter().all(|a| a.as_array().map(Vec::len) == Some(40)));
}

#[test]
fn batch_serializes_with_ledger_field_names() {
    let parsed = parse_products(
        &csv_text(&["A,Apples,Produce,1,kg,2024-01-01,3,Dry"]),
        RowErrorPolicy::Collect,
    )
    .unwrap();
    let json = serde_json::to_value(to_batch(&parsed.records)).unwrap();
    assert_eq!(json["productionTimestamps"], serde_json::json!([1_704_067_200i64]));
    assert_eq!(json["storageRequirements"], serde_json::json!(["Dry"]));
}
