// Integration tests for the inventory scanner.

mod common;

use chrono::{Duration, NaiveDate, Utc};
use common::{MockClient, gzip};
use futures_util::StreamExt;
use s3util::{InventoryQuery, S3UtilError, latest_inventory, latest_manifest_key, parse_s3_uri};

const MANIFEST: &str = r#"{
    "fileSchema": "Bucket, Key, LastModifiedDate",
    "files": [{"key": "inventory/data/part-0.csv.gz"}]
}"#;

const DATA: &str = concat!(
    "\"databucket\",\"logs/a.json\",\"2023-01-01T10:00:00.000000Z\"\n",
    "\"databucket\",\"logs/b.json\",\"2023-06-01T10:00:00.000000Z\"\n",
);

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Mock with a manifest in the partition for `offset_days` before today
/// and one gzipped data file.
fn scanner_fixture(offset_days: i64) -> MockClient {
    let partition = (Utc::now().date_naive() - Duration::days(offset_days)).format("%Y-%m-%d");
    MockClient::new("inv", 1000)
        .with_object(
            &format!("inventory/{partition}/manifest.json"),
            MANIFEST.as_bytes().to_vec(),
        )
        .with_object("inventory/data/part-0.csv.gz", gzip(DATA.as_bytes()))
}

#[tokio::test]
async fn test_scan_yields_all_records_with_urls() {
    let client = scanner_fixture(0);
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();

    let records: Vec<_> = latest_inventory(&client, &uri, InventoryQuery::default())
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Bucket"], "databucket");
    assert_eq!(records[0]["Key"], "logs/a.json");
    assert_eq!(records[0]["url"], "s3://databucket/logs/a.json");
    assert_eq!(records[1]["url"], "s3://databucket/logs/b.json");
}

#[tokio::test]
async fn test_start_date_window_filters_records() {
    let client = scanner_fixture(0);
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();
    let query = InventoryQuery {
        start_date: Some(date("2023-03-01")),
        ..Default::default()
    };

    let records: Vec<_> = latest_inventory(&client, &uri, query)
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Key"], "logs/b.json");
    assert_eq!(records[0]["url"], "s3://databucket/logs/b.json");
}

#[tokio::test]
async fn test_end_date_window_and_key_filters() {
    let client = scanner_fixture(0);
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();

    let query = InventoryQuery {
        end_date: Some(date("2023-03-01")),
        ..Default::default()
    };
    let records: Vec<_> = latest_inventory(&client, &uri, query)
        .map(|r| r.unwrap())
        .collect()
        .await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Key"], "logs/a.json");

    let query = InventoryQuery {
        prefix: Some("logs/b".to_string()),
        suffix: Some(".json".to_string()),
        ..Default::default()
    };
    let records: Vec<_> = latest_inventory(&client, &uri, query)
        .map(|r| r.unwrap())
        .collect()
        .await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Key"], "logs/b.json");
}

#[tokio::test]
async fn test_manifest_date_fallback_to_yesterday() {
    let client = scanner_fixture(1);
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();

    let records: Vec<_> = latest_inventory(&client, &uri, InventoryQuery::default())
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_ambiguous_today_falls_back_to_yesterday() {
    // Two manifest matches today is "not exactly one"; yesterday wins.
    let today = Utc::now().date_naive().format("%Y-%m-%d");
    let client = scanner_fixture(1)
        .with_object(
            &format!("inventory/{today}/run-a/manifest.json"),
            MANIFEST.as_bytes().to_vec(),
        )
        .with_object(
            &format!("inventory/{today}/run-b/manifest.json"),
            MANIFEST.as_bytes().to_vec(),
        );
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let dates = [Utc::now().date_naive(), yesterday];
    let manifest = latest_manifest_key(&client, &uri, &dates).await.unwrap();
    assert_eq!(
        manifest,
        Some(format!(
            "inventory/{}/manifest.json",
            yesterday.format("%Y-%m-%d")
        ))
    );
}

#[tokio::test]
async fn test_no_manifest_means_empty_stream() {
    let client = MockClient::new("inv", 1000);
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();

    let records: Vec<_> = latest_inventory(&client, &uri, InventoryQuery::default())
        .collect()
        .await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_latest_manifest_key_none_when_no_date_matches() {
    let client = MockClient::new("inv", 1000);
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();
    let dates = [date("2023-01-01"), date("2022-12-31")];
    assert_eq!(latest_manifest_key(&client, &uri, &dates).await.unwrap(), None);
}

#[tokio::test]
async fn test_malformed_timestamp_is_fatal() {
    let partition = Utc::now().date_naive().format("%Y-%m-%d");
    let bad_data = "\"databucket\",\"logs/a.json\",\"not-a-timestamp\"\n";
    let client = MockClient::new("inv", 1000)
        .with_object(
            &format!("inventory/{partition}/manifest.json"),
            MANIFEST.as_bytes().to_vec(),
        )
        .with_object("inventory/data/part-0.csv.gz", gzip(bad_data.as_bytes()));
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();

    let mut stream = latest_inventory(&client, &uri, InventoryQuery::default());
    let first = stream.next().await.unwrap();
    let err = first.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<S3UtilError>(),
        Some(S3UtilError::Format { .. })
    ));
    // The scan halts: nothing follows the error.
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_records_without_key_column_are_dropped() {
    let partition = Utc::now().date_naive().format("%Y-%m-%d");
    let manifest = r#"{
        "fileSchema": "Bucket, Key, LastModifiedDate",
        "files": [{"key": "inventory/data/part-0.csv"}]
    }"#;
    // Second line is truncated before the Key column.
    let data = concat!(
        "\"databucket\",\"logs/a.json\",\"2023-01-01T10:00:00.000000Z\"\n",
        "\"databucket\"\n",
    );
    let client = MockClient::new("inv", 1000)
        .with_object(
            &format!("inventory/{partition}/manifest.json"),
            manifest.as_bytes().to_vec(),
        )
        .with_object("inventory/data/part-0.csv", data.as_bytes().to_vec());
    let uri = parse_s3_uri("s3://inv/inventory").unwrap();

    let records: Vec<_> = latest_inventory(&client, &uri, InventoryQuery::default())
        .map(|r| r.unwrap())
        .collect()
        .await;
    assert_eq!(records.len(), 1);
}
