// src/inventory.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Inventory report scanner.
//!
//! Locates the most recent manifest for a date-partitioned inventory
//! report, parses its schema, and streams every referenced data file one
//! record at a time. Data files are never loaded as a whole collection;
//! dropping the stream abandons the scan.
//!
//! Two failure policies intentionally differ here: a missing manifest is
//! an expected steady state and produces an empty stream (plus a warning
//! log), while a malformed timestamp aborts the scan with a
//! [`S3UtilError::Format`] error, since it signals a schema or version
//! mismatch in the report itself.

use std::collections::HashMap;
use std::pin::Pin;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::ObjectClient;
use crate::constants::{
    DEFAULT_DATETIME_KEY, INVENTORY_TIMESTAMP_FORMAT, MANIFEST_SUFFIX, SCAN_LOG_INTERVAL,
};
use crate::errors::S3UtilError;
use crate::list::find_objects;
use crate::ops::read_object;
use crate::uri::S3Uri;

/// Inventory manifest document, parsed once and read-only afterward.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Comma-joined, order-significant column list.
    #[serde(rename = "fileSchema")]
    pub file_schema: String,
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestFile {
    pub key: String,
}

impl Manifest {
    /// Schema columns, trimmed of surrounding whitespace.
    pub fn columns(&self) -> Vec<String> {
        self.file_schema
            .split(',')
            .map(|col| col.trim().to_string())
            .collect()
    }
}

/// One inventory line zipped against the schema columns, plus a derived
/// `url` field when the schema carries both `Bucket` and `Key`.
pub type InventoryRecord = HashMap<String, String>;

/// Filters applied while scanning an inventory report.
#[derive(Debug, Clone)]
pub struct InventoryQuery {
    /// Keep only records whose `Key` starts with this prefix.
    pub prefix: Option<String>,
    /// Keep only records whose `Key` ends with this suffix.
    pub suffix: Option<String>,
    /// Inclusive lower bound on the driving date column.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the driving date column.
    pub end_date: Option<NaiveDate>,
    /// Schema column driving the date window.
    pub datetime_key: String,
}

impl Default for InventoryQuery {
    fn default() -> Self {
        Self {
            prefix: None,
            suffix: None,
            start_date: None,
            end_date: None,
            datetime_key: DEFAULT_DATETIME_KEY.to_string(),
        }
    }
}

/// Probe each date partition under `uri` for exactly one key ending in
/// the manifest filename; the first date with exactly one match wins.
///
/// `Ok(None)` means no partition qualified — for the scanner that is an
/// empty result, not an error.
pub async fn latest_manifest_key(
    client: &dyn ObjectClient,
    uri: &S3Uri,
    dates: &[NaiveDate],
) -> Result<Option<String>> {
    for date in dates {
        let partition = if uri.key.is_empty() {
            date.format("%Y-%m-%d").to_string()
        } else {
            format!("{}/{}", uri.key, date.format("%Y-%m-%d"))
        };
        let probe = S3Uri {
            bucket: uri.bucket.clone(),
            key: partition,
            filename: String::new(),
        };

        let mut matches = Vec::new();
        let mut stream = find_objects(client, &probe, MANIFEST_SUFFIX);
        while let Some(key) = stream.next().await {
            matches.push(key?);
        }
        drop(stream);

        if matches.len() == 1 {
            return Ok(Some(matches.remove(0)));
        }
    }
    Ok(None)
}

fn parse_record(columns: &[String], line: &str) -> InventoryRecord {
    // Inventory data lines are double-quote wrapped CSV; values carry no
    // embedded quotes, so stripping them wholesale is safe.
    let cleaned = line.replace('"', "");
    columns
        .iter()
        .cloned()
        .zip(cleaned.split(',').map(str::to_string))
        .collect()
}

fn record_date(record: &InventoryRecord, datetime_key: &str) -> Result<NaiveDate> {
    let raw = record.get(datetime_key).ok_or_else(|| S3UtilError::Format {
        column: datetime_key.to_string(),
        value: "<missing>".to_string(),
    })?;
    let parsed = NaiveDateTime::parse_from_str(raw, INVENTORY_TIMESTAMP_FORMAT).map_err(|_| {
        S3UtilError::Format {
            column: datetime_key.to_string(),
            value: raw.clone(),
        }
    })?;
    Ok(parsed.date())
}

/// Stream matching records from the latest inventory report under `uri`.
///
/// Probes today's date partition, then yesterday's. When neither yields
/// exactly one manifest the stream is empty. Records lacking a `Key`
/// column are dropped; a malformed timestamp in the driving date column
/// aborts the whole scan.
pub fn latest_inventory<'a>(
    client: &'a dyn ObjectClient,
    uri: &'a S3Uri,
    query: InventoryQuery,
) -> Pin<Box<dyn Stream<Item = Result<InventoryRecord>> + Send + 'a>> {
    Box::pin(async_stream::stream! {
        let today = Utc::now().date_naive();
        let dates = [today, today - Duration::days(1)];

        let manifest_key = match latest_manifest_key(client, uri, &dates).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                warn!("no inventory manifest found under {}", uri);
                return;
            }
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        info!("scanning latest inventory from {}", uri);
        let manifest = match read_object(client, &uri.bucket, &manifest_key).await
            .and_then(|body| {
                serde_json::from_str::<Manifest>(&body).context("parse inventory manifest")
            })
        {
            Ok(manifest) => manifest,
            Err(e) => {
                yield Err(e);
                return;
            }
        };
        let columns = manifest.columns();
        let derive_url = columns.iter().any(|c| c == "Bucket")
            && columns.iter().any(|c| c == "Key");

        let mut counter: u64 = 0;
        for file in &manifest.files {
            let body = match read_object(client, &uri.bucket, &file.key).await {
                Ok(body) => body,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            for line in body.split('\n') {
                counter += 1;
                if counter % SCAN_LOG_INTERVAL == 0 {
                    debug!("scanned {} inventory records", counter);
                }
                if line.trim().is_empty() {
                    continue;
                }

                let mut record = parse_record(&columns, line);
                if !record.contains_key("Key") {
                    continue;
                }

                let date = match record_date(&record, &query.datetime_key) {
                    Ok(date) => date,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                if query.start_date.is_some_and(|start| date < start)
                    || query.end_date.is_some_and(|end| date > end)
                {
                    continue;
                }
                if let Some(prefix) = &query.prefix {
                    if !record["Key"].starts_with(prefix.as_str()) {
                        continue;
                    }
                }
                if let Some(suffix) = &query.suffix {
                    if !record["Key"].ends_with(suffix.as_str()) {
                        continue;
                    }
                }

                if derive_url {
                    if let (Some(bucket), Some(key)) = (record.get("Bucket"), record.get("Key")) {
                        let url = format!("s3://{bucket}/{key}");
                        record.insert("url".to_string(), url);
                    }
                }
                yield Ok(record);
            }
        }
    })
}
