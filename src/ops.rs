// src/ops.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Convenience object operations over an [`ObjectClient`]: existence
//! checks, whole-object reads (with transparent gunzip for `.gz` keys),
//! and local-file upload/download staging.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use flate2::read::GzDecoder;
use tracing::debug;

use crate::client::{ObjectClient, PutOptions};
use crate::uri::parse_s3_uri;

/// Check whether the object behind `uri` exists.
///
/// Object absence is folded into `Ok(false)`; every other transport error
/// propagates.
pub async fn exists(client: &dyn ObjectClient, uri: &str) -> Result<bool> {
    let parts = parse_s3_uri(uri)?;
    client.head_object(&parts.bucket, &parts.key).await
}

/// Fetch `bucket`/`key` fully, gunzipping keys with a `.gz` extension,
/// and decode as UTF-8.
pub async fn read_object(client: &dyn ObjectClient, bucket: &str, key: &str) -> Result<String> {
    let body = client.get_object(bucket, key).await?;
    let body = if key.ends_with(".gz") {
        let mut decoder = GzDecoder::new(&body[..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .with_context(|| format!("gunzip of s3://{bucket}/{key} failed"))?;
        out
    } else {
        body.to_vec()
    };
    String::from_utf8(body).with_context(|| format!("s3://{bucket}/{key} is not valid UTF-8"))
}

/// Read the object behind `uri` as a UTF-8 string.
pub async fn read(client: &dyn ObjectClient, uri: &str) -> Result<String> {
    let parts = parse_s3_uri(uri)?;
    if parts.key.is_empty() {
        bail!("Cannot read: URI {uri} has no object key");
    }
    read_object(client, &parts.bucket, &parts.key).await
}

/// Read the object behind `uri` as a JSON document.
pub async fn read_json(client: &dyn ObjectClient, uri: &str) -> Result<serde_json::Value> {
    let body = read(client, uri).await?;
    serde_json::from_str(&body).with_context(|| format!("{uri} is not valid JSON"))
}

/// Upload a local file to `uri` and return the canonical `s3://` locator
/// of the stored object.
pub async fn upload(
    client: &dyn ObjectClient,
    path: &Path,
    uri: &str,
    opts: &PutOptions,
) -> Result<String> {
    let parts = parse_s3_uri(uri)?;
    if parts.key.is_empty() {
        bail!("Cannot upload: URI {uri} has no object key");
    }
    debug!("uploading {} to {}", path.display(), uri);

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("read local file {}", path.display()))?;
    client
        .put_object(&parts.bucket, &parts.key, Bytes::from(data), opts)
        .await?;
    Ok(parts.to_uri())
}

/// Download the object behind `uri` into `out_dir`, keeping its filename.
/// `out_dir` is created when it does not exist. Returns the written path.
pub async fn download(client: &dyn ObjectClient, uri: &str, out_dir: &Path) -> Result<PathBuf> {
    let parts = parse_s3_uri(uri)?;
    if parts.filename.is_empty() {
        bail!("Cannot download: URI {uri} has no filename");
    }
    let out_path = out_dir.join(&parts.filename);
    debug!("downloading {} as {}", uri, out_path.display());

    if !out_dir.as_os_str().is_empty() {
        tokio::fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("create output directory {}", out_dir.display()))?;
    }

    let body = client.get_object(&parts.bucket, &parts.key).await?;
    tokio::fs::write(&out_path, body)
        .await
        .with_context(|| format!("write {}", out_path.display()))?;
    Ok(out_path)
}
