// src/client.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Storage transport seam.
//!
//! Every component talks to the service through the [`ObjectClient`]
//! trait, so tests run against an in-memory mock and production code runs
//! against [`AwsClient`]. The handle is caller-owned and reentrant; the
//! crate keeps no global client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use std::env;

use crate::constants::{DEFAULT_REGION, ENV_REGION};

/// One page of a paginated listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Keys in the order the service returned them.
    pub keys: Vec<String>,
    /// Opaque cursor for the next page; `None` signals the final page.
    pub next_token: Option<String>,
}

/// Options applied to an upload.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Store the object with a `public-read` ACL.
    pub public: bool,
    pub content_type: Option<String>,
}

/// Minimal transport contract this crate needs from an object store.
///
/// No retry policy lives behind this trait; errors other than object
/// absence propagate unchanged from the underlying SDK.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// HEAD the object. Absence is a normal outcome (`Ok(false)`), every
    /// other service error surfaces as-is.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Fetch the full object body.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes>;

    /// Fetch one page of keys under `prefix`, resuming from `token`.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<&str>,
    ) -> Result<ListPage>;

    /// Store an object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        opts: &PutOptions,
    ) -> Result<()>;
}

/// Production transport backed by the AWS Rust SDK.
#[derive(Debug, Clone)]
pub struct AwsClient {
    inner: aws_sdk_s3::Client,
}

impl AwsClient {
    /// Wrap an already-configured SDK client.
    pub fn new(inner: aws_sdk_s3::Client) -> Self {
        Self { inner }
    }

    /// Build a client from the ambient environment.
    ///
    /// Loads `.env` first so AWS_* vars are available, resolves the region
    /// through `AWS_REGION` → default provider chain → crate default, and
    /// honors `AWS_ENDPOINT_URL` plus path-style addressing so
    /// S3-compatible services (MinIO, Ceph, etc.) work out of the box.
    pub async fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let region = RegionProviderChain::first_try(env::var(ENV_REGION).ok().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(DEFAULT_REGION));

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);
        if let Ok(endpoint) = env::var("AWS_ENDPOINT_URL") {
            if !endpoint.is_empty() {
                loader = loader.endpoint_url(endpoint);
            }
        }
        let cfg = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&cfg)
            .force_path_style(true)
            .build();
        Ok(Self::new(aws_sdk_s3::Client::from_conf(s3_config)))
    }
}

#[async_trait]
impl ObjectClient for AwsClient {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.inner.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(service_err.into())
                }
            }
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let resp = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context("get_object failed")?;
        let data = resp
            .body
            .collect()
            .await
            .context("collect body failed")?
            .into_bytes();
        Ok(data)
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<&str>,
    ) -> Result<ListPage> {
        let mut req = self.inner.list_objects_v2().bucket(bucket).prefix(prefix);
        if let Some(token) = token {
            req = req.continuation_token(token);
        }
        let resp = req.send().await.context("list_objects_v2 failed")?;

        let keys = resp
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(str::to_owned))
            .collect();
        Ok(ListPage {
            keys,
            next_token: resp.next_continuation_token().map(str::to_owned),
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        opts: &PutOptions,
    ) -> Result<()> {
        let mut req = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data));
        if opts.public {
            req = req.acl(ObjectCannedAcl::PublicRead);
        }
        if let Some(ct) = &opts.content_type {
            req = req.content_type(ct);
        }
        req.send().await.context("put_object failed")?;
        Ok(())
    }
}
