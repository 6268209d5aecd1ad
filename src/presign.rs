// src/presign.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! SigV4 signing engine.
//!
//! Produces a time-scoped Authorization header set for one storage request
//! entirely offline; no auth endpoint is contacted. The payload is never
//! buffered for signing, so the content hash is the `UNSIGNED-PAYLOAD`
//! sentinel. Two signatures computed at different seconds legitimately
//! differ; the deterministic core takes an explicit timestamp so callers
//! and tests can pin it.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::{SigningCredentials, resolve_credentials, resolve_signing_region};
use crate::constants::{SIGNING_ALGORITHM, SIGNING_SERVICE, UNSIGNED_PAYLOAD};
use crate::uri::{S3Uri, parse_s3_uri};

type HmacSha256 = Hmac<Sha256>;

/// Caller flags for one signing request.
#[derive(Debug, Clone)]
pub struct PresignOptions {
    /// Explicit signing region; overrides every environment slot.
    pub region: Option<String>,
    /// HTTP method the signature covers.
    pub method: String,
    /// Request a `public-read` ACL header.
    pub public: bool,
    /// Bill the request issuer rather than the bucket owner.
    pub requester_pays: bool,
    /// Attached to the output headers after signing; not signed.
    pub content_type: Option<String>,
}

impl Default for PresignOptions {
    fn default() -> Self {
        Self {
            region: None,
            method: "GET".to_string(),
            public: false,
            requester_pays: false,
            content_type: None,
        }
    }
}

/// Output artifact of the signing engine.
///
/// `headers: None` signals an unsigned request: no credentials resolved,
/// and the caller should attempt a plain anonymous fetch of `url`.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub url: String,
    pub headers: Option<BTreeMap<String, String>>,
}

fn hmac_sha256(key: &[u8], msg: &str) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC key of any length");
    mac.update(msg.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// 4-stage key derivation chain binding the secret to date/region/service.
fn signature_key(secret_key: &str, datestamp: &str, region: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), datestamp);
    let k_region = hmac_sha256(&k_date, region);
    let k_service = hmac_sha256(&k_region, SIGNING_SERVICE);
    hmac_sha256(&k_service, "aws4_request")
}

/// Percent-encode an object key for the canonical URI. Unreserved
/// characters and the `/` separators pass through unchanged.
fn uri_encode_path(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Deterministic signing core: given fixed credentials, region, flags, and
/// timestamp, the output is byte-identical across invocations.
pub fn sign_request(
    parts: &S3Uri,
    creds: &SigningCredentials,
    region: &str,
    opts: &PresignOptions,
    timestamp: DateTime<Utc>,
) -> SignedRequest {
    let host = format!("{}.{}.amazonaws.com", parts.bucket, SIGNING_SERVICE);
    let canonical_uri = format!("/{}", uri_encode_path(&parts.key));
    let canonical_querystring = "";

    let amzdate = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    // Date without time, used in the credential scope.
    let datestamp = timestamp.format("%Y%m%d").to_string();

    // BTreeMap keeps headers sorted lexicographically by name, which is
    // exactly the canonical ordering.
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    headers.insert("host".to_string(), host.clone());
    headers.insert("x-amz-content-sha256".to_string(), UNSIGNED_PAYLOAD.to_string());
    headers.insert("x-amz-date".to_string(), amzdate.clone());
    if opts.requester_pays {
        headers.insert("x-amz-request-payer".to_string(), "requester".to_string());
    }
    if opts.public {
        headers.insert("x-amz-acl".to_string(), "public-read".to_string());
    }
    if let Some(token) = &creds.session_token {
        headers.insert("x-amz-security-token".to_string(), token.clone());
    }

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = headers
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        opts.method,
        canonical_uri,
        canonical_querystring,
        canonical_headers,
        signed_headers,
        UNSIGNED_PAYLOAD
    );

    let credential_scope = format!("{datestamp}/{region}/{SIGNING_SERVICE}/aws4_request");
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        SIGNING_ALGORITHM,
        amzdate,
        credential_scope,
        sha256_hex(&canonical_request)
    );

    let signing_key = signature_key(&creds.secret_key, &datestamp, region);
    let signature = hex::encode(hmac_sha256(&signing_key, &string_to_sign));

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        SIGNING_ALGORITHM, creds.access_key, credential_scope, signed_headers, signature
    );
    headers.insert("Authorization".to_string(), authorization);
    // Appended after signing: content-type is not part of the signed set.
    if let Some(ct) = &opts.content_type {
        headers.insert("content-type".to_string(), ct.clone());
    }

    SignedRequest {
        url: format!("https://{host}{canonical_uri}"),
        headers: Some(headers),
    }
}

/// Sign a request for `uri` with ambient credentials at the current time.
///
/// When neither credential slot pair resolves, the request comes back
/// unsigned (`headers: None`, `url` unchanged) rather than failing;
/// callers should attempt a public fetch.
pub fn presign_url(uri: &str, opts: &PresignOptions) -> Result<SignedRequest> {
    let parts = parse_s3_uri(uri)?;

    let Some(creds) = resolve_credentials() else {
        debug!("no signing credentials resolved, returning {} unsigned", uri);
        return Ok(SignedRequest {
            url: uri.to_string(),
            headers: None,
        });
    };

    let region = resolve_signing_region(opts.region.as_deref());
    Ok(sign_request(&parts, &creds, &region, opts, Utc::now()))
}
