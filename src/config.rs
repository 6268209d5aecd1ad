// src/config.rs
//
//! Ambient configuration lookup.
//!
//! Credentials and regions resolve through an ordered pair of environment
//! slots: an override slot first, then the conventional AWS slot. Absence
//! of both credential slots is a valid state (the signing engine falls back
//! to an unsigned request), not a configuration error.

use std::env;

use crate::constants::{
    DEFAULT_REGION, DEFAULT_SIGNING_REGION, ENV_ACCESS_KEY, ENV_BUCKET_ACCESS_KEY,
    ENV_BUCKET_REGION, ENV_BUCKET_SECRET_KEY, ENV_DEFAULT_REGION, ENV_REGION, ENV_SECRET_KEY,
    ENV_SESSION_TOKEN,
};

/// Return the first non-empty value among the given environment slots.
pub fn env_fallback(slots: &[&str]) -> Option<String> {
    slots
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.is_empty()))
}

/// Credentials resolved for one signing request.
#[derive(Debug, Clone)]
pub struct SigningCredentials {
    pub access_key: String,
    pub secret_key: String,
    /// Attached only when the ambient session token exists and the
    /// override access-key slot was not used. Explicit override
    /// credentials never carry an implicit session token.
    pub session_token: Option<String>,
}

/// Resolve signing credentials from the ambient environment.
///
/// Returns `None` unless both an access key and a secret key resolve from
/// their slot pairs; callers treat `None` as "attempt an anonymous fetch".
pub fn resolve_credentials() -> Option<SigningCredentials> {
    let access_key = env_fallback(&[ENV_BUCKET_ACCESS_KEY, ENV_ACCESS_KEY])?;
    let secret_key = env_fallback(&[ENV_BUCKET_SECRET_KEY, ENV_SECRET_KEY])?;

    let override_slot_used = env::var(ENV_BUCKET_ACCESS_KEY).is_ok();
    let session_token = if override_slot_used {
        None
    } else {
        env_fallback(&[ENV_SESSION_TOKEN])
    };

    Some(SigningCredentials {
        access_key,
        secret_key,
        session_token,
    })
}

/// Region for the signing scope: explicit parameter, then the override
/// slot, then `AWS_REGION`, then the signing fallback constant.
pub fn resolve_signing_region(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| env_fallback(&[ENV_BUCKET_REGION, ENV_REGION]))
        .unwrap_or_else(|| DEFAULT_SIGNING_REGION.to_string())
}

/// Region for public virtual-hosted URLs: explicit parameter, then
/// `AWS_REGION`, then `AWS_DEFAULT_REGION`, then the crate default.
pub fn resolve_public_region(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| env_fallback(&[ENV_REGION, ENV_DEFAULT_REGION]))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment mutation is process-wide; each test uses slot names no
    // other test touches so they can run in parallel.

    #[test]
    fn test_env_fallback_prefers_first_slot() {
        unsafe {
            env::set_var("S3UTIL_TEST_SLOT_A", "override");
            env::set_var("S3UTIL_TEST_SLOT_B", "default");
        }
        assert_eq!(
            env_fallback(&["S3UTIL_TEST_SLOT_A", "S3UTIL_TEST_SLOT_B"]),
            Some("override".to_string())
        );
    }

    #[test]
    fn test_env_fallback_skips_empty_and_missing() {
        unsafe {
            env::set_var("S3UTIL_TEST_SLOT_EMPTY", "");
            env::set_var("S3UTIL_TEST_SLOT_SET", "value");
        }
        assert_eq!(
            env_fallback(&[
                "S3UTIL_TEST_SLOT_MISSING",
                "S3UTIL_TEST_SLOT_EMPTY",
                "S3UTIL_TEST_SLOT_SET",
            ]),
            Some("value".to_string())
        );
    }

    #[test]
    fn test_env_fallback_none_when_nothing_set() {
        assert_eq!(env_fallback(&["S3UTIL_TEST_SLOT_UNSET"]), None);
    }

    #[test]
    fn test_region_fallback_constants() {
        assert_eq!(resolve_signing_region(Some("ap-south-1")), "ap-south-1");
        assert_eq!(resolve_public_region(Some("us-west-2")), "us-west-2");
    }
}
