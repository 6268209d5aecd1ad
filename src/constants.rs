// src/constants.rs
//
// Centralized constants for s3util to avoid hardcoded values throughout the codebase

/// URI scheme prefix for all object locators handled by this crate
pub const S3_SCHEME: &str = "s3://";

/// Region fallback used when building public virtual-hosted HTTPS URLs
pub const DEFAULT_REGION: &str = "us-east-1";

/// Region fallback used by the signing engine when no slot resolves
pub const DEFAULT_SIGNING_REGION: &str = "eu-central-1";

/// Service name bound into the signing scope
pub const SIGNING_SERVICE: &str = "s3";

/// SigV4 algorithm identifier placed in the Authorization header
pub const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Payload-hash sentinel: bodies are never buffered for signing
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Filename suffix that identifies an inventory manifest object
pub const MANIFEST_SUFFIX: &str = "manifest.json";

/// Timestamp format used by inventory report date columns
pub const INVENTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Default schema column driving the inventory date-window filter
pub const DEFAULT_DATETIME_KEY: &str = "LastModifiedDate";

/// Emit a progress log line every N raw inventory records scanned
pub const SCAN_LOG_INTERVAL: u64 = 100_000;

// ---------------------------------------------------------------------------
// Environment slots. Each credential/region lookup tries an override slot
// first, then the conventional AWS slot.
// ---------------------------------------------------------------------------

/// Override slot for the signing access key
pub const ENV_BUCKET_ACCESS_KEY: &str = "AWS_BUCKET_ACCESS_KEY_ID";

/// Default slot for the signing access key
pub const ENV_ACCESS_KEY: &str = "AWS_ACCESS_KEY_ID";

/// Override slot for the signing secret key
pub const ENV_BUCKET_SECRET_KEY: &str = "AWS_BUCKET_SECRET_ACCESS_KEY";

/// Default slot for the signing secret key
pub const ENV_SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Override slot for the signing region
pub const ENV_BUCKET_REGION: &str = "AWS_BUCKET_REGION";

/// Default slot for the region (shared with the SDK client)
pub const ENV_REGION: &str = "AWS_REGION";

/// Secondary default slot for the public-URL region
pub const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// Ambient session token; only attached when the override key slot is unused
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
