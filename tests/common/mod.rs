// tests/common/mod.rs
//
// Shared in-memory ObjectClient used by the integration tests.

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

use s3util::{ListPage, ObjectClient, PutOptions};

/// In-memory mock transport.
///
/// Objects keep insertion order so listing tests can assert the stream
/// preserves exactly the order the service returned. `page_size` controls
/// how many keys one `list_page` call yields; `honor_prefix` toggles the
/// server-side prefix push-down so the client-side filter can be tested
/// in isolation.
pub struct MockClient {
    bucket: String,
    page_size: usize,
    honor_prefix: bool,
    objects: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockClient {
    pub fn new(bucket: &str, page_size: usize) -> Self {
        Self {
            bucket: bucket.to_string(),
            page_size,
            honor_prefix: true,
            objects: Mutex::new(Vec::new()),
        }
    }

    pub fn ignoring_prefix(mut self) -> Self {
        self.honor_prefix = false;
        self
    }

    pub fn with_object(self, key: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(key, body);
        self
    }

    pub fn insert(&self, key: &str, body: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), body.into()));
    }

    pub fn body_of(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, body)| body.clone())
    }

    fn check_bucket(&self, bucket: &str) -> Result<()> {
        if bucket != self.bucket {
            bail!("NoSuchBucket: {bucket}");
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectClient for MockClient {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<bool> {
        self.check_bucket(bucket)?;
        Ok(self.body_of(key).is_some())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.check_bucket(bucket)?;
        match self.body_of(key) {
            Some(body) => Ok(Bytes::from(body)),
            None => bail!("NoSuchKey: {key}"),
        }
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<&str>,
    ) -> Result<ListPage> {
        self.check_bucket(bucket)?;
        let objects = self.objects.lock().unwrap();
        let matching: Vec<&String> = objects
            .iter()
            .map(|(k, _)| k)
            .filter(|k| !self.honor_prefix || k.starts_with(prefix))
            .collect();

        let start: usize = token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (start + self.page_size).min(matching.len());
        let keys = matching[start..end].iter().map(|k| k.to_string()).collect();
        let next_token = (end < matching.len()).then(|| end.to_string());
        Ok(ListPage { keys, next_token })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        _opts: &PutOptions,
    ) -> Result<()> {
        self.check_bucket(bucket)?;
        self.insert(key, data.to_vec());
        Ok(())
    }
}

/// Gzip a byte slice, for building `.gz` inventory data files.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
