// src/list.rs
//
//! Lazy, paginated key listing.
//!
//! Wraps the one-page transport call into a pull-based stream that pages
//! transparently: each key is yielded as discovered, the continuation
//! token is forwarded until a page omits one, and the stream is safe to
//! drop mid-flight. Order is exactly the service order; nothing is
//! re-sorted, skipped, or duplicated.

use std::pin::Pin;

use anyhow::Result;
use futures::stream::Stream;

use crate::client::ObjectClient;
use crate::uri::S3Uri;

/// Stream every key under `uri` (bucket + optional key prefix) whose name
/// ends with `suffix`.
///
/// The prefix filter is pushed down to the service as a listing
/// optimization and re-applied client-side; suffix matching is never
/// server-side. A fresh call re-lists from page one.
pub fn find_objects<'a>(
    client: &'a dyn ObjectClient,
    uri: &'a S3Uri,
    suffix: &'a str,
) -> Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>> {
    Box::pin(async_stream::stream! {
        let mut token: Option<String> = None;
        loop {
            let page = match client.list_page(&uri.bucket, &uri.key, token.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            for key in page.keys {
                if key.starts_with(&uri.key) && key.ends_with(suffix) {
                    yield Ok(key);
                }
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => return,
            }
        }
    })
}
