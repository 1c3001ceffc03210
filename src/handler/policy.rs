//! Response policy module
//!
//! Hooks layered over the static file handler: the Content-Type lookup and a
//! final pass over the outgoing headers.

use crate::http::mime;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL};
use std::path::Path;

pub const MANIFEST_CONTENT_TYPE: &str = "application/manifest+json";

/// Capabilities a handler policy may override
pub trait ResponsePolicy: Send + Sync {
    /// Content-Type for a file about to be served
    fn content_type(&self, path: &Path) -> &'static str {
        mime::content_type_for_path(path)
    }

    /// Called on every response after the base headers are set, before it is sent
    fn finish_headers(&self, _headers: &mut HeaderMap) {}
}

/// Plain static file behavior
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPolicy;

impl ResponsePolicy for DefaultPolicy {}

/// Headers and MIME types a PWA needs when served locally
#[derive(Debug, Default, Clone, Copy)]
pub struct PwaPolicy;

impl ResponsePolicy for PwaPolicy {
    fn content_type(&self, path: &Path) -> &'static str {
        if is_manifest(path) {
            MANIFEST_CONTENT_TYPE
        } else {
            mime::content_type_for_path(path)
        }
    }

    fn finish_headers(&self, headers: &mut HeaderMap) {
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(
            HeaderName::from_static("service-worker-allowed"),
            HeaderValue::from_static("/"),
        );
    }
}

/// `*.webmanifest` or a file named exactly `manifest.json`
fn is_manifest(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "webmanifest")
        || path.file_name().is_some_and(|name| name == "manifest.json")
}
