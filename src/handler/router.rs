//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, static file
//! dispatch, the policy's header pass and access logging.

use crate::config::{HttpConfig, LoggingConfig};
use crate::handler::policy::ResponsePolicy;
use crate::handler::static_files::{FileRequest, StaticFiles};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::net::SocketAddr;
use std::time::Instant;

/// Static file handler composed with a response policy
pub struct RequestHandler<P> {
    files: StaticFiles,
    policy: P,
    server_name: Option<HeaderValue>,
    /// Access log format, `None` when access logging is off
    access_log_format: Option<String>,
}

impl<P: ResponsePolicy> RequestHandler<P> {
    pub fn new(files: StaticFiles, policy: P, http: &HttpConfig, logging: &LoggingConfig) -> Self {
        let server_name = HeaderValue::from_str(&http.server_name)
            .map_err(|e| logger::log_warning(&format!("Invalid server name, header omitted: {e}")))
            .ok();

        Self {
            files,
            policy,
            server_name,
            access_log_format: logging
                .access_log
                .then(|| logging.access_log_format.clone()),
        }
    }

    /// Handle one request. Never fails: every outcome is an HTTP response.
    pub async fn handle<B>(&self, req: &Request<B>, peer: Option<SocketAddr>) -> Response<Full<Bytes>> {
        let started = Instant::now();
        let method = req.method();

        let mut response = if *method == Method::GET || *method == Method::HEAD {
            let headers = req.headers();
            let file_req = FileRequest {
                path: req.uri().path(),
                query: req.uri().query(),
                is_head: *method == Method::HEAD,
                if_modified_since: headers.get(IF_MODIFIED_SINCE).and_then(|v| v.to_str().ok()),
                has_if_none_match: headers.contains_key(IF_NONE_MATCH),
                range: headers.get(RANGE).and_then(|v| v.to_str().ok()),
            };
            self.files.serve(&file_req, &self.policy).await
        } else {
            logger::log_warning(&format!("Unsupported method: {method}"));
            http::build_501_response()
        };

        if let Some(name) = &self.server_name {
            response.headers_mut().insert(SERVER, name.clone());
        }
        self.policy.finish_headers(response.headers_mut());

        if let Some(format) = &self.access_log_format {
            let entry = access_entry(req, peer, &response, started);
            logger::log_access(&entry, format);
        }

        response
    }
}

fn access_entry<B>(
    req: &Request<B>,
    peer: Option<SocketAddr>,
    response: &Response<Full<Bytes>>,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let uri = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);

    let mut entry = AccessLogEntry::new(
        peer.map_or_else(|| "-".to_string(), |p| p.ip().to_string()),
        req.method().to_string(),
        uri,
    );
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| *n > 0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
