//! Request dispatch module
//!
//! Turns an HTTP request into a routing call and the routing outcome back
//! into an HTTP response.

use crate::config::{AppState, Config};
use crate::http::{self, CachePolicy};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{EdgeRouter, Routed};
use crate::store::AssetStore;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating what routing and response building need
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: *req.method() == Method::HEAD,
            if_none_match: req
                .headers()
                .get("if-none-match")
                .and_then(|v| v.to_str().ok()),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (response, served) = respond(&req, &state.router, &state.config).await;

    if state.access_log_enabled() {
        log_access(&req, &response, served, peer_addr, started, &state.config);
    }

    Ok(response)
}

/// Build the response for one request
///
/// Also returns the store key that answered, if an asset was served.
pub async fn respond<B, S: AssetStore>(
    req: &Request<B>,
    router: &EdgeRouter<S>,
    config: &Config,
) -> (Response<Full<Bytes>>, Option<String>) {
    let (mut response, served) = dispatch(req, router, config).await;

    if let Ok(value) = HeaderValue::from_str(&config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    (response, served)
}

async fn dispatch<B, S: AssetStore>(
    req: &Request<B>,
    router: &EdgeRouter<S>,
    config: &Config,
) -> (Response<Full<Bytes>>, Option<String>) {
    // 1. Method
    if let Some(resp) = check_http_method(req.method(), config.http.enable_cors) {
        return (resp, None);
    }

    // 2. Body size
    if let Some(resp) = check_body_size(req, config.http.max_body_size) {
        return (resp, None);
    }

    logger::log_headers_count(req.headers().len(), config.logging.show_headers);

    let ctx = RequestContext::from_request(req);

    // 3. Health checks, ahead of routing
    let health = &config.health;
    if health.enabled && (ctx.path == health.liveness_path || ctx.path == health.readiness_path)
    {
        return (http::build_health_response("ok"), None);
    }

    // 4. Edge routing
    match router.handle(ctx.path, ctx.query).await {
        Routed::Redirect { location } => (http::build_redirect_response(&location), None),
        Routed::Asset {
            path,
            asset,
            fallback,
        } => {
            let policy = if fallback {
                CachePolicy::NoCache
            } else {
                CachePolicy::Public(config.http.cache_max_age)
            };
            let response =
                http::build_asset_response(&asset, ctx.if_none_match, policy, ctx.is_head);
            (response, Some(path))
        }
    }
}

/// Non-GET/HEAD methods never reach the router
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };

    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    served: Option<String>,
    peer_addr: SocketAddr,
    started: Instant,
    config: &Config,
) {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.served = served;
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &config.logging.access_log_format);
}
