//! Request dispatch
//!
//! Entry point for every request on the application listener: parameter parsing,
//! route lookup, handler invocation and the envelope response.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Request, Response, Version};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::context::RequestContext;
use super::form;
use super::params::Params;
use crate::config::Config;
use crate::envelope::{self, empty_body, CODE_PARSE_FORM, CODE_ROUTE_NOT_FOUND};
use crate::error::{Error, FormError};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::Registry;

/// Dispatcher settings taken from the `http` and `logging` config sections
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub max_body_size: u64,
    pub server_name: String,
    pub access_log: bool,
    pub access_log_format: String,
}

impl From<&Config> for DispatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_body_size: config.http.max_body_size,
            server_name: config.http.server_name.clone(),
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Result of one dispatch, before it becomes an HTTP response
struct Dispatched {
    code: i64,
    /// `None` when the envelope could not be encoded
    payload: Option<Vec<u8>>,
    headers: HeaderMap,
}

#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_options(registry, DispatchOptions::default())
    }

    pub const fn with_options(registry: Arc<Registry>, options: DispatchOptions) -> Self {
        Self { registry, options }
    }

    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub const fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Dispatch one request and wrap the outcome in an envelope.
    ///
    /// Never fails: parse errors and unknown routes become `-1` / `-4`
    /// envelopes, and a reply that cannot be encoded leaves the body empty.
    pub async fn dispatch<B>(
        &self,
        req: Request<B>,
        remote_addr: Option<SocketAddr>,
    ) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        logger::log_request(remote_addr, &parts.method, &parts.uri);

        let dispatched = self.resolve(&parts, body, remote_addr).await;
        let code = dispatched.code;
        let body_bytes = dispatched.payload.as_ref().map_or(0, Vec::len);
        let response = http::build_envelope_response(
            dispatched.payload,
            dispatched.headers,
            &self.options.server_name,
        );

        if self.options.access_log {
            self.log_access(&parts, remote_addr, code, body_bytes, started);
        }
        response
    }

    async fn resolve<B>(
        &self,
        parts: &Parts,
        body: B,
        remote_addr: Option<SocketAddr>,
    ) -> Dispatched
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let params = match self.parse_params(parts, body).await {
            Ok(params) => params,
            Err(e) => {
                logger::log_parse_form_failed(&parts.uri, &e);
                return failure(CODE_PARSE_FORM, &Error::from(e));
            }
        };

        let path = form::decode_path(parts.uri.path());
        let Some(binding) = self.registry.lookup(&path, &parts.method) else {
            logger::log_route_not_found(&path, &parts.method);
            let err = Error::RouteNotFound {
                path: path.to_string(),
                method: parts.method.clone(),
            };
            return failure(CODE_ROUTE_NOT_FOUND, &err);
        };

        let mut ctx = RequestContext::from_parts(parts, params, remote_addr);
        let (code, encoded) = binding.respond(&mut ctx);
        let payload = match encoded {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                logger::log_respond_failed(&parts.uri, &e);
                None
            }
        };

        Dispatched {
            code,
            payload,
            headers: ctx.into_response_headers(),
        }
    }

    /// Form body values (if any) first, then query values
    async fn parse_params<B>(&self, parts: &Parts, body: B) -> Result<Params, FormError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let mut params = Params::new();

        if form::has_form_body(&parts.method, &parts.headers)? {
            let raw = form::read_body(body, self.options.max_body_size).await?;
            form::parse_urlencoded(&raw, &mut params)?;
        }

        if let Some(query) = parts.uri.query() {
            form::parse_urlencoded(query.as_bytes(), &mut params)?;
        }

        Ok(params)
    }

    fn log_access(
        &self,
        parts: &Parts,
        remote_addr: Option<SocketAddr>,
        code: i64,
        body_bytes: usize,
        started: Instant,
    ) {
        let remote = remote_addr.map_or_else(|| "-".to_string(), |a| a.ip().to_string());
        let mut entry = AccessLogEntry::new(
            remote,
            parts.method.to_string(),
            parts.uri.path().to_string(),
        );
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.code = code;
        entry.body_bytes = body_bytes;
        entry.referer = header_string(&parts.headers, "referer");
        entry.user_agent = header_string(&parts.headers, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        logger::log_access(&entry, &self.options.access_log_format);
    }
}

/// Envelope the dispatcher produces itself, always with an empty object body
fn failure(code: i64, err: &Error) -> Dispatched {
    let payload = match envelope::encode(code, &err.to_string(), &empty_body()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            logger::log_error(&format!("Failed to encode {code} envelope: {e}"));
            None
        }
    };
    Dispatched {
        code,
        payload,
        headers: HeaderMap::new(),
    }
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
