//! Per-request context handed to route handlers

use hyper::header::{HeaderName, HeaderValue};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method};
use std::net::SocketAddr;

use super::form::decode_path;
use super::params::{validate_params, Params};
use crate::error::Result;

/// Request information a handler can read, plus the headers it wants on the
/// response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    path: String,
    query: Option<String>,
    remote_addr: Option<SocketAddr>,
    headers: HeaderMap,
    params: Params,
    response_headers: HeaderMap,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            remote_addr: None,
            headers: HeaderMap::new(),
            params: Params::new(),
            response_headers: HeaderMap::new(),
        }
    }

    pub(crate) fn from_parts(parts: &Parts, params: Params, remote_addr: Option<SocketAddr>) -> Self {
        Self {
            method: parts.method.clone(),
            path: decode_path(parts.uri.path()).into_owned(),
            query: parts.uri.query().map(ToString::to_string),
            remote_addr,
            headers: parts.headers.clone(),
            params,
            response_headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Percent-decoded request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub const fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// First value of a query/form parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.first(name)
    }

    /// Fail with `MissingParameter` unless every key has a non-empty value
    pub fn validate<I>(&self, required: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        validate_params(required, &self.params)
    }

    /// Set a header on the outgoing response, replacing any earlier value
    pub fn set_response_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    pub(crate) fn into_response_headers(self) -> HeaderMap {
        self.response_headers
    }
}
