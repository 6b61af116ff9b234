//! Route bindings and the handler contract
//!
//! A handler turns a [`RequestContext`] into a [`Reply`]. Replies carry a typed
//! body, so handlers are erased to [`DynHandler`] (which encodes the envelope
//! itself) before they are stored in the registry.

use hyper::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::envelope::{self, empty_body};
use crate::error::Result;
use crate::handler::RequestContext;

/// What a handler hands back: `(body, message, code)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<B> {
    pub body: B,
    pub message: String,
    pub code: i64,
}

impl<B> Reply<B> {
    pub fn new(body: B, message: impl Into<String>, code: i64) -> Self {
        Self {
            body,
            message: message.into(),
            code,
        }
    }

    /// Code 0, empty message
    pub fn ok(body: B) -> Self {
        Self::new(body, String::new(), 0)
    }
}

impl Reply<Value> {
    /// Failure reply with an empty object body
    pub fn error(message: impl Into<String>, code: i64) -> Self {
        Self::new(empty_body(), message, code)
    }
}

/// Request handler bound to a route.
///
/// Implemented for every `Fn(&mut RequestContext) -> Reply<B>` closure, so most
/// routes never name this trait.
pub trait Handler: Send + Sync + 'static {
    type Body: Serialize;

    fn handle(&self, ctx: &mut RequestContext) -> Reply<Self::Body>;
}

impl<F, B> Handler for F
where
    F: Fn(&mut RequestContext) -> Reply<B> + Send + Sync + 'static,
    B: Serialize,
{
    type Body = B;

    fn handle(&self, ctx: &mut RequestContext) -> Reply<B> {
        self(ctx)
    }
}

/// Object-safe view of a [`Handler`]: runs it and encodes the envelope.
///
/// Returns the envelope code together with the encoded bytes so the code is
/// still known when encoding fails.
pub trait DynHandler: Send + Sync {
    fn respond(&self, ctx: &mut RequestContext) -> (i64, Result<Vec<u8>>);
}

impl<H: Handler> DynHandler for H {
    fn respond(&self, ctx: &mut RequestContext) -> (i64, Result<Vec<u8>>) {
        let reply = self.handle(ctx);
        let encoded = envelope::encode(reply.code, &reply.message, &reply.body);
        (reply.code, encoded)
    }
}

/// Immutable (path, method) → handler association
pub struct RouteBinding {
    path: String,
    method: Method,
    handler: Arc<dyn DynHandler>,
}

impl RouteBinding {
    pub fn new<H: Handler>(path: impl Into<String>, method: Method, handler: H) -> Self {
        Self {
            path: path.into(),
            method,
            handler: Arc::new(handler),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn matches(&self, path: &str, method: &Method) -> bool {
        self.path == path && self.method == *method
    }

    /// Invoke the handler and encode its reply
    pub fn respond(&self, ctx: &mut RequestContext) -> (i64, Result<Vec<u8>>) {
        self.handler.respond(ctx)
    }
}

impl fmt::Debug for RouteBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBinding")
            .field("path", &self.path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}
