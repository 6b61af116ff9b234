//! dispatchd: exact (path, method) request dispatch with JSON envelope responses
//!
//! Handlers are registered against a [`Registry`]; the [`Dispatcher`] decodes
//! query and form parameters, finds the matching route and wraps the handler's
//! reply in a `{"code","msg","body"}` [`Envelope`].

pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use crate::config::Config;
pub use crate::envelope::Envelope;
pub use crate::error::{Error, FormError, Result};
pub use crate::handler::{DispatchOptions, Dispatcher, Params, RequestContext};
pub use crate::routing::{Handler, Registry, Reply};
pub use crate::server::Server;
