//! Request handler module
//!
//! Everything between the accepted request and the envelope response:
//! parameter decoding, the per-request context and the dispatcher itself.

mod context;
mod dispatch;
pub mod form;
mod params;

pub use context::RequestContext;
pub use dispatch::{DispatchOptions, Dispatcher};
pub use params::{validate_params, Params};
