//! Routing module
//!
//! Exact (path, method) routing:
//! - `binding`: the handler contract and the route binding type
//! - `registry`: insertion-ordered registry with duplicate rejection

mod binding;
mod registry;

pub use binding::{DynHandler, Handler, Reply, RouteBinding};
pub use registry::Registry;
