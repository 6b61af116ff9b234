//! HTTP protocol layer module
//!
//! Response construction, decoupled from routing and handler logic.

pub mod response;

pub use response::build_envelope_response;
