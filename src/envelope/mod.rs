//! Response envelope module
//!
//! Every response leaves the dispatcher wrapped in the same three-field JSON object:
//!
//! ```text
//! {"code": <int>, "msg": <string>, "body": <any>}
//! ```
//!
//! `code == 0` means success; negative codes are failures. The codec is also used
//! to read envelopes produced by peer services, which may be less disciplined
//! (see [`decode`]).

mod codec;

pub use codec::{decode, encode, parse_raw, RawEnvelope};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Envelope code for a request whose query or form body could not be decoded
pub const CODE_PARSE_FORM: i64 = -1;

/// Envelope code for a request with no matching route
pub const CODE_ROUTE_NOT_FOUND: i64 = -4;

/// Decoded response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(rename = "msg")]
    pub message: String,
    /// `None` when the peer omitted the `body` key
    pub body: Option<Value>,
}

impl Envelope {
    pub fn new(code: i64, message: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            body,
        }
    }

    pub const fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Re-encode into wire form; an absent body is written as `null`
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self.code, &self.message, &self.body)
    }
}

/// Body used for envelopes the dispatcher produces on its own (`{}`)
pub fn empty_body() -> Value {
    Value::Object(serde_json::Map::new())
}
