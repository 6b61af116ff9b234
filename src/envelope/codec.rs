//! Envelope encode/decode
//!
//! Decoding is split in two stages: [`parse_raw`] never fails and only recovers
//! whatever JSON object it can, then [`decode`] checks the fields it needs.

use serde::Serialize;
use serde_json::{Map, Value};

use super::Envelope;
use crate::error::{Error, Result};

/// Borrowed wire form, field order is `code`, `msg`, `body`
#[derive(Serialize)]
struct WireEnvelope<'a, B: ?Sized> {
    code: i64,
    msg: &'a str,
    body: &'a B,
}

/// Serialize `{code, msg, body}` to JSON bytes
pub fn encode<B>(code: i64, message: &str, body: &B) -> Result<Vec<u8>>
where
    B: Serialize + ?Sized,
{
    let wire = WireEnvelope {
        code,
        msg: message,
        body,
    };
    Ok(serde_json::to_vec(&wire)?)
}

/// Result of the lenient first stage: the top-level JSON object, or nothing
pub type RawEnvelope = Map<String, Value>;

/// Best-effort structural parse.
///
/// Malformed bytes and documents that are not a JSON object both come back as an
/// empty map, so field validation is the only place a decode can fail.
pub fn parse_raw(bytes: &[u8]) -> RawEnvelope {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Decode an envelope received from a peer.
///
/// - `code` must be present and numeric (floats are truncated)
/// - `msg` is preferred; `error` is accepted in its place
/// - `body` is optional
pub fn decode(bytes: &[u8]) -> Result<Envelope> {
    let mut raw = parse_raw(bytes);

    let code = raw
        .get("code")
        .ok_or_else(|| invalid("missing code"))
        .and_then(numeric_code)?;

    let message = match raw.get("msg").or_else(|| raw.get("error")) {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(invalid("message is not a string")),
        None => return Err(invalid("missing msg or error")),
    };

    let body = raw.remove("body");

    Ok(Envelope {
        code,
        message,
        body,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn numeric_code(value: &Value) -> Result<i64> {
    let Value::Number(n) = value else {
        return Err(invalid("code is not a number"));
    };
    n.as_i64()
        .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
        .ok_or_else(|| invalid("code out of range"))
}

fn invalid(reason: &str) -> Error {
    Error::InvalidEnvelope(reason.to_string())
}
