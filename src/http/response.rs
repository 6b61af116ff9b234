//! HTTP response building module
//!
//! Turns an encoded envelope plus handler-supplied headers into the transport
//! response. The transport status is always 200; outcomes live in the envelope.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE, SERVER};
use hyper::{HeaderMap, Response};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Build the response for one dispatched request.
///
/// `payload` is `None` when the envelope could not be encoded; the response then
/// carries the handler headers and an empty body. Otherwise `Content-Type` and
/// `Server` are added unless the handler already set them.
pub fn build_envelope_response(
    payload: Option<Vec<u8>>,
    headers: HeaderMap,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let has_payload = payload.is_some();
    let body = payload.map_or_else(Bytes::new, Bytes::from);

    let mut response = Response::new(Full::new(body));
    let response_headers = response.headers_mut();
    response_headers.extend(headers);

    // Without a payload only the handler's own headers go out
    if !has_payload {
        return response;
    }

    response_headers
        .entry(CONTENT_TYPE)
        .or_insert(HeaderValue::from_static(JSON_CONTENT_TYPE));

    if !response_headers.contains_key(SERVER) {
        match HeaderValue::from_str(server_name) {
            Ok(value) => {
                response_headers.insert(SERVER, value);
            }
            Err(e) => log_header_error("Server", &e),
        }
    }

    response
}

/// Log response header error
fn log_header_error(name: &str, error: &hyper::header::InvalidHeaderValue) {
    crate::logger::log_error(&format!("Invalid {name} header value: {error}"));
}
