//! URL-encoded form decoding
//!
//! Decoding itself goes through `url::form_urlencoded`, which is lenient. The
//! strict checks (bad `%` escapes, `;` separators) run first so malformed input
//! is rejected instead of silently repaired.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Method};

use super::params::Params;
use crate::error::FormError;

const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Decode `a=1&b=2` style input into `params`
pub fn parse_urlencoded(raw: &[u8], params: &mut Params) -> Result<(), FormError> {
    if raw.contains(&b';') {
        return Err(FormError::InvalidSemicolon);
    }
    check_escapes(raw)?;

    for (name, value) in url::form_urlencoded::parse(raw) {
        params.append(name, value);
    }
    Ok(())
}

/// Every `%` must start a two-digit hex escape
fn check_escapes(raw: &[u8]) -> Result<(), FormError> {
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'%' {
            i += 1;
            continue;
        }
        let valid = raw.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && raw.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        if !valid {
            let end = (i + 3).min(raw.len());
            return Err(FormError::InvalidEscape(
                String::from_utf8_lossy(&raw[i..end]).into_owned(),
            ));
        }
        i += 3;
    }
    Ok(())
}

/// Percent-decoded request path, as routes are registered
///
/// Invalid UTF-8 after decoding is replaced, malformed escapes are kept as-is.
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Whether the request carries a form body worth reading
pub fn has_form_body(method: &Method, headers: &HeaderMap) -> Result<bool, FormError> {
    if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
        return Ok(false);
    }
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(false);
    };
    let value = value
        .to_str()
        .map_err(|_| FormError::InvalidContentType("non-ASCII header value".to_string()))?;

    let mut segments = value.split(';');
    let media_type = segments.next().unwrap_or_default().trim();
    if media_type.is_empty() {
        return Err(FormError::InvalidContentType(value.to_string()));
    }
    // Every parameter must be `name=value`; empty segments are tolerated
    for param in segments.map(str::trim).filter(|p| !p.is_empty()) {
        match param.split_once('=') {
            Some((name, _)) if !name.trim().is_empty() => {}
            _ => return Err(FormError::InvalidContentType(value.to_string())),
        }
    }
    Ok(media_type.eq_ignore_ascii_case(FORM_MEDIA_TYPE))
}

/// Read the whole body, refusing anything over `limit` bytes
pub async fn read_body<B>(body: B, limit: u64) -> Result<Bytes, FormError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limited = Limited::new(body, usize::try_from(limit).unwrap_or(usize::MAX));
    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(FormError::BodyTooLarge(limit))
        }
        Err(e) => Err(FormError::Body(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::header::HeaderValue;

    fn parse(raw: &str) -> Result<Params, FormError> {
        let mut params = Params::new();
        parse_urlencoded(raw.as_bytes(), &mut params).map(|()| params)
    }

    fn form_headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_parse_basic_pairs() {
        let params = parse("a=1&b=two&a=3").unwrap();
        assert_eq!(params.get("a").unwrap(), ["1", "3"]);
        assert_eq!(params.first("b"), Some("two"));
    }

    #[test]
    fn test_parse_decodes_plus_and_escapes() {
        let params = parse("q=hello+world&path=%2Ftmp%2Fx&k%20ey=v").unwrap();
        assert_eq!(params.first("q"), Some("hello world"));
        assert_eq!(params.first("path"), Some("/tmp/x"));
        assert_eq!(params.first("k ey"), Some("v"));
    }

    #[test]
    fn test_parse_name_without_value() {
        let params = parse("flag&&x=").unwrap();
        assert_eq!(params.first("flag"), Some(""));
        assert_eq!(params.first("x"), Some(""));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_invalid_escape() {
        assert_eq!(
            parse("a=%zz").unwrap_err(),
            FormError::InvalidEscape("%zz".to_string())
        );
        assert_eq!(
            parse("a=%4").unwrap_err(),
            FormError::InvalidEscape("%4".to_string())
        );
        assert_eq!(
            parse("a=ok&b=%").unwrap_err(),
            FormError::InvalidEscape("%".to_string())
        );
    }

    #[test]
    fn test_parse_semicolon_rejected() {
        assert_eq!(parse("a=1;b=2").unwrap_err(), FormError::InvalidSemicolon);
    }

    #[test]
    fn test_has_form_body() {
        let form = form_headers("application/x-www-form-urlencoded; charset=utf-8");
        assert!(has_form_body(&Method::POST, &form).unwrap());
        assert!(has_form_body(&Method::PATCH, &form).unwrap());
        assert!(!has_form_body(&Method::GET, &form).unwrap());

        let json = form_headers("application/json");
        assert!(!has_form_body(&Method::POST, &json).unwrap());
        assert!(!has_form_body(&Method::POST, &HeaderMap::new()).unwrap());
    }

    #[test]
    fn test_has_form_body_empty_media_type() {
        let headers = form_headers("; charset=utf-8");
        assert!(matches!(
            has_form_body(&Method::POST, &headers),
            Err(FormError::InvalidContentType(_))
        ));
    }

    #[test]
    fn test_has_form_body_malformed_parameter() {
        for content_type in [
            "application/x-www-form-urlencoded; charset",
            "application/x-www-form-urlencoded; =utf-8",
        ] {
            assert!(
                matches!(
                    has_form_body(&Method::POST, &form_headers(content_type)),
                    Err(FormError::InvalidContentType(_))
                ),
                "{content_type}"
            );
        }
        // Trailing separator carries no parameter
        let trailing = form_headers("application/x-www-form-urlencoded;");
        assert!(has_form_body(&Method::POST, &trailing).unwrap());
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/p%69ng"), "/ping");
        assert_eq!(decode_path("/hello%20world"), "/hello world");
        assert_eq!(decode_path("/caf%C3%A9"), "/café");
        assert_eq!(decode_path("/plain+path"), "/plain+path");
        assert_eq!(decode_path("/bad%zz"), "/bad%zz");
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let bytes = read_body(Full::new(Bytes::from("a=1")), 16).await.unwrap();
        assert_eq!(&bytes[..], b"a=1");
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let err = read_body(Full::new(Bytes::from("a=123456789")), 4)
            .await
            .unwrap_err();
        assert_eq!(err, FormError::BodyTooLarge(4));
    }
}
