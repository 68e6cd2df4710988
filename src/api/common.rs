use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, HOST},
        request::Parts,
        HeaderValue, Method,
    },
};
use bytes::Bytes;
use serde_json::Value;
use shared::{AppError, Result};
use std::convert::Infallible;

use crate::upstream::{ForwardBody, ForwardRequest};

/// What every proxy route needs from the inbound request.
#[derive(Debug, Clone, Default)]
pub struct InboundContext {
    pub host: Option<String>,
    pub query: Option<String>,
    pub authorization: Option<HeaderValue>,
    pub content_type: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for InboundContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        let host = parts
            .headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()));

        Ok(Self {
            host,
            query: parts.uri.query().map(str::to_string),
            authorization: parts.headers.get(AUTHORIZATION).cloned(),
            content_type: parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string),
        })
    }
}

impl InboundContext {
    /// Forward request carrying the inbound query, auth and host.
    pub fn request(&self, method: Method, resource: impl Into<String>) -> ForwardRequest {
        ForwardRequest::new(method, resource)
            .query(self.query.clone())
            .authorization(self.authorization.clone())
            .inbound_host(self.host.clone())
    }

    /// Raw body relayed as-is with the inbound content type (uploads).
    pub fn raw_body(&self, bytes: Bytes) -> ForwardBody {
        if bytes.is_empty() {
            return ForwardBody::Empty;
        }
        ForwardBody::Raw {
            bytes,
            content_type: self.content_type.clone(),
        }
    }
}

/// Percent-encodes a path parameter before it goes into a backend path.
/// Empty, `.` and `..` would change the resource the URL resolves to.
pub fn segment(value: &str) -> Result<String> {
    let value = value.trim();
    if matches!(value, "" | "." | "..") {
        return Err(AppError::bad_request(format!("Invalid path parameter: {:?}", value)));
    }
    Ok(urlencoding::encode(value).into_owned())
}

/// Parses and re-serializes a JSON body. Only objects and arrays are
/// accepted; an empty body is forwarded as no body at all.
pub fn json_body(bytes: &Bytes) -> Result<ForwardBody> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ForwardBody::Empty);
    }

    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {}", e)))?;

    match value {
        Value::Object(_) | Value::Array(_) => Ok(ForwardBody::Json(value)),
        _ => Err(AppError::validation("JSON body must be an object or an array")),
    }
}

/// Like [`json_body`] but an empty body is an error.
pub fn required_json_body(bytes: &Bytes) -> Result<ForwardBody> {
    match json_body(bytes)? {
        ForwardBody::Empty => Err(AppError::validation("A JSON body is required")),
        body => Ok(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_rules() {
        assert!(matches!(json_body(&Bytes::from_static(b"  ")), Ok(ForwardBody::Empty)));
        assert!(matches!(
            json_body(&Bytes::from_static(br#"{"rut":"76.123.456-7"}"#)),
            Ok(ForwardBody::Json(_))
        ));
        assert!(json_body(&Bytes::from_static(b"42")).is_err());
        assert!(json_body(&Bytes::from_static(b"{broken")).is_err());
        assert!(required_json_body(&Bytes::new()).is_err());
    }

    #[test]
    fn test_segment_is_encoded() {
        assert_eq!(segment("12").unwrap(), "12");
        assert_eq!(segment("../admin").unwrap(), "..%2Fadmin");
        assert_eq!(segment(" 76.123.456-7 ").unwrap(), "76.123.456-7");
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        for value in ["", " ", ".", "..", " .. "] {
            let err = segment(value).unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
        assert_eq!(segment("...").unwrap(), "...");
    }
}
