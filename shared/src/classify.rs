//! Response classifier shared by every proxy route.
//!
//! Backends behind a wrong base URL tend to answer with the front end's own
//! HTML error page, frequently with status 200. Every upstream body goes
//! through [`classify_response`] before anything else looks at it.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref HTML_PREFIX: Regex = Regex::new(r"(?i)^\s*<(!doctype|html)").unwrap();
}

/// How many leading bytes are inspected when sniffing for HTML.
const SNIFF_LEN: usize = 512;

#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// An HTML page; never a valid API answer.
    Html,
    Json(Value),
    Text(String),
    Binary,
}

impl Classified {
    pub fn is_html(&self) -> bool {
        matches!(self, Classified::Html)
    }
}

fn media_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Content types relayed as downloadable artifacts rather than API data.
pub fn is_binary_content_type(content_type: Option<&str>) -> bool {
    let media = media_type(content_type);
    media == "application/pdf"
        || media == "application/octet-stream"
        || media == "application/zip"
        || media.starts_with("image/")
        || media.starts_with("application/x-pkcs12")
        || media.starts_with("application/pkcs12")
        || media.starts_with("application/x-x509")
        || media.starts_with("application/pkix")
}

pub fn looks_like_html(body: &[u8], content_type: Option<&str>) -> bool {
    if media_type(content_type).starts_with("text/html") {
        return true;
    }
    let head = &body[..body.len().min(SNIFF_LEN)];
    let text = String::from_utf8_lossy(head);
    HTML_PREFIX.is_match(text.trim_start_matches('\u{feff}'))
}

/// Pure classification of an upstream body and its `Content-Type` header.
pub fn classify_response(body: &[u8], content_type: Option<&str>) -> Classified {
    if looks_like_html(body, content_type) {
        return Classified::Html;
    }

    if is_binary_content_type(content_type) {
        return Classified::Binary;
    }

    let text = match std::str::from_utf8(body) {
        Ok(text) => text,
        Err(_) => return Classified::Binary,
    };

    let trimmed = text.trim();
    let declared_json = media_type(content_type).contains("json");
    if declared_json || trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Classified::Json(value);
        }
    }

    Classified::Text(text.to_string())
}
