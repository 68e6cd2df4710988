//! URL helpers used when building backend targets

use url::Url;

/// Strips surrounding whitespace and every trailing slash.
pub fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// Joins a normalized base with a resource path, collapsing duplicate slashes
/// at the seam.
pub fn join_url(base: &str, resource: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        resource.trim_start_matches('/')
    )
}

/// `host[:port]` of a URL, port included only when it differs from the
/// scheme default. Comparable with an inbound `Host` header.
pub fn authority_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Normalizes an inbound `Host` header the same way `authority_of` does.
pub fn normalize_host_header(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    host.strip_suffix(":80")
        .or_else(|| host.strip_suffix(":443"))
        .map(str::to_string)
        .unwrap_or(host)
}

/// Sanitize a value before it is placed into a filename header.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_strips_trailing_slashes() {
        assert_eq!(normalize_base(" http://backend:8000/// "), "http://backend:8000");
        assert_eq!(normalize_base("http://backend:8000"), "http://backend:8000");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://a:1", "/empresas/3"), "http://a:1/empresas/3");
        assert_eq!(join_url("http://a:1/", "api/empresas"), "http://a:1/api/empresas");
    }

    #[test]
    fn test_authority_matches_host_header() {
        assert_eq!(authority_of("https://facturacion.ima.cl/api").as_deref(), Some("facturacion.ima.cl"));
        assert_eq!(authority_of("http://127.0.0.1:8008").as_deref(), Some("127.0.0.1:8008"));
        assert_eq!(normalize_host_header("Facturacion.IMA.cl:443"), "facturacion.ima.cl");
        assert_eq!(normalize_host_header("localhost:3000"), "localhost:3000");
        assert!(authority_of("not a url").is_none());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("factura 12/3.pdf"), "factura_12_3.pdf");
    }
}
