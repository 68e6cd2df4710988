use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use shared::AppError;
use tracing::warn;

/// A bare scheme (`Bearer` with nothing after it) carries no token.
fn carries_token(value: &str) -> bool {
    let value = value.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    !token.is_empty()
}

/// Rejects protected requests without an `Authorization` header before any
/// backend candidate is contacted. The token itself is opaque to this
/// server; the backend validates it.
pub async fn require_authorization(request: Request, next: Next) -> Result<Response, AppError> {
    let present = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(carries_token);

    if !present {
        warn!("Missing Authorization header on {}", request.uri().path());
        return Err(AppError::authentication(
            "Authentication required. Please log in again.",
        ));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::carries_token;

    #[test]
    fn test_bare_scheme_is_not_a_token() {
        assert!(!carries_token(""));
        assert!(!carries_token("   "));
        assert!(!carries_token("Bearer"));
        assert!(!carries_token("Bearer "));
        assert!(!carries_token(" bearer   "));
        assert!(carries_token("Bearer abc.def"));
        assert!(carries_token("opaque-token"));
    }
}
