/// Security headers middleware
///
/// Adds response headers suited to a JSON API:
///
/// - `X-Content-Type-Options: nosniff` - Prevents MIME type sniffing
/// - `X-Frame-Options: DENY` - Prevents clickjacking
/// - `Referrer-Policy: no-referrer`
/// - `Content-Security-Policy: default-src 'none'; frame-ancestors 'none'`
/// - `Strict-Transport-Security` - Only when HSTS is enabled
///
/// Downloads of uploaded files additionally rely on `nosniff` so stored
/// content is never interpreted as something else by browsers.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use projecthub_api::middleware::security::{security_headers, SecurityHeaders};
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(middleware::from_fn_with_state(SecurityHeaders { hsts: true }, security_headers));
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Middleware settings
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityHeaders {
    /// Send `Strict-Transport-Security` (use only behind HTTPS)
    pub hsts: bool,
}

/// Adds the security headers to every response
pub async fn security_headers(
    State(settings): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    if settings.hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}
