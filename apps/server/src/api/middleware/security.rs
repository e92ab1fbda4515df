//! Response headers for a JSON-only API
//!
//! Every response is an envelope or a health report, so nothing is ever
//! rendered, framed or cached by a browser.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue, Uri},
    middleware::Next,
    response::Response,
};

const API_HEADERS: [(HeaderName, &str); 6] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'none'; frame-ancestors 'none'",
    ),
    // Listings reflect the store at request time.
    (header::CACHE_CONTROL, "no-store"),
    (
        HeaderName::from_static("cross-origin-resource-policy"),
        "same-site",
    ),
];

const HSTS: &str = "max-age=31536000; includeSubDomains";

/// True when the request reached us over HTTPS, directly or through a proxy.
fn behind_https(headers: &HeaderMap, uri: &Uri) -> bool {
    let forwarded = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));

    forwarded || uri.scheme_str().is_some_and(|s| s.eq_ignore_ascii_case("https"))
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let https = behind_https(req.headers(), req.uri());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in API_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    if https {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS),
        );
    }

    response
}
