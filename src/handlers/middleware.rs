//! Middleware for authentication and security headers

use crate::error::ApiError;
use crate::handlers::auth::validate_session;
use crate::handlers::AppState;
use crate::models::Actor;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Resolve the session and make the Actor available via Extension<Actor>.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let user = match validate_session(&state.pool, request.headers()).await {
        Some(u) => u,
        None => return ApiError::NotAuthenticated.into_response(),
    };

    let mut request = request;
    request.extensions_mut().insert(user.actor());

    next.run(request).await
}

/// Admin gate, layered inside `require_auth` on admin-only routes.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<Actor>()
        .map(|a| a.role.is_admin())
        .unwrap_or(false);

    if !is_admin {
        return ApiError::Forbidden.into_response();
    }

    next.run(request).await
}

/// Security headers middleware
pub async fn security_headers(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; form-action 'self'; base-uri 'self'; frame-ancestors 'none'",
        ),
    );

    if state.is_production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        );
    }

    response
}
