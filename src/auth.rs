//! Session gate for the object routes.
//!
//! Identity provisioning lives outside this service; what arrives here
//! is an opaque session token, either as a `session` cookie or a bearer
//! Authorization header, compared against the configured secret.
//! Anything else is a 401 with no body.

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match presented_token(request.headers()) {
        Some(token) if token == state.session_token => next.run(request).await,
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(bearer) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(bearer);
    }
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|cookie| cookie.strip_prefix("session="))
        })
}
