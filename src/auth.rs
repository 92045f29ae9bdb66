use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;

use crate::config::BasicUser;
use crate::handlers::AppState;

/// Username and password from an `Authorization: Basic ...` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;

    Some((user.to_string(), pass.to_string()))
}

pub fn is_authorized(headers: &HeaderMap, users: &[BasicUser]) -> bool {
    match basic_credentials(headers) {
        Some((user, pass)) => users.iter().any(|u| u.user == user && u.pass == pass),
        None => false,
    }
}

pub async fn require_auth(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    if is_authorized(req.headers(), &state.config.users) {
        return next.run(req).await;
    }

    debug!("Rejected unauthenticated {} {}", req.method(), req.uri());

    (
        StatusCode::UNAUTHORIZED,
        [(
            WWW_AUTHENTICATE,
            format!("Basic realm=\"{}\"", state.config.realm),
        )],
    )
        .into_response()
}
