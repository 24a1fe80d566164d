use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use reblog_auth::{Role, TokenIssuer, carries_bearer, require_role};
use reblog_core::DomainError;

use crate::app::errors::status_message;
use crate::context::SessionContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenIssuer>,
}

/// Verify the bearer token and attach the session to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        tracing::debug!("request without bearer token");
        return unauthorized();
    };

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized(),
    };

    req.extensions_mut().insert(SessionContext::new(claims));
    next.run(req).await
}

/// Admit only sessions carrying the admin role. Runs after `auth_middleware`.
pub async fn admin_only(req: Request<Body>, next: Next) -> Response {
    let claims = req.extensions().get::<SessionContext>().map(SessionContext::claims);

    match require_role(claims, Role::Admin) {
        Ok(()) => next.run(req).await,
        Err(DomainError::Authorization) => status_message(
            StatusCode::UNAUTHORIZED,
            false,
            "You do not have permission to view this resource",
        ),
        Err(_) => unauthorized(),
    }
}

/// Turn away requests that already present a bearer credential.
pub async fn guest_only(req: Request<Body>, next: Next) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if carries_bearer(header) {
        return status_message(StatusCode::UNAUTHORIZED, false, "You have been authenticated already.");
    }

    next.run(req).await
}

/// Run each request inside a span tagged with a fresh request id.
pub async fn request_trace(req: Request<Body>, next: Next) -> Response {
    let request_id = reblog_observability::new_request_id();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let started = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

fn unauthorized() -> Response {
    status_message(StatusCode::UNAUTHORIZED, false, "Unauthorized")
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let scheme = header.get(..7)?;
    if !scheme.eq_ignore_ascii_case("bearer ") {
        return None;
    }

    let token = header[7..].trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token_after_scheme() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer(&headers("bearer   abc ")), Some("abc"));
    }

    #[test]
    fn rejects_missing_or_foreign_schemes() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&headers("Basic abc")), None);
        assert_eq!(extract_bearer(&headers("abc")), None);
    }
}
