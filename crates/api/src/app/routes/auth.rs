//! Guest-only routes: login and invitation signup.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::post,
};

use reblog_auth::{Identity, Registration};
use reblog_core::DomainError;

use crate::app::dto::{self, DataEnvelope, Envelope, LoginErrors, SignupErrors, TokenData};
use crate::app::errors::{reply, status_message};
use crate::app::services::AppServices;
use crate::middleware;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/signup/:token", post(signup))
        .route_layer(axum::middleware::from_fn(middleware::guest_only))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail(
                "Could not log you in",
                LoginErrors {
                    email: "Please provide your email address".to_string(),
                    password: "Please provide your password".to_string(),
                },
            ),
        );
    };

    let account = match services.credentials.verify(&body.email, &body.password).await {
        Ok(account) => account,
        Err(DomainError::Validation(fields)) => {
            return reply(
                StatusCode::UNAUTHORIZED,
                Envelope::fail("Authentication failed", LoginErrors::from_fields(&fields)),
            );
        }
        Err(DomainError::Authentication) => {
            return reply(
                StatusCode::UNAUTHORIZED,
                Envelope::fail(
                    "Authentication failed",
                    LoginErrors {
                        email: "Invalid email/password".to_string(),
                        password: String::new(),
                    },
                ),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "login failed");
            return reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::fail("Could not log you in", LoginErrors::default()),
            );
        }
    };

    match services.tokens.issue(&Identity::from(&account)) {
        Ok(token) => {
            tracing::info!(account_id = %account.id, role = %account.role, "session issued");
            reply(
                StatusCode::OK,
                DataEnvelope {
                    status: true,
                    message: "You have been authenticated".to_string(),
                    data: TokenData { token },
                },
            )
        }
        Err(e) => {
            tracing::error!(account_id = %account.id, error = %e, "token issuance failed");
            status_message(StatusCode::INTERNAL_SERVER_ERROR, false, "Internal Server Error")
        }
    }
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
    payload: Result<Json<dto::SignupRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail(
                "No input was provided",
                SignupErrors {
                    moniker: "Please provide your moniker".to_string(),
                    full_name: "Please provide your name".to_string(),
                    password: "Please provide your password".to_string(),
                },
            ),
        );
    };

    let registration = Registration {
        moniker: body.moniker,
        full_name: body.full_name,
        password: body.password,
    };

    match services.invitations.redeem(&token, registration).await {
        Ok(_) => reply(
            StatusCode::OK,
            Envelope::ok(
                "You have been added as a contributor to Reblog. Please login in order to get started",
                SignupErrors::default(),
            ),
        ),
        Err(DomainError::NotFound) => reply(
            StatusCode::NOT_FOUND,
            Envelope::fail("Invitation not found", SignupErrors::default()),
        ),
        Err(DomainError::Expired) => reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail(
                "Token is expired, Please contact the admin to resend a new token",
                SignupErrors::default(),
            ),
        ),
        Err(DomainError::Validation(fields)) => reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail("Validation failed", SignupErrors::from_fields(&fields)),
        ),
        Err(DomainError::Conflict(reason)) => reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail(
                "Could not add you as a collaborator",
                SignupErrors {
                    moniker: reason,
                    ..SignupErrors::default()
                },
            ),
        ),
        Err(e) => {
            tracing::error!(error = %e, "signup failed");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::fail(
                    "An error occured while we tried adding you as a collaborator to Reblog. Please try again",
                    SignupErrors::default(),
                ),
            )
        }
    }
}
