//! Admin-only collaborator management.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::post,
};

use reblog_core::DomainError;

use crate::app::dto::{self, DataEnvelope, EmailData};
use crate::app::errors::{reply, status_message};
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/collaborator/create", post(create_collaborator))
        .route("/collaborator/delete", post(delete_collaborator))
}

fn email_reply(status: StatusCode, ok: bool, message: &str, email: &str) -> Response {
    reply(
        status,
        DataEnvelope {
            status: ok,
            message: message.to_string(),
            data: EmailData {
                email: email.to_string(),
            },
        },
    )
}

pub async fn create_collaborator(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<dto::CollaboratorRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return email_reply(StatusCode::BAD_REQUEST, false, "Bad request", "Invalid Email");
    };

    match services.invitations.invite(&body.email).await {
        Ok(invitation) => {
            tracing::info!(
                invited_by = %session.account_id(),
                invitation_id = %invitation.id,
                "collaborator invitation issued"
            );
            email_reply(StatusCode::OK, true, "An email has been sent to the collaborator", "")
        }
        Err(DomainError::Validation(_)) => email_reply(
            StatusCode::BAD_REQUEST,
            false,
            "Please provide a valid email address",
            "Please provide a valid email address",
        ),
        Err(DomainError::Conflict(_)) => email_reply(
            StatusCode::BAD_REQUEST,
            false,
            "Collaborator exists",
            "Email already identifies a collaborator",
        ),
        Err(e) => {
            tracing::error!(error = %e, "collaborator invitation failed");
            email_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                false,
                "An error occured while we tried adding a new collaborator",
                "",
            )
        }
    }
}

pub async fn delete_collaborator(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<dto::CollaboratorRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return status_message(
            StatusCode::BAD_REQUEST,
            false,
            "An error occured while we tried deleting the collaborator",
        );
    };

    match services.invitations.remove_collaborator(&body.email).await {
        Ok(account) => {
            tracing::info!(removed_by = %session.account_id(), account_id = %account.id, "collaborator deleted");
            status_message(StatusCode::OK, true, "User was successfully deleted")
        }
        Err(DomainError::NotFound) => {
            status_message(StatusCode::BAD_REQUEST, false, "Could not delete non-existent user")
        }
        Err(DomainError::Authorization) => {
            status_message(StatusCode::BAD_REQUEST, false, "Admin accounts cannot be deleted")
        }
        Err(e) => {
            tracing::error!(error = %e, "collaborator deletion failed");
            status_message(
                StatusCode::INTERNAL_SERVER_ERROR,
                false,
                "An error occured while we tried deleting the collaborator",
            )
        }
    }
}
