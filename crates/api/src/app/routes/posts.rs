use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{post, put},
};

use reblog_core::{DomainError, PostId};
use reblog_posts::PostStatus;

use crate::app::dto::{self, CreatedPost, Envelope, PostErrors, PostIdErrors, PostSummary};
use crate::app::errors::reply;
use crate::app::services::AppServices;
use crate::context::SessionContext;

/// Routes open to every authenticated role.
pub fn router() -> Router {
    Router::new().route("/posts/create", post(create_post))
}

/// Routes behind the admin gate.
pub fn admin_router() -> Router {
    Router::new().route("/posts/:id", put(unpublish_post).delete(delete_post))
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<dto::CreatePostRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail("Post could not be created", PostErrors::default()),
        );
    };

    // Admin posts go live immediately; everyone else waits for review.
    let status = if session.role().is_admin() {
        PostStatus::Published
    } else {
        PostStatus::Unpublished
    };

    match services
        .posts
        .create(&body.title, &body.content, session.account_id(), status)
        .await
    {
        Ok(post) => reply(
            StatusCode::OK,
            CreatedPost {
                status: true,
                message: "Post was successfully created".to_string(),
                errors: PostErrors::default(),
                data: PostSummary::from(&post),
            },
        ),
        Err(DomainError::Validation(fields)) => reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail(
                "Post could not be created due to invalid data",
                PostErrors::from_fields(&fields),
            ),
        ),
        Err(DomainError::Conflict(reason)) => reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail(
                "Could not create post as that would lead to duplicates",
                PostErrors {
                    title: reason,
                    content: String::new(),
                },
            ),
        ),
        Err(e) => {
            tracing::error!(error = %e, "post creation failed");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::fail("An error occurred while trying to create the post", PostErrors::default()),
            )
        }
    }
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<PostId>() else {
        return invalid_post_id();
    };

    match services.posts.delete(id).await {
        Ok(_) => reply(StatusCode::OK, Envelope::ok("Post was deleted", PostIdErrors::default())),
        Err(DomainError::NotFound) => reply(
            StatusCode::BAD_REQUEST,
            Envelope::fail(
                "Post does not exist",
                PostIdErrors::new("Post with the specified id could not be found"),
            ),
        ),
        Err(e) => {
            tracing::error!(post_id = %id, error = %e, "post deletion failed");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::fail("An error occurred while trying to delete post", PostIdErrors::default()),
            )
        }
    }
}

pub async fn unpublish_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<PostId>() else {
        return invalid_post_id();
    };

    match services.posts.unpublish(id).await {
        Ok(_) => reply(StatusCode::OK, Envelope::ok("Post was updated", PostIdErrors::default())),
        Err(DomainError::NotFound) => reply(
            StatusCode::NOT_FOUND,
            Envelope::fail(
                "Post does not exist",
                PostIdErrors::new("Post with the specified id does not exist"),
            ),
        ),
        Err(e) => {
            tracing::error!(post_id = %id, error = %e, "post unpublish failed");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::fail(
                    "An error occurred while trying to unpublish the post",
                    PostIdErrors::new("Post could not be unpublished"),
                ),
            )
        }
    }
}

fn invalid_post_id() -> Response {
    reply(
        StatusCode::BAD_REQUEST,
        Envelope::fail("Invalid request", PostIdErrors::new("Invalid post id")),
    )
}
