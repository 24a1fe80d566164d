//! Request bodies and response envelopes.
//!
//! Every request field defaults to an empty string so a partial body such as
//! `{}` decodes and is rejected by validation, not by the JSON extractor.

use serde::{Deserialize, Serialize};

use reblog_core::FieldErrors;
use reblog_posts::Post;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub moniker: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CollaboratorRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

// -------------------------
// Response envelopes
// -------------------------

#[derive(Debug, Serialize)]
pub struct Envelope<E> {
    pub status: bool,
    pub message: String,
    pub errors: E,
}

impl<E> Envelope<E> {
    pub fn ok(message: impl Into<String>, errors: E) -> Self {
        Self {
            status: true,
            message: message.into(),
            errors,
        }
    }

    pub fn fail(message: impl Into<String>, errors: E) -> Self {
        Self {
            status: false,
            message: message.into(),
            errors,
        }
    }
}

/// Same as [`Envelope`] but the detail travels under `data`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<D> {
    pub status: bool,
    pub message: String,
    pub data: D,
}

#[derive(Debug, Default, Serialize)]
pub struct LoginErrors {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenData {
    pub token: String,
}

#[derive(Debug, Default, Serialize)]
pub struct SignupErrors {
    pub moniker: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize)]
pub struct EmailData {
    pub email: String,
}

#[derive(Debug, Default, Serialize)]
pub struct PostErrors {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Serialize)]
pub struct PostIdErrors {
    pub post_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedPost {
    pub status: bool,
    pub message: String,
    pub errors: PostErrors,
    pub data: PostSummary,
}

#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub slug: String,
    pub status: i64,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.get(),
            slug: post.slug.clone(),
            status: post.status.tag(),
        }
    }
}

// -------------------------
// Field error mapping
// -------------------------

impl LoginErrors {
    pub fn from_fields(fields: &FieldErrors) -> Self {
        Self {
            email: fields.message_for("email"),
            password: fields.message_for("password"),
        }
    }
}

impl SignupErrors {
    pub fn from_fields(fields: &FieldErrors) -> Self {
        Self {
            moniker: fields.message_for("moniker"),
            full_name: fields.message_for("full_name"),
            password: fields.message_for("password"),
        }
    }
}

impl PostErrors {
    pub fn from_fields(fields: &FieldErrors) -> Self {
        Self {
            title: fields.message_for("title"),
            content: fields.message_for("content"),
        }
    }
}

impl PostIdErrors {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            post_id: message.into(),
        }
    }
}
