//! `reblog-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError};
pub use id::{AccountId, InvitationId, PostId};
pub use validation::{FieldErrors, is_email};
