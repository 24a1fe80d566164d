//! `reblog-posts` — blog posts, their publication status and storage port.

pub mod post;
pub mod service;
pub mod slug;
pub mod store;

pub use post::{NewPost, Post, PostStatus, validate_new_post};
pub use service::PostManager;
pub use slug::slugify;
pub use store::PostStore;
