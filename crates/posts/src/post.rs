//! Post entity and creation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reblog_core::{AccountId, DomainResult, Entity, FieldErrors, PostId};

/// Publication state. Stored and serialised as an integer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum PostStatus {
    #[default]
    Unpublished = 0,
    Published = 1,
}

impl PostStatus {
    pub const fn tag(self) -> i64 {
        self as i64
    }

    /// Anything but `1` is treated as unpublished.
    pub const fn from_tag(tag: i64) -> Self {
        match tag {
            1 => PostStatus::Published,
            _ => PostStatus::Unpublished,
        }
    }
}

impl From<i64> for PostStatus {
    fn from(value: i64) -> Self {
        PostStatus::from_tag(value)
    }
}

impl From<PostStatus> for i64 {
    fn from(value: PostStatus) -> Self {
        value.tag()
    }
}

impl core::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            PostStatus::Unpublished => "unpublished",
            PostStatus::Published => "published",
        })
    }
}

/// A stored article.
///
/// `title` and `slug` are unique across posts (enforced by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: PostStatus,
    pub author_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Post data handed to the store; id and timestamps are assigned there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: PostStatus,
    pub author_id: AccountId,
}

/// Field checks for a new article, all defects reported together.
pub fn validate_new_post(title: &str, content: &str) -> DomainResult<()> {
    let mut errors = FieldErrors::new();
    if title.chars().count() < 10 {
        errors.add("title", "An article's title should be more than 10 characters");
    }
    if content.chars().count() < 100 {
        errors.add(
            "content",
            "The content of the article is too small. Should be at least 100 characters in length",
        );
    }
    errors.into_result()
}
