use async_trait::async_trait;

use reblog_core::{PostId, StoreError};

use crate::{NewPost, Post};

/// Storage port for posts. Title and slug uniqueness belong to the store.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find_post_by_title(&self, title: &str) -> Result<Option<Post>, StoreError>;

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError>;

    async fn find_post_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError>;

    async fn delete_post(&self, post: &Post) -> Result<(), StoreError>;

    /// Set the post's status to unpublished and return the updated row.
    async fn unpublish_post(&self, post: &Post) -> Result<Post, StoreError>;
}
