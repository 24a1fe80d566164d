//! Post operations composed over the storage port.

use std::sync::Arc;

use reblog_core::{AccountId, DomainError, DomainResult, PostId, StoreError};

use crate::{NewPost, Post, PostStatus, PostStore, slugify, validate_new_post};

pub struct PostManager {
    posts: Arc<dyn PostStore>,
}

impl PostManager {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    /// Validate, reject duplicate titles, derive the slug and store the post.
    ///
    /// The caller decides `status`; the manager does not look at roles.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        author_id: AccountId,
        status: PostStatus,
    ) -> DomainResult<Post> {
        validate_new_post(title, content)?;

        if self.posts.find_post_by_title(title).await.map_err(log_store)?.is_some() {
            return Err(DomainError::conflict(format!("Post with title, {title} already exists")));
        }

        let post = self
            .posts
            .create_post(NewPost {
                title: title.to_string(),
                slug: slugify(title),
                content: content.to_string(),
                status,
                author_id,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    DomainError::conflict(format!("Post with title, {title} already exists"))
                }
                other => log_store(other),
            })?;

        tracing::info!(post_id = %post.id, author_id = %author_id, status = %post.status, "post created");
        Ok(post)
    }

    pub async fn find_by_slug(&self, slug: &str) -> DomainResult<Post> {
        self.posts
            .find_post_by_slug(slug)
            .await
            .map_err(log_store)?
            .ok_or(DomainError::NotFound)
    }

    pub async fn delete(&self, id: PostId) -> DomainResult<Post> {
        let post = self.find(id).await?;
        self.posts.delete_post(&post).await.map_err(log_store)?;
        tracing::info!(post_id = %post.id, "post deleted");
        Ok(post)
    }

    pub async fn unpublish(&self, id: PostId) -> DomainResult<Post> {
        let post = self.find(id).await?;
        let updated = self.posts.unpublish_post(&post).await.map_err(log_store)?;
        tracing::info!(post_id = %updated.id, "post unpublished");
        Ok(updated)
    }

    async fn find(&self, id: PostId) -> DomainResult<Post> {
        self.posts
            .find_post_by_id(id)
            .await
            .map_err(log_store)?
            .ok_or(DomainError::NotFound)
    }
}

fn log_store(err: StoreError) -> DomainError {
    if let StoreError::Backend(_) = &err {
        tracing::error!(error = %err, "post storage failure");
    }
    err.into()
}
