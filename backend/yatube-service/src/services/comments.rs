use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::Comment;
use crate::services::posts::post_url;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(custom(function = "crate::validators::validate_not_blank"))]
    pub text: String,
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn ContentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Comment on `post_id` as `author_id`.
    pub async fn add(&self, post_id: i64, author_id: i64, form: CommentForm) -> Result<Comment> {
        if self.store.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }
        form.validate()?;

        let comment = self
            .store
            .create_comment(post_id, author_id, &form.text)
            .await?;
        info!(comment_id = comment.id, post_id, author_id, "comment added");
        Ok(comment)
    }

    /// Only the comment's author may delete it; others are sent back to
    /// the post page.
    pub async fn delete(&self, post_id: i64, comment_id: i64, user_id: i64) -> Result<()> {
        let comment = self
            .store
            .find_comment(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))?;

        if comment.author_id != user_id {
            return Err(AppError::forbidden_redirect(
                "only the author can delete this comment",
                post_url(post_id),
            ));
        }

        self.store.delete_comment(comment_id).await?;
        info!(comment_id, post_id, "comment deleted");
        Ok(())
    }
}
