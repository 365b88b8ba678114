use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{Comment, NewPost, Post, PostChanges, PostFilter, Viewer};

/// Post creation / edit form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(custom(function = "crate::validators::validate_not_blank"))]
    pub text: String,
    /// Group id; empty means "no group"
    #[serde(default, deserialize_with = "optional_id")]
    pub group: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub image: Option<String>,
}

/// Accepts a JSON number, a numeric string (form posts) or an empty string.
fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Id(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Id(id)) => Ok(Some(id)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom("group must be a numeric id")),
    }
}

/// Partial update sent by API clients. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub text: Option<String>,
    #[serde(default, with = "double_option")]
    pub group: Option<Option<i64>>,
    #[serde(default, with = "double_option")]
    pub image: Option<Option<String>>,
}

/// Distinguishes an explicit `null` (clear) from an absent field (keep).
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Everything the post page shows.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    /// Total posts by the same author
    pub author_post_count: i64,
    pub comments: Vec<Comment>,
    pub like_count: i64,
    pub liked: bool,
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn ContentStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    async fn check_group(&self, group_id: Option<i64>) -> Result<()> {
        if let Some(group_id) = group_id {
            if self.store.find_group(group_id).await?.is_none() {
                return Err(AppError::invalid_field("group", "Select a valid choice."));
            }
        }
        Ok(())
    }

    async fn require_post(&self, post_id: i64) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    pub async fn create(&self, author_id: i64, form: PostForm) -> Result<Post> {
        form.validate()?;
        self.check_group(form.group).await?;

        let post = self
            .store
            .create_post(&NewPost {
                author_id,
                text: form.text,
                group_id: form.group,
                image: form.image.filter(|i| !i.is_empty()),
            })
            .await?;

        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    pub async fn detail(&self, viewer: &Viewer, post_id: i64) -> Result<PostDetail> {
        let post = self.require_post(post_id).await?;

        let author_post_count = self
            .store
            .count_posts(PostFilter::Author(post.author_id))
            .await?;
        let comments = self.store.list_comments(post.id).await?;
        let like_count = self.store.count_likes(post.id).await?;
        let liked = match viewer.user_id() {
            Some(user_id) => self.store.has_liked(post.id, user_id).await?,
            None => false,
        };

        Ok(PostDetail {
            post,
            author_post_count,
            comments,
            like_count,
            liked,
        })
    }

    /// Author-only edit. Anyone else is sent back to the post page
    /// and nothing changes.
    pub async fn edit(&self, editor_id: i64, post_id: i64, form: PostForm) -> Result<Post> {
        let post = self.require_post(post_id).await?;
        if post.author_id != editor_id {
            return Err(AppError::forbidden_redirect(
                "only the author can edit this post",
                post_url(post_id),
            ));
        }

        form.validate()?;
        self.check_group(form.group).await?;

        // No image field keeps the current one; an empty value clears it.
        let image = match form.image {
            None => post.image,
            Some(image) if image.is_empty() => None,
            Some(image) => Some(image),
        };

        let updated = self
            .store
            .update_post(
                post_id,
                &PostChanges {
                    text: form.text,
                    group_id: form.group,
                    image,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        info!(post_id, "post edited");
        Ok(updated)
    }

    /// Every post, newest first
    pub async fn list_all(&self) -> Result<Vec<Post>> {
        let count = self.store.count_posts(PostFilter::All).await?;
        self.store.list_posts(PostFilter::All, count, 0).await
    }

    pub async fn get(&self, post_id: i64) -> Result<Post> {
        self.require_post(post_id).await
    }

    /// API update. Non-authors get a plain 403.
    pub async fn update(&self, editor_id: i64, post_id: i64, patch: PostPatch) -> Result<Post> {
        let post = self.require_post(post_id).await?;
        if post.author_id != editor_id {
            return Err(AppError::forbidden("only the author can change this post"));
        }

        let form = PostForm {
            text: patch.text.unwrap_or(post.text),
            group: patch.group.unwrap_or(post.group_id),
            image: patch.image.unwrap_or(post.image),
        };
        form.validate()?;
        self.check_group(form.group).await?;

        self.store
            .update_post(
                post_id,
                &PostChanges {
                    text: form.text,
                    group_id: form.group,
                    image: form.image,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    /// API delete. Non-authors get a plain 403.
    pub async fn delete(&self, user_id: i64, post_id: i64) -> Result<()> {
        let post = self.require_post(post_id).await?;
        if post.author_id != user_id {
            return Err(AppError::forbidden("only the author can delete this post"));
        }

        self.store.delete_post(post_id).await?;
        info!(post_id, "post deleted");
        Ok(())
    }
}
