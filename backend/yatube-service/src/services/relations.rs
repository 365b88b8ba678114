//! Follow and like relationships.
//!
//! Both are get-or-create on the way in and idempotent on the way out, so
//! repeating a request never creates a duplicate or fails.

use std::sync::Arc;
use tracing::info;

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{Follow, Like, User};

#[derive(Clone)]
pub struct RelationService {
    store: Arc<dyn ContentStore>,
}

impl RelationService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    async fn author(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))
    }

    async fn require_post(&self, post_id: i64) -> Result<()> {
        match self.store.find_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("post {}", post_id))),
        }
    }

    /// `user_id` follows `username`. Following yourself is allowed.
    pub async fn follow(&self, user_id: i64, username: &str) -> Result<Follow> {
        let author = self.author(username).await?;
        let follow = self.store.create_follow(user_id, author.id).await?;
        info!(user_id, author_id = author.id, follow_id = follow.id, "follow");
        Ok(follow)
    }

    /// Returns whether a follow existed.
    pub async fn unfollow(&self, user_id: i64, username: &str) -> Result<bool> {
        let author = self.author(username).await?;
        let removed = self.store.delete_follow(user_id, author.id).await?;
        info!(user_id, author_id = author.id, removed, "unfollow");
        Ok(removed)
    }

    pub async fn like(&self, user_id: i64, post_id: i64) -> Result<Like> {
        self.require_post(post_id).await?;
        let like = self.store.create_like(post_id, user_id).await?;
        info!(user_id, post_id, "like");
        Ok(like)
    }

    /// Returns whether a like existed.
    pub async fn unlike(&self, user_id: i64, post_id: i64) -> Result<bool> {
        self.require_post(post_id).await?;
        let removed = self.store.delete_like(post_id, user_id).await?;
        info!(user_id, post_id, removed, "unlike");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryContentStore;
    use crate::models::NewPost;

    #[tokio::test]
    async fn test_follow_three_times_keeps_one_row() {
        let store = Arc::new(MemoryContentStore::new());
        let reader = store.create_user("reader").await.unwrap();
        store.create_user("author").await.unwrap();
        let service = RelationService::new(store.clone());

        let first = service.follow(reader.id, "author").await.unwrap();
        service.follow(reader.id, "author").await.unwrap();
        let third = service.follow(reader.id, "author").await.unwrap();

        assert_eq!(first.id, third.id);
        assert_eq!(store.count_following(reader.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unfollow_without_follow_is_noop() {
        let store = Arc::new(MemoryContentStore::new());
        let reader = store.create_user("reader").await.unwrap();
        store.create_user("author").await.unwrap();
        let service = RelationService::new(store.clone());

        assert!(!service.unfollow(reader.id, "author").await.unwrap());
        assert_eq!(store.count_following(reader.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_self_follow_is_allowed() {
        let store = Arc::new(MemoryContentStore::new());
        let me = store.create_user("me").await.unwrap();
        let service = RelationService::new(store.clone());

        service.follow(me.id, "me").await.unwrap();
        assert!(store.is_following(me.id, me.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_unknown_author() {
        let store = Arc::new(MemoryContentStore::new());
        let reader = store.create_user("reader").await.unwrap();
        let service = RelationService::new(store);

        let err = service.follow(reader.id, "ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_like_and_unlike() {
        let store = Arc::new(MemoryContentStore::new());
        let user = store.create_user("user").await.unwrap();
        let post = store
            .create_post(&NewPost {
                author_id: user.id,
                text: "hello".into(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        let service = RelationService::new(store.clone());

        let like = service.like(user.id, post.id).await.unwrap();
        assert!(like.flag);
        service.like(user.id, post.id).await.unwrap();
        assert_eq!(store.count_likes(post.id).await.unwrap(), 1);

        assert!(service.unlike(user.id, post.id).await.unwrap());
        assert!(!service.unlike(user.id, post.id).await.unwrap());

        let err = service.like(user.id, post.id + 1000).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
