use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Comment, Follow, Group, Like, NewGroup, NewPost, Post, PostChanges, PostFilter, User,
};

/// Storage and constraint enforcement for everything the feeds read.
///
/// Implemented by `PgContentStore` (PostgreSQL) and `MemoryContentStore`.
/// Every implementation must honour the same rules:
///
/// - post lists are ordered by `pub_date DESC, id DESC`
/// - deleting a user cascades to their posts, comments, follows and likes
/// - deleting a post cascades to its comments and likes
/// - deleting a group clears `group_id` on its posts
/// - `create_follow` / `create_like` are get-or-create, delete is idempotent
#[async_trait]
pub trait ContentStore: Send + Sync {
    // Users

    /// Fails with a validation error on `username` if it is taken
    async fn create_user(&self, username: &str) -> Result<User>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Returns true if a user was removed
    async fn delete_user(&self, user_id: i64) -> Result<bool>;

    // Groups

    /// Fails with a validation error on `slug` if it is taken
    async fn create_group(&self, group: &NewGroup) -> Result<Group>;

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>>;

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    /// Returns true if a group was removed. Its posts survive ungrouped.
    async fn delete_group(&self, group_id: i64) -> Result<bool>;

    // Posts

    /// Assigns id and `pub_date`. Empty text or an unknown group is a
    /// validation error; an unknown author is `NotFound`.
    async fn create_post(&self, post: &NewPost) -> Result<Post>;

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;

    /// Replaces text, group and image. `pub_date` never changes.
    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Option<Post>>;

    async fn delete_post(&self, post_id: i64) -> Result<bool>;

    async fn count_posts(&self, filter: PostFilter) -> Result<i64>;

    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>>;

    // Comments

    /// `NotFound` if the post does not exist
    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>>;

    /// Oldest first
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>>;

    async fn delete_comment(&self, comment_id: i64) -> Result<bool>;

    // Follows

    /// Returns the existing row when the pair is already present
    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<Follow>;

    /// Returns true if a row was removed; absence is not an error
    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Number of authors `user_id` follows
    async fn count_following(&self, user_id: i64) -> Result<i64>;

    /// Number of users following `author_id`
    async fn count_followers(&self, author_id: i64) -> Result<i64>;

    // Likes

    /// Returns the existing row when the pair is already present
    async fn create_like(&self, post_id: i64, user_id: i64) -> Result<Like>;

    async fn delete_like(&self, post_id: i64, user_id: i64) -> Result<bool>;

    async fn count_likes(&self, post_id: i64) -> Result<i64>;

    async fn has_liked(&self, post_id: i64, user_id: i64) -> Result<bool>;

    /// Health check (optional)
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
