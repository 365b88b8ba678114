//! In-memory content store
//!
//! Mirrors the PostgreSQL schema (unique constraints, cascades, SET NULL)
//! on plain maps behind a single `RwLock`, so every write is atomic with
//! respect to concurrent readers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, Follow, Group, Like, NewGroup, NewPost, Post, PostChanges, PostFilter, User,
};

#[derive(Debug, Clone)]
struct PostRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    group_id: Option<i64>,
    image: Option<String>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    last_pub_date: Option<DateTime<Utc>>,
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, PostRow>,
    comments: BTreeMap<i64, CommentRow>,
    follows: BTreeMap<i64, Follow>,
    likes: BTreeMap<i64, Like>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Never earlier than the previous post, so creation order and
    /// `pub_date` order agree even if the wall clock steps back.
    fn next_pub_date(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let pub_date = match self.last_pub_date {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_pub_date = Some(pub_date);
        pub_date
    }

    fn matches(&self, row: &PostRow, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => row.group_id == Some(group_id),
            PostFilter::Author(author_id) => row.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .values()
                .any(|f| f.user_id == user_id && f.author_id == row.author_id),
        }
    }

    fn post_view(&self, row: &PostRow) -> Post {
        Post {
            id: row.id,
            text: row.text.clone(),
            pub_date: row.pub_date,
            author_id: row.author_id,
            author_username: self
                .users
                .get(&row.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            group_id: row.group_id,
            group_slug: row
                .group_id
                .and_then(|id| self.groups.get(&id))
                .map(|g| g.slug.clone()),
            image: row.image.clone(),
        }
    }

    fn comment_view(&self, row: &CommentRow) -> Comment {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: self
                .users
                .get(&row.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            text: row.text.clone(),
            created: row.created,
        }
    }

    fn check_post_fields(&self, text: &str, group_id: Option<i64>) -> Result<()> {
        if text.trim().is_empty() {
            return Err(AppError::invalid_field("text", "This field is required."));
        }
        if let Some(group_id) = group_id {
            if !self.groups.contains_key(&group_id) {
                return Err(AppError::invalid_field("group", "Select a valid choice."));
            }
        }
        Ok(())
    }

    fn remove_post(&mut self, post_id: i64) -> bool {
        let removed = self.posts.remove(&post_id).is_some();
        if removed {
            self.comments.retain(|_, c| c.post_id != post_id);
            self.likes.retain(|_, l| l.post_id != post_id);
        }
        removed
    }
}

/// Content store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    state: RwLock<State>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == username) {
            return Err(AppError::invalid_field(
                "username",
                "A user with that username already exists.",
            ));
        }

        let user = User {
            id: state.next_id(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&user_id).is_none() {
            return Ok(false);
        }

        let authored: Vec<i64> = state
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            state.remove_post(post_id);
        }
        state.comments.retain(|_, c| c.author_id != user_id);
        state
            .follows
            .retain(|_, f| f.user_id != user_id && f.author_id != user_id);
        state.likes.retain(|_, l| l.user_id != user_id);

        Ok(true)
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group> {
        let mut state = self.state.write().await;
        if state.groups.values().any(|g| g.slug == group.slug) {
            return Err(AppError::invalid_field(
                "slug",
                "Group with this slug already exists.",
            ));
        }

        let created = Group {
            id: state.next_id(),
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        };
        state.groups.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        Ok(self.state.read().await.groups.get(&group_id).cloned())
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let state = self.state.read().await;
        Ok(state.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn delete_group(&self, group_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.groups.remove(&group_id).is_none() {
            return Ok(false);
        }

        for post in state.posts.values_mut() {
            if post.group_id == Some(group_id) {
                post.group_id = None;
            }
        }
        Ok(true)
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&post.author_id) {
            return Err(AppError::NotFound(format!("user {}", post.author_id)));
        }
        state.check_post_fields(&post.text, post.group_id)?;

        let row = PostRow {
            id: state.next_id(),
            text: post.text.clone(),
            pub_date: state.next_pub_date(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image.clone(),
        };
        let view = state.post_view(&row);
        state.posts.insert(row.id, row);
        Ok(view)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.get(&post_id).map(|row| state.post_view(row)))
    }

    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }
        state.check_post_fields(&changes.text, changes.group_id)?;

        let Some(row) = state.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        row.text = changes.text.clone();
        row.group_id = changes.group_id;
        row.image = changes.image.clone();
        let row = row.clone();

        Ok(Some(state.post_view(&row)))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        Ok(self.state.write().await.remove_post(post_id))
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        let state = self.state.read().await;
        let count = state
            .posts
            .values()
            .filter(|row| state.matches(row, filter))
            .count();
        Ok(count as i64)
    }

    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        let mut rows: Vec<&PostRow> = state
            .posts
            .values()
            .filter(|row| state.matches(row, filter))
            .collect();
        rows.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|row| state.post_view(row))
            .collect())
    }

    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }
        if !state.users.contains_key(&author_id) {
            return Err(AppError::NotFound(format!("user {}", author_id)));
        }
        if text.trim().is_empty() {
            return Err(AppError::invalid_field("text", "This field is required."));
        }

        let row = CommentRow {
            id: state.next_id(),
            post_id,
            author_id,
            text: text.to_string(),
            created: Utc::now(),
        };
        let view = state.comment_view(&row);
        state.comments.insert(row.id, row);
        Ok(view)
    }

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .get(&comment_id)
            .map(|row| state.comment_view(row)))
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let state = self.state.read().await;
        let mut rows: Vec<&CommentRow> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        rows.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));

        Ok(rows.into_iter().map(|row| state.comment_view(row)).collect())
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool> {
        Ok(self
            .state
            .write()
            .await
            .comments
            .remove(&comment_id)
            .is_some())
    }

    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<Follow> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .follows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(existing.clone());
        }
        if !state.users.contains_key(&user_id) || !state.users.contains_key(&author_id) {
            return Err(AppError::NotFound(format!(
                "user {} or {}",
                user_id, author_id
            )));
        }

        let follow = Follow {
            id: state.next_id(),
            user_id,
            author_id,
        };
        state.follows.insert(follow.id, follow.clone());
        Ok(follow)
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|_, f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(state.follows.len() < before)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn count_following(&self, user_id: i64) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.follows.values().filter(|f| f.user_id == user_id).count() as i64)
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .values()
            .filter(|f| f.author_id == author_id)
            .count() as i64)
    }

    async fn create_like(&self, post_id: i64, user_id: i64) -> Result<Like> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .likes
            .values()
            .find(|l| l.post_id == post_id && l.user_id == user_id)
        {
            return Ok(existing.clone());
        }
        if !state.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user {}", user_id)));
        }

        let like = Like {
            id: state.next_id(),
            post_id,
            user_id,
            flag: true,
        };
        state.likes.insert(like.id, like.clone());
        Ok(like)
    }

    async fn delete_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.likes.len();
        state
            .likes
            .retain(|_, l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(state.likes.len() < before)
    }

    async fn count_likes(&self, post_id: i64) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.likes.values().filter(|l| l.post_id == post_id).count() as i64)
    }

    async fn has_liked(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .likes
            .values()
            .any(|l| l.post_id == post_id && l.user_id == user_id))
    }
}
