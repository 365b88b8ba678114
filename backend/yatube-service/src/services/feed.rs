//! Visibility resolution for the four feeds.
//!
//! Every feed is a read-only query over the content store: pick the post
//! scope, count it, clamp the requested page and fetch that window in
//! `pub_date DESC, id DESC` order.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::metrics::feed::record_feed_request;
use crate::models::{Group, Post, PostFilter, User, Viewer};
use crate::services::pagination::{Page, Paginator};

/// A group with one page of its posts.
#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<Post>,
}

/// An author's profile: one page of their posts plus relationship counters.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    pub author: User,
    /// Total posts by the author
    pub post_count: i64,
    pub follower_count: i64,
    pub following_count: i64,
    /// Whether the viewer currently follows the author; false for anonymous viewers
    pub following: bool,
    pub page: Page<Post>,
}

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn ContentStore>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(store: Arc<dyn ContentStore>, page_size: usize) -> Self {
        Self {
            store,
            paginator: Paginator::new(page_size),
        }
    }

    /// Every post.
    pub async fn global(&self, requested_page: i64) -> Result<Page<Post>> {
        let started = Instant::now();
        let page = self.page_of(PostFilter::All, requested_page).await?;
        record_feed_request("global", started.elapsed());
        Ok(page)
    }

    /// Posts of the group `slug`.
    pub async fn group(&self, slug: &str, requested_page: i64) -> Result<GroupFeed> {
        let started = Instant::now();
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        let page = self
            .page_of(PostFilter::Group(group.id), requested_page)
            .await?;
        record_feed_request("group", started.elapsed());

        Ok(GroupFeed { group, page })
    }

    /// Posts of `username`, seen by `viewer`.
    pub async fn profile(
        &self,
        viewer: &Viewer,
        username: &str,
        requested_page: i64,
    ) -> Result<ProfileFeed> {
        let started = Instant::now();
        let author = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

        let page = self
            .page_of(PostFilter::Author(author.id), requested_page)
            .await?;

        let following = match viewer.user_id() {
            Some(viewer_id) => self.store.is_following(viewer_id, author.id).await?,
            None => false,
        };
        let follower_count = self.store.count_followers(author.id).await?;
        let following_count = self.store.count_following(author.id).await?;
        record_feed_request("profile", started.elapsed());

        Ok(ProfileFeed {
            post_count: page.count as i64,
            author,
            follower_count,
            following_count,
            following,
            page,
        })
    }

    /// Posts by the authors `user_id` follows.
    pub async fn followed(&self, user_id: i64, requested_page: i64) -> Result<Page<Post>> {
        let started = Instant::now();
        let page = self
            .page_of(PostFilter::FollowedBy(user_id), requested_page)
            .await?;
        record_feed_request("followed", started.elapsed());
        Ok(page)
    }

    async fn page_of(&self, filter: PostFilter, requested_page: i64) -> Result<Page<Post>> {
        let count = usize::try_from(self.store.count_posts(filter).await?).unwrap_or(0);
        let number = self.paginator.resolve(count, requested_page);
        let (offset, limit) = self.paginator.window(number);

        let posts = self
            .store
            .list_posts(filter, limit as i64, offset as i64)
            .await?;
        debug!(?filter, count, number, returned = posts.len(), "feed page resolved");

        Ok(self.paginator.page(posts, number, count))
    }
}
