#![allow(dead_code)]

use actix_web::{dev::ServiceResponse, http::header, web};
use std::sync::Arc;

use yatube_service::cache::{FeedCache, MemoryFeedCacheStore};
use yatube_service::config::{AuthConfig, FeedConfig};
use yatube_service::db::{ContentStore, MemoryContentStore};
use yatube_service::handlers::AppState;
use yatube_service::middleware::JwtKeys;
use yatube_service::models::{NewGroup, NewPost, Post, User};

/// Initialise the full route table over a `TestContext`.
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .app_data($ctx.keys.clone())
                .configure(|cfg| {
                    yatube_service::handlers::configure(
                        cfg,
                        Some($crate::common::ADMIN_TOKEN.to_string()),
                    )
                }),
        )
        .await
    };
}

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub struct TestContext {
    pub store: Arc<MemoryContentStore>,
    pub state: web::Data<AppState>,
    pub keys: web::Data<JwtKeys>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_feed_config(FeedConfig::default())
    }

    pub fn with_feed_config(feed: FeedConfig) -> Self {
        let store = Arc::new(MemoryContentStore::new());
        let feed_cache = FeedCache::new(Arc::new(MemoryFeedCacheStore::new()), &feed);
        let state = AppState::new(store.clone(), feed_cache, &feed);
        let keys = JwtKeys::from_config(&AuthConfig {
            jwt_secret: "integration-secret".into(),
            token_ttl_secs: 3600,
            login_url: "/auth/login/".into(),
        });

        Self {
            store,
            state: web::Data::new(state),
            keys: web::Data::new(keys),
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.store.create_user(username).await.unwrap()
    }

    pub fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        let token = self.keys.issue_token(user).unwrap();
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    pub async fn group(&self, slug: &str) -> i64 {
        self.store
            .create_group(&NewGroup {
                title: format!("Group {}", slug),
                slug: slug.to_string(),
                description: String::new(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn post(&self, author: &User, text: &str, group_id: Option<i64>) -> Post {
        self.store
            .create_post(&NewPost {
                author_id: author.id,
                text: text.to_string(),
                group_id,
                image: None,
            })
            .await
            .unwrap()
    }
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
