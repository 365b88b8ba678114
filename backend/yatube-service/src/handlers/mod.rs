/// HTTP handlers
///
/// Thin adapters: extract the viewer and request scope, call a service,
/// turn the result into JSON or a redirect.
///
/// - `feed`: global, group, profile and followed feeds
/// - `posts`: detail, create, edit
/// - `comments`, `relations`: comment, follow and like mutations
/// - `api`: REST posts endpoint
/// - `auth`: sign-up
/// - `internal`: operational endpoints behind the admin token
/// - `health`: liveness and readiness
pub mod api;
pub mod auth;
pub mod comments;
pub mod feed;
pub mod health;
pub mod internal;
pub mod posts;
pub mod relations;

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

use crate::cache::FeedCache;
use crate::config::FeedConfig;
use crate::db::ContentStore;
use crate::metrics::serve_metrics;
use crate::middleware::AdminTokenGuard;
use crate::services::{
    parse_page, CommentService, FeedService, GroupService, PostService, RelationService,
    UserService,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub feed_cache: FeedCache,
    pub feeds: FeedService,
    pub posts: PostService,
    pub comments: CommentService,
    pub relations: RelationService,
    pub users: UserService,
    pub groups: GroupService,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, feed_cache: FeedCache, feed: &FeedConfig) -> Self {
        Self {
            feeds: FeedService::new(store.clone(), feed.page_size),
            posts: PostService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            relations: RelationService::new(store.clone()),
            users: UserService::new(store.clone()),
            groups: GroupService::new(store.clone()),
            feed_cache,
            store,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<String>,
}

/// `?page=` of the request; unparseable query strings read as page 1
pub(crate) fn requested_page(req: &HttpRequest) -> i64 {
    let query = web::Query::<PageQuery>::from_query(req.query_string()).ok();
    parse_page(query.as_ref().and_then(|q| q.page.as_deref()))
}

pub(crate) fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig, admin_token: Option<String>) {
    cfg.route("/health", web::get().to(health::liveness))
        .route("/health/ready", web::get().to(health::readiness))
        .route("/metrics", web::get().to(serve_metrics))
        // Feeds
        .route("/", web::get().to(feed::index))
        .route("/group/{slug}/", web::get().to(feed::group_posts))
        .route("/follow/", web::get().to(feed::follow_index))
        .route("/profile/{username}/", web::get().to(feed::profile))
        // Relationships
        .route(
            "/profile/{username}/follow/",
            web::post().to(relations::profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            web::post().to(relations::profile_unfollow),
        )
        // Posts
        .route("/create/", web::post().to(posts::post_create))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .route("/posts/{post_id}/edit/", web::post().to(posts::post_edit))
        .route(
            "/posts/{post_id}/comment/",
            web::post().to(comments::add_comment),
        )
        .route(
            "/posts/{post_id}/comments/{comment_id}/delete/",
            web::post().to(comments::delete_comment),
        )
        .route("/posts/{post_id}/like/", web::post().to(relations::like))
        .route("/posts/{post_id}/unlike/", web::post().to(relations::unlike))
        // Accounts
        .route("/auth/signup/", web::post().to(auth::signup))
        // REST API
        .service(
            web::scope("/api/v1/posts")
                .service(
                    web::resource("/")
                        .route(web::get().to(api::list_posts))
                        .route(web::post().to(api::create_post)),
                )
                .service(
                    web::resource("/{post_id}/")
                        .route(web::get().to(api::get_post))
                        .route(web::put().to(api::replace_post))
                        .route(web::patch().to(api::patch_post))
                        .route(web::delete().to(api::delete_post)),
                ),
        )
        // Operations
        .service(
            web::scope("/internal")
                .wrap(AdminTokenGuard::new(admin_token))
                .route(
                    "/cache/feed/clear",
                    web::post().to(internal::clear_feed_cache),
                )
                .route("/groups", web::post().to(internal::create_group))
                .route("/groups/{slug}", web::delete().to(internal::delete_group))
                .route(
                    "/users/{username}",
                    web::delete().to(internal::delete_user),
                ),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_requested_page() {
        let req = TestRequest::get().uri("/?page=4").to_http_request();
        assert_eq!(requested_page(&req), 4);

        let req = TestRequest::get().uri("/?page=four").to_http_request();
        assert_eq!(requested_page(&req), 1);

        let req = TestRequest::get().uri("/").to_http_request();
        assert_eq!(requested_page(&req), 1);

        let req = TestRequest::get().uri("/?page=1&page=2").to_http_request();
        assert_eq!(requested_page(&req), 1);
    }

    #[test]
    fn test_profile_url_escapes_username() {
        assert_eq!(profile_url("leo"), "/profile/leo/");
        assert_eq!(profile_url("a+b@c"), "/profile/a%2Bb%40c/");
    }
}
