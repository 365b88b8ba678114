use actix_web::{http::header::ContentType, web, HttpRequest, HttpResponse};
use tracing::debug;

use super::{requested_page, AppState};
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::Viewer;

const CACHE_STATUS_HEADER: &str = "X-Feed-Cache";

/// Global feed.
///
/// Served from the feed cache while an entry is live, whatever page was
/// asked for; otherwise rendered, cached and returned.
pub async fn index(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if let Some(body) = state.feed_cache.read().await {
        return Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .insert_header((CACHE_STATUS_HEADER, "hit"))
            .body(body));
    }

    let page = state.feeds.global(requested_page(&req)).await?;
    let body = serde_json::to_string(&page)?;
    state.feed_cache.write(&body).await;
    debug!(page = page.number, "global feed rendered");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .insert_header((CACHE_STATUS_HEADER, "miss"))
        .body(body))
}

pub async fn group_posts(
    req: HttpRequest,
    slug: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let feed = state.feeds.group(&slug, requested_page(&req)).await?;
    Ok(HttpResponse::Ok().json(feed))
}

pub async fn profile(
    req: HttpRequest,
    username: web::Path<String>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let feed = state
        .feeds
        .profile(&viewer, &username, requested_page(&req))
        .await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// Posts by the authors the viewer follows.
pub async fn follow_index(
    req: HttpRequest,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let page = state.feeds.followed(user.id, requested_page(&req)).await?;
    Ok(HttpResponse::Ok().json(page))
}
