use actix_web::{web, HttpResponse};
use tracing::info;

use super::AppState;
use crate::error::Result;
use crate::services::GroupForm;

/// Drop the cached global feed so the next request recomputes it.
pub async fn clear_feed_cache(state: web::Data<AppState>) -> Result<HttpResponse> {
    let cleared = state.feed_cache.clear().await?;
    info!(key = %state.feed_cache.key(), cleared, "feed cache cleared");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "cleared": cleared })))
}

pub async fn create_group(
    body: web::Json<GroupForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let group = state.groups.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(group))
}

pub async fn delete_group(slug: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    state.groups.delete(&slug).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_user(
    username: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.users.delete(&username).await?;
    Ok(HttpResponse::NoContent().finish())
}
