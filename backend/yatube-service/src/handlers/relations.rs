use actix_web::{web, HttpResponse};

use super::{profile_url, redirect, AppState};
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::posts::post_url;

pub async fn profile_follow(
    username: web::Path<String>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.relations.follow(user.id, &username).await?;
    Ok(redirect(profile_url(&username)))
}

pub async fn profile_unfollow(
    username: web::Path<String>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.relations.unfollow(user.id, &username).await?;
    Ok(redirect(profile_url(&username)))
}

pub async fn like(
    post_id: web::Path<i64>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    state.relations.like(user.id, post_id).await?;
    Ok(redirect(post_url(post_id)))
}

pub async fn unlike(
    post_id: web::Path<i64>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    state.relations.unlike(user.id, post_id).await?;
    Ok(redirect(post_url(post_id)))
}
