//! REST posts endpoint. Reads are public; writes need a bearer token and
//! changes to an existing post are reserved to its author.

use actix_web::{web, HttpResponse};

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::Viewer;
use crate::services::{PostForm, PostPatch};

fn require_user(viewer: &Viewer) -> Result<i64> {
    viewer
        .user_id()
        .ok_or_else(|| AppError::forbidden("Authentication credentials were not provided."))
}

pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = state.posts.list_all().await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn create_post(
    viewer: Viewer,
    body: web::Json<PostForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = require_user(&viewer)?;
    let post = state.posts.create(user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn get_post(post_id: web::Path<i64>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let post = state.posts.get(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT: every editable field is replaced
pub async fn replace_post(
    post_id: web::Path<i64>,
    viewer: Viewer,
    body: web::Json<PostForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = require_user(&viewer)?;
    let form = body.into_inner();
    let patch = PostPatch {
        text: Some(form.text),
        group: Some(form.group),
        image: Some(form.image),
    };

    let post = state
        .posts
        .update(user_id, post_id.into_inner(), patch)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PATCH: only the fields present in the body change
pub async fn patch_post(
    post_id: web::Path<i64>,
    viewer: Viewer,
    body: web::Json<PostPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = require_user(&viewer)?;
    let post = state
        .posts
        .update(user_id, post_id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    post_id: web::Path<i64>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = require_user(&viewer)?;
    state.posts.delete(user_id, post_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
