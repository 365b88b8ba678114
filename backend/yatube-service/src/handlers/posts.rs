use actix_web::{web, HttpResponse};

use super::{profile_url, redirect, AppState};
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::Viewer;
use crate::services::posts::post_url;
use crate::services::PostForm;

pub async fn post_detail(
    post_id: web::Path<i64>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let detail = state.posts.detail(&viewer, post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn post_create(
    user: AuthenticatedUser,
    form: web::Form<PostForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.posts.create(user.id, form.into_inner()).await?;
    Ok(redirect(profile_url(&user.username)))
}

pub async fn post_edit(
    post_id: web::Path<i64>,
    user: AuthenticatedUser,
    form: web::Form<PostForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    state.posts.edit(user.id, post_id, form.into_inner()).await?;
    Ok(redirect(post_url(post_id)))
}
