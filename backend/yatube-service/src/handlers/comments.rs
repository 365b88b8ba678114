use actix_web::{web, HttpResponse};

use super::{redirect, AppState};
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::posts::post_url;
use crate::services::CommentForm;

pub async fn add_comment(
    post_id: web::Path<i64>,
    user: AuthenticatedUser,
    form: web::Form<CommentForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    state
        .comments
        .add(post_id, user.id, form.into_inner())
        .await?;
    Ok(redirect(post_url(post_id)))
}

pub async fn delete_comment(
    path: web::Path<(i64, i64)>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state.comments.delete(post_id, comment_id, user.id).await?;
    Ok(redirect(post_url(post_id)))
}
