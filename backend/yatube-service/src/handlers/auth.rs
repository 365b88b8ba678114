use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::AppState;
use crate::error::Result;
use crate::middleware::JwtKeys;
use crate::services::SignupForm;

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: i64,
    pub username: String,
    pub token: String,
}

/// Create an account and hand back a bearer token for it.
pub async fn signup(
    body: web::Json<SignupForm>,
    state: web::Data<AppState>,
    keys: web::Data<JwtKeys>,
) -> Result<HttpResponse> {
    let user = state.users.signup(body.into_inner()).await?;
    let token = keys.issue_token(&user)?;

    Ok(HttpResponse::Created().json(SignupResponse {
        id: user.id,
        username: user.username,
        token,
    }))
}
