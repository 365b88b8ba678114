use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use crate::models::{User, Viewer};

/// Bearer token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// HS256 keys plus the login redirect target. Registered as app data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: i64,
    login_url: String,
}

impl JwtKeys {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl_secs: config.token_ttl_secs,
            login_url: config.login_url.clone(),
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now,
            exp: now + self.token_ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| AppError::BadRequest(format!("Invalid token: {}", e)))
    }

    /// Login URL that returns to `next` after signing in
    pub fn login_redirect(&self, next: &str) -> String {
        format!("{}?next={}", self.login_url, urlencoding::encode(next))
    }

    fn viewer_from_request(&self, req: &HttpRequest) -> Viewer {
        let Some(header) = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
        else {
            return Viewer::Anonymous;
        };

        let Some(token) = header.strip_prefix("Bearer ") else {
            warn!("Unsupported Authorization scheme; treating request as anonymous");
            return Viewer::Anonymous;
        };

        let claims = match self.validate_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "JWT validation failed; treating request as anonymous");
                return Viewer::Anonymous;
            }
        };

        match claims.sub.parse::<i64>() {
            Ok(id) => Viewer::User {
                id,
                username: claims.username,
            },
            Err(e) => {
                warn!(sub = %claims.sub, error = %e, "Invalid user id in token");
                Viewer::Anonymous
            }
        }
    }
}

fn resolve_viewer(req: &HttpRequest) -> Viewer {
    match req.app_data::<web::Data<JwtKeys>>() {
        Some(keys) => keys.viewer_from_request(req),
        None => {
            warn!("JwtKeys not registered; every request is anonymous");
            Viewer::Anonymous
        }
    }
}

/// Never fails: a missing or invalid token yields `Viewer::Anonymous`.
impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(resolve_viewer(req)))
    }
}

/// A signed-in viewer. Anonymous requests are redirected to the login page
/// with `next` pointing back at the requested URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match resolve_viewer(req) {
            Viewer::User { id, username } => Ok(AuthenticatedUser { id, username }),
            Viewer::Anonymous => {
                let next = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or_else(|| req.path());
                let login_url = match req.app_data::<web::Data<JwtKeys>>() {
                    Some(keys) => keys.login_redirect(next),
                    None => format!("/auth/login/?next={}", urlencoding::encode(next)),
                };
                Err(AppError::Unauthenticated { login_url })
            }
        };
        ready(result)
    }
}
