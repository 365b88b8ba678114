use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::warn;

use super::AppState;

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Ready when the content store answers. A failing cache only degrades
/// the service, since every feed can be recomputed.
pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    let store = state.store.health_check().await;
    let cache = state.feed_cache.health_check().await;

    if let Err(e) = &store {
        warn!(error = %e, "content store health check failed");
    }
    if let Err(e) = &cache {
        warn!(error = %e, "feed cache health check failed");
    }

    let body = json!({
        "status": if store.is_err() { "unavailable" } else if cache.is_err() { "degraded" } else { "ok" },
        "checks": {
            "store": store.is_ok(),
            "cache": cache.is_ok(),
        },
    });

    if store.is_ok() {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
