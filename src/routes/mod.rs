//! Routing tables: the /hosts resource plus common health/version routes.

use crate::handlers::{
    create_host, delete_host, describe_host, patch_host, query_host, update_host,
};
use crate::state::AppState;
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;

/// 1 MiB is plenty for a single host record.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn host_routes(state: AppState) -> Router {
    Router::new()
        .route("/hosts", get(query_host).post(create_host))
        .route(
            "/hosts/:id",
            get(describe_host)
                .put(update_host)
                .patch(patch_host)
                .delete(delete_host),
        )
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadyBody>, (axum::http::StatusCode, Json<ReadyBody>)> {
    if sqlx::query("SELECT 1").fetch_optional(&state.pool).await.is_err() {
        return Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: Some("ok"),
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready (with DB ping), GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
