//! Host CRUD handlers: decode the request, call the service, serialize the
//! domain object back as JSON. Errors map to the ErrorBody envelope via
//! `AppError::into_response`.

use crate::error::AppError;
use crate::model::{Host, Set};
use crate::requests::{QueryHostRequest, UpdateHostBody, UpdateHostRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};

/// POST /hosts — body is a flat Host object; id and create_at are assigned
/// when absent.
pub async fn create_host(
    State(state): State<AppState>,
    Json(body): Json<Host>,
) -> Result<Json<Host>, AppError> {
    let created = state.hosts.create_host(body).await?;
    Ok(Json(created))
}

/// GET /hosts?page_size=&page_number=&keywords=
pub async fn query_host(
    State(state): State<AppState>,
    Query(req): Query<QueryHostRequest>,
) -> Result<Json<Set>, AppError> {
    let set = state.hosts.query_host(&req).await?;
    Ok(Json(set))
}

/// GET /hosts/{id}
pub async fn describe_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Host>, AppError> {
    let host = state.hosts.describe_host(&id).await?;
    Ok(Json(host))
}

/// PUT /hosts/{id} — full replacement of Resource and Describe.
pub async fn update_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateHostBody>,
) -> Result<Json<Host>, AppError> {
    let updated = state.hosts.update_host(UpdateHostRequest::put(id, body)).await?;
    Ok(Json(updated))
}

/// PATCH /hosts/{id} — merge of non-zero/non-empty fields.
pub async fn patch_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateHostBody>,
) -> Result<Json<Host>, AppError> {
    let updated = state.hosts.update_host(UpdateHostRequest::patch(id, body)).await?;
    Ok(Json(updated))
}

/// DELETE /hosts/{id} — returns the pre-deletion snapshot.
pub async fn delete_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Host>, AppError> {
    let deleted = state.hosts.delete_host(&id).await?;
    Ok(Json(deleted))
}
