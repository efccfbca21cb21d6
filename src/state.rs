//! Shared application state for all routes.

use crate::service::HostService;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    /// Kept alongside the service for the readiness probe's DB ping.
    pub pool: PgPool,
    pub hosts: HostService,
}
