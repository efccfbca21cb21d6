//! Host inventory: REST CRUD service for cloud host records backed by
//! PostgreSQL, persisted across a joined resource/host table pair.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod requests;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use model::{Describe, Host, Resource, Set, Vendor};
pub use requests::{QueryHostRequest, UpdateHostBody, UpdateHostRequest, UpdateMode};
pub use routes::{common_routes, host_routes};
pub use service::HostService;
pub use state::AppState;
pub use store::HostStore;
