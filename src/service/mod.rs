//! Host service: thin orchestration over the persistence gateway. Writes are
//! validated before they reach storage; reads delegate straight through.

use crate::error::AppError;
use crate::model::{now_millis, Host, Set};
use crate::requests::{QueryHostRequest, UpdateHostRequest, UpdateMode};
use crate::store::HostStore;

#[derive(Clone)]
pub struct HostService {
    store: HostStore,
}

impl HostService {
    pub fn new(store: HostStore) -> Self {
        HostService { store }
    }

    /// Validate, then insert across both tables. Ids and create_at are
    /// server-assigned when unset, before the required-field check runs.
    pub async fn create_host(&self, mut host: Host) -> Result<Host, AppError> {
        if host.resource.id.is_empty() {
            host.resource.id = uuid::Uuid::new_v4().simple().to_string();
        }
        if host.resource.create_at == 0 {
            host.resource.create_at = now_millis();
        }
        host.validate()?;
        self.store.create_host(host).await
    }

    pub async fn query_host(&self, req: &QueryHostRequest) -> Result<Set, AppError> {
        self.store.query_host(req).await
    }

    pub async fn describe_host(&self, id: &str) -> Result<Host, AppError> {
        self.store.describe_host(id).await
    }

    /// Re-read, apply the requested update mode in memory, re-validate, then
    /// persist. Concurrent updates to the same id may race; last write wins.
    pub async fn update_host(&self, req: UpdateHostRequest) -> Result<Host, AppError> {
        let mut host = self.store.describe_host(&req.id).await?;

        match req.mode {
            UpdateMode::Put => host.update(req.resource, req.describe),
            UpdateMode::Patch => host.patch(&req.resource, &req.describe)?,
        }
        // A full replace takes its id from the request body; the path id is
        // authoritative either way.
        host.resource.id = req.id;

        host.validate()?;
        self.store.update_host(&host).await?;
        Ok(host)
    }

    pub async fn delete_host(&self, id: &str) -> Result<Host, AppError> {
        self.store.delete_host(id).await
    }
}
