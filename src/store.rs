//! Persistence gateway: owns the connection pool and translates domain
//! operations into SQL against the resource/host table pair. Create, Update,
//! and Delete span both tables and run inside one transaction each; the
//! transaction commits on the success path and rolls back on drop otherwise.

use crate::error::AppError;
use crate::model::{now_millis, Host, Set, Vendor};
use crate::requests::QueryHostRequest;
use crate::sql::{
    HostQuery, DELETE_HOST, DELETE_RESOURCE, INSERT_HOST, INSERT_RESOURCE, UPDATE_HOST,
    UPDATE_RESOURCE,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Bootstrap DDL. Timestamps are millisecond epoch BIGINTs so the database
/// never applies a timezone to them.
const RESOURCE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS resource (
    id            TEXT PRIMARY KEY,
    vendor        SMALLINT NOT NULL DEFAULT 0,
    region        TEXT NOT NULL,
    zone          TEXT NOT NULL DEFAULT '',
    create_at     BIGINT NOT NULL DEFAULT 0,
    expire_at     BIGINT NOT NULL DEFAULT 0,
    category      TEXT NOT NULL DEFAULT '',
    "type"        TEXT NOT NULL,
    instance_id   TEXT NOT NULL DEFAULT '',
    name          TEXT NOT NULL,
    description   TEXT NOT NULL DEFAULT '',
    status        TEXT NOT NULL DEFAULT '',
    update_at     BIGINT NOT NULL DEFAULT 0,
    sync_at       BIGINT NOT NULL DEFAULT 0,
    accout        TEXT NOT NULL DEFAULT '',
    public_ip     TEXT NOT NULL DEFAULT '',
    private_ip    TEXT NOT NULL DEFAULT '',
    pay_type      TEXT NOT NULL DEFAULT '',
    describe_hash TEXT NOT NULL DEFAULT '',
    resource_hash TEXT NOT NULL DEFAULT ''
)
"#;

const HOST_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS host (
    resource_id                TEXT PRIMARY KEY,
    cpu                        INTEGER NOT NULL DEFAULT 0,
    memory                     INTEGER NOT NULL DEFAULT 0,
    gpu_amount                 INTEGER NOT NULL DEFAULT 0,
    gpu_spec                   TEXT NOT NULL DEFAULT '',
    os_type                    TEXT NOT NULL DEFAULT '',
    os_name                    TEXT NOT NULL DEFAULT '',
    serial_number              TEXT NOT NULL DEFAULT '',
    image_id                   TEXT NOT NULL DEFAULT '',
    internet_max_bandwidth_out INTEGER NOT NULL DEFAULT 0,
    internet_max_bandwidth_in  INTEGER NOT NULL DEFAULT 0,
    key_pair_name              TEXT NOT NULL DEFAULT '',
    security_groups            TEXT NOT NULL DEFAULT ''
)
"#;

const CREATE_AT_INDEX_DDL: &str =
    "CREATE INDEX IF NOT EXISTS idx_resource_create_at ON resource (create_at DESC)";

#[derive(Clone)]
pub struct HostStore {
    pool: PgPool,
}

impl HostStore {
    pub fn new(pool: PgPool) -> Self {
        HostStore { pool }
    }

    /// Create the resource/host tables if they do not exist. Call once at
    /// startup, before serving requests.
    pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
        for ddl in [RESOURCE_DDL, HOST_DDL, CREATE_AT_INDEX_DDL] {
            sqlx::query(ddl).execute(pool).await?;
        }
        Ok(())
    }

    /// Insert one host across both tables, all-or-nothing. Assigns an id when
    /// unset and stamps `create_at` when zero; returns the populated host.
    pub async fn create_host(&self, mut host: Host) -> Result<Host, AppError> {
        if host.resource.id.is_empty() {
            host.resource.id = uuid::Uuid::new_v4().simple().to_string();
        }
        if host.resource.create_at == 0 {
            host.resource.create_at = now_millis();
        }

        let mut tx = self.pool.begin().await?;
        tracing::debug!(id = %host.resource.id, "insert resource");
        sqlx::query(INSERT_RESOURCE)
            .bind(&host.resource.id)
            .bind(host.resource.vendor.code())
            .bind(&host.resource.region)
            .bind(&host.resource.zone)
            .bind(host.resource.create_at)
            .bind(host.resource.expire_at)
            .bind(&host.resource.category)
            .bind(&host.resource.type_)
            .bind(&host.resource.instance_id)
            .bind(&host.resource.name)
            .bind(&host.resource.description)
            .bind(&host.resource.status)
            .bind(host.resource.update_at)
            .bind(host.resource.sync_at)
            .bind(&host.resource.sync_account)
            .bind(&host.resource.public_ip)
            .bind(&host.resource.private_ip)
            .bind(&host.resource.pay_type)
            .bind(&host.describe_hash)
            .bind(&host.resource_hash)
            .execute(&mut *tx)
            .await?;

        tracing::debug!(id = %host.resource.id, "insert host describe");
        sqlx::query(INSERT_HOST)
            .bind(&host.resource.id)
            .bind(host.describe.cpu)
            .bind(host.describe.memory)
            .bind(host.describe.gpu_amount)
            .bind(&host.describe.gpu_spec)
            .bind(&host.describe.os_type)
            .bind(&host.describe.os_name)
            .bind(&host.describe.serial_number)
            .bind(&host.describe.image_id)
            .bind(host.describe.internet_max_bandwidth_out)
            .bind(host.describe.internet_max_bandwidth_in)
            .bind(&host.describe.key_pair_name)
            .bind(&host.describe.security_groups)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(host)
    }

    /// Page through the joined tables, newest first, with an optional LIKE
    /// filter on name. `total` counts all matching rows regardless of paging.
    pub async fn query_host(&self, req: &QueryHostRequest) -> Result<Set, AppError> {
        let query = HostQuery::new()
            .keywords(&req.keywords)
            .order_by_create_at_desc()
            .page(req.limit(), req.offset());

        let page = query.build_query();
        tracing::debug!(sql = %page.sql, params = ?page.params, "query hosts");
        let mut page_query = sqlx::query(&page.sql);
        for p in &page.params {
            page_query = page_query.bind(p);
        }
        let rows = page_query.fetch_all(&self.pool).await?;

        let mut set = Set::new();
        for row in &rows {
            set.add(host_from_row(row)?);
        }

        let count = query.build_count();
        tracing::debug!(sql = %count.sql, "count hosts");
        let mut count_query = sqlx::query_scalar(&count.sql);
        for p in &count.params {
            count_query = count_query.bind(p);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;
        set.total = total;

        Ok(set)
    }

    /// Fetch one host by id via the same join.
    pub async fn describe_host(&self, id: &str) -> Result<Host, AppError> {
        let buf = HostQuery::new().id(id).build_query();
        tracing::debug!(sql = %buf.sql, id = %id, "describe host");
        let mut describe_query = sqlx::query(&buf.sql);
        for p in &buf.params {
            describe_query = describe_query.bind(p);
        }
        let row = describe_query.fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(host_from_row(&row)?),
            None => Err(AppError::NotFound(format!("host {} not found", id))),
        }
    }

    /// Persist an updated host: mutable resource columns and all describe
    /// columns, keyed by id, in one transaction.
    pub async fn update_host(&self, host: &Host) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        tracing::debug!(id = %host.resource.id, "update resource");
        sqlx::query(UPDATE_RESOURCE)
            .bind(host.resource.vendor.code())
            .bind(&host.resource.region)
            .bind(&host.resource.zone)
            .bind(host.resource.expire_at)
            .bind(&host.resource.name)
            .bind(&host.resource.description)
            .bind(host.resource.update_at)
            .bind(&host.resource.id)
            .execute(&mut *tx)
            .await?;

        tracing::debug!(id = %host.resource.id, "update host describe");
        sqlx::query(UPDATE_HOST)
            .bind(host.describe.cpu)
            .bind(host.describe.memory)
            .bind(host.describe.gpu_amount)
            .bind(&host.describe.gpu_spec)
            .bind(&host.describe.os_type)
            .bind(&host.describe.os_name)
            .bind(&host.describe.serial_number)
            .bind(&host.describe.image_id)
            .bind(host.describe.internet_max_bandwidth_out)
            .bind(host.describe.internet_max_bandwidth_in)
            .bind(&host.describe.key_pair_name)
            .bind(&host.describe.security_groups)
            .bind(&host.resource.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove one host from both tables, all-or-nothing. Returns the
    /// pre-deletion snapshot; absent id fails with NotFound before any write.
    pub async fn delete_host(&self, id: &str) -> Result<Host, AppError> {
        let snapshot = self.describe_host(id).await?;

        let mut tx = self.pool.begin().await?;
        tracing::debug!(id = %id, "delete resource");
        sqlx::query(DELETE_RESOURCE).bind(id).execute(&mut *tx).await?;
        tracing::debug!(id = %id, "delete host describe");
        sqlx::query(DELETE_HOST).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(snapshot)
    }
}

/// Map one joined row back into a Host. Lookups are by column name; the
/// builder's select list aliases nothing, so names match the DDL.
fn host_from_row(row: &PgRow) -> Result<Host, sqlx::Error> {
    let mut host = Host::default();

    host.resource.id = row.try_get("id")?;
    let vendor: i16 = row.try_get("vendor")?;
    host.resource.vendor =
        Vendor::from_code(vendor).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "vendor".into(),
            source: format!("unknown vendor code {}", vendor).into(),
        })?;
    host.resource.region = row.try_get("region")?;
    host.resource.zone = row.try_get("zone")?;
    host.resource.create_at = row.try_get("create_at")?;
    host.resource.expire_at = row.try_get("expire_at")?;
    host.resource.category = row.try_get("category")?;
    host.resource.type_ = row.try_get("type")?;
    host.resource.instance_id = row.try_get("instance_id")?;
    host.resource.name = row.try_get("name")?;
    host.resource.description = row.try_get("description")?;
    host.resource.status = row.try_get("status")?;
    host.resource.update_at = row.try_get("update_at")?;
    host.resource.sync_at = row.try_get("sync_at")?;
    host.resource.sync_account = row.try_get("accout")?;
    host.resource.public_ip = row.try_get("public_ip")?;
    host.resource.private_ip = row.try_get("private_ip")?;
    host.resource.pay_type = row.try_get("pay_type")?;
    host.describe_hash = row.try_get("describe_hash")?;
    host.resource_hash = row.try_get("resource_hash")?;

    host.describe.cpu = row.try_get("cpu")?;
    host.describe.memory = row.try_get("memory")?;
    host.describe.gpu_amount = row.try_get("gpu_amount")?;
    host.describe.gpu_spec = row.try_get("gpu_spec")?;
    host.describe.os_type = row.try_get("os_type")?;
    host.describe.os_name = row.try_get("os_name")?;
    host.describe.serial_number = row.try_get("serial_number")?;
    host.describe.image_id = row.try_get("image_id")?;
    host.describe.internet_max_bandwidth_out = row.try_get("internet_max_bandwidth_out")?;
    host.describe.internet_max_bandwidth_in = row.try_get("internet_max_bandwidth_in")?;
    host.describe.key_pair_name = row.try_get("key_pair_name")?;
    host.describe.security_groups = row.try_get("security_groups")?;

    Ok(host)
}
