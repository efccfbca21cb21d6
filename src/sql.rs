//! Parameterized SQL for the resource/host table pair: static statements for
//! the write paths and a small builder for the joined read path. Identifiers
//! are fixed here; every user-supplied value binds through a `$n` placeholder.

/// Insert column order; `create_host` binds values in this order.
pub const INSERT_RESOURCE: &str = r#"
INSERT INTO resource (
    id, vendor, region, zone, create_at, expire_at, category, "type",
    instance_id, name, description, status, update_at, sync_at, accout,
    public_ip, private_ip, pay_type, describe_hash, resource_hash
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
"#;

pub const INSERT_HOST: &str = r#"
INSERT INTO host (
    resource_id, cpu, memory, gpu_amount, gpu_spec, os_type, os_name,
    serial_number, image_id, internet_max_bandwidth_out,
    internet_max_bandwidth_in, key_pair_name, security_groups
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
"#;

/// Mutable resource columns only; id and create_at are never rewritten.
pub const UPDATE_RESOURCE: &str = "UPDATE resource SET vendor = $1, region = $2, zone = $3, expire_at = $4, name = $5, description = $6, update_at = $7 WHERE id = $8";

pub const UPDATE_HOST: &str = "UPDATE host SET cpu = $1, memory = $2, gpu_amount = $3, gpu_spec = $4, os_type = $5, os_name = $6, serial_number = $7, image_id = $8, internet_max_bandwidth_out = $9, internet_max_bandwidth_in = $10, key_pair_name = $11, security_groups = $12 WHERE resource_id = $13";

pub const DELETE_RESOURCE: &str = "DELETE FROM resource WHERE id = $1";

pub const DELETE_HOST: &str = "DELETE FROM host WHERE resource_id = $1";

/// Select list for the joined read path. Order matches `host_from_row`.
const SELECT_COLUMNS: &str = "r.id, r.vendor, r.region, r.zone, r.create_at, r.expire_at, r.category, r.\"type\", r.instance_id, r.name, r.description, r.status, r.update_at, r.sync_at, r.accout, r.public_ip, r.private_ip, r.pay_type, r.describe_hash, r.resource_hash, h.cpu, h.memory, h.gpu_amount, h.gpu_spec, h.os_type, h.os_name, h.serial_number, h.image_id, h.internet_max_bandwidth_out, h.internet_max_bandwidth_in, h.key_pair_name, h.security_groups";

const FROM_JOINED: &str = "FROM resource AS r LEFT JOIN host AS h ON r.id = h.resource_id";

/// A rendered statement plus its bind values, in placeholder order.
#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<String>,
}

/// Builder for the joined host query. Accumulated WHERE clauses are shared by
/// `build_query` and `build_count`, so `total` always reflects the same filter
/// as the page itself.
#[derive(Debug, Default)]
pub struct HostQuery {
    wheres: Vec<String>,
    params: Vec<String>,
    order_desc: bool,
    page: Option<(u32, u32)>,
}

impl HostQuery {
    pub fn new() -> Self {
        HostQuery::default()
    }

    /// Substring filter on name. Empty keywords add no clause.
    pub fn keywords(mut self, keywords: &str) -> Self {
        if !keywords.is_empty() {
            self.params.push(format!("%{}%", keywords));
            self.wheres.push(format!("r.name LIKE ${}", self.params.len()));
        }
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.params.push(id.to_string());
        self.wheres.push(format!("r.id = ${}", self.params.len()));
        self
    }

    pub fn order_by_create_at_desc(mut self) -> Self {
        self.order_desc = true;
        self
    }

    /// LIMIT/OFFSET rendered inline; both values are unsigned integers, never
    /// raw user text.
    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.page = Some((limit, offset));
        self
    }

    fn where_clause(&self) -> String {
        if self.wheres.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.wheres.join(" AND "))
        }
    }

    pub fn build_query(&self) -> QueryBuf {
        let mut sql = format!("SELECT {} {}{}", SELECT_COLUMNS, FROM_JOINED, self.where_clause());
        if self.order_desc {
            sql.push_str(" ORDER BY r.create_at DESC");
        }
        if let Some((limit, offset)) = self.page {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        }
        QueryBuf {
            sql,
            params: self.params.clone(),
        }
    }

    /// Count variant: same FROM and WHERE, no ordering or paging.
    pub fn build_count(&self) -> QueryBuf {
        QueryBuf {
            sql: format!("SELECT COUNT(*) {}{}", FROM_JOINED, self.where_clause()),
            params: self.params.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_without_keywords_has_no_where() {
        let q = HostQuery::new().keywords("").order_by_create_at_desc().page(20, 0);
        let buf = q.build_query();
        assert!(!buf.sql.contains("WHERE"));
        assert!(buf.sql.ends_with("ORDER BY r.create_at DESC LIMIT 20 OFFSET 0"));
        assert!(buf.params.is_empty());
    }

    #[test]
    fn keywords_bind_as_like_pattern() {
        let buf = HostQuery::new().keywords("web").page(10, 10).build_query();
        assert!(buf.sql.contains("r.name LIKE $1"));
        assert!(buf.sql.contains("LIMIT 10 OFFSET 10"));
        assert_eq!(buf.params, vec!["%web%".to_string()]);
    }

    #[test]
    fn count_shares_where_but_not_paging() {
        let q = HostQuery::new().keywords("web").order_by_create_at_desc().page(10, 20);
        let count = q.build_count();
        assert!(count.sql.starts_with("SELECT COUNT(*)"));
        assert!(count.sql.contains("r.name LIKE $1"));
        assert!(!count.sql.contains("LIMIT"));
        assert!(!count.sql.contains("ORDER BY"));
        assert_eq!(count.params, q.build_query().params);
    }

    #[test]
    fn id_filter_binds_first_placeholder() {
        let buf = HostQuery::new().id("h-001").build_query();
        assert!(buf.sql.contains("r.id = $1"));
        assert_eq!(buf.params, vec!["h-001".to_string()]);
    }
}
