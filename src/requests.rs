//! Typed requests decoded from query strings and JSON bodies.

use crate::model::{Describe, Resource};
use serde::Deserialize;

fn default_page_size() -> u32 {
    20
}

fn default_page_number() -> u32 {
    1
}

/// Pagination plus an optional substring filter on name.
#[derive(Clone, Debug, Deserialize)]
pub struct QueryHostRequest {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_page_number")]
    pub page_number: u32,
    #[serde(default)]
    pub keywords: String,
}

impl Default for QueryHostRequest {
    fn default() -> Self {
        QueryHostRequest {
            page_size: default_page_size(),
            page_number: default_page_number(),
            keywords: String::new(),
        }
    }
}

impl QueryHostRequest {
    /// Rows to skip. `page_number` is 1-based; values below 1 are treated as 1.
    pub fn offset(&self) -> u32 {
        (self.page_number.max(1) - 1).saturating_mul(self.limit())
    }

    /// Rows per page, never below 1.
    pub fn limit(&self) -> u32 {
        self.page_size.max(1)
    }
}

/// PUT replaces both sub-structures wholesale; PATCH merges non-zero fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    Put,
    Patch,
}

/// Update payload: the target id (from the path) plus a flat Resource+Describe
/// body, interpreted per `mode`.
#[derive(Clone, Debug)]
pub struct UpdateHostRequest {
    pub id: String,
    pub mode: UpdateMode,
    pub resource: Resource,
    pub describe: Describe,
}

/// Flat JSON body for PUT/PATCH: Resource and Describe fields at top level,
/// absent fields defaulting to their zero values.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateHostBody {
    #[serde(flatten)]
    pub resource: Resource,
    #[serde(flatten)]
    pub describe: Describe,
}

impl UpdateHostRequest {
    pub fn put(id: impl Into<String>, body: UpdateHostBody) -> Self {
        UpdateHostRequest {
            id: id.into(),
            mode: UpdateMode::Put,
            resource: body.resource,
            describe: body.describe,
        }
    }

    pub fn patch(id: impl Into<String>, body: UpdateHostBody) -> Self {
        UpdateHostRequest {
            id: id.into(),
            mode: UpdateMode::Patch,
            resource: body.resource,
            describe: body.describe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_apply() {
        let req: QueryHostRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.page_size, 20);
        assert_eq!(req.page_number, 1);
        assert_eq!(req.offset(), 0);
        assert!(req.keywords.is_empty());
    }

    #[test]
    fn offset_skips_prior_pages() {
        let req = QueryHostRequest {
            page_size: 10,
            page_number: 2,
            keywords: String::new(),
        };
        assert_eq!(req.offset(), 10);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn zero_page_values_are_clamped() {
        let req = QueryHostRequest {
            page_size: 0,
            page_number: 0,
            keywords: String::new(),
        };
        assert_eq!(req.limit(), 1);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn update_body_splits_flat_fields() {
        let body: UpdateHostBody =
            serde_json::from_str(r#"{"name":"web-01","cpu":4,"region":"r1"}"#).unwrap();
        let req = UpdateHostRequest::patch("h-001", body);
        assert_eq!(req.mode, UpdateMode::Patch);
        assert_eq!(req.resource.name, "web-01");
        assert_eq!(req.describe.cpu, 4);
        assert_eq!(req.id, "h-001");
    }
}
