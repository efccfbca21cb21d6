//! Host domain model: a generic cloud-resource envelope (`Resource`) composed
//! with host-specific attributes (`Describe`), plus validation and the two
//! update semantics (full replace vs. field-wise merge).

use crate::error::AppError;
use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Millisecond epoch timestamp. All stored timestamps use this resolution so
/// the database never applies a timezone to them.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Cloud provider, stored and serialized as its integer code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Vendor {
    #[default]
    AliCloud,
    TencentCloud,
    HuaweiCloud,
}

impl Vendor {
    pub fn code(self) -> i16 {
        match self {
            Vendor::AliCloud => 0,
            Vendor::TencentCloud => 1,
            Vendor::HuaweiCloud => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Vendor::AliCloud),
            1 => Some(Vendor::TencentCloud),
            2 => Some(Vendor::HuaweiCloud),
            _ => None,
        }
    }
}

impl Serialize for Vendor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.code())
    }
}

impl<'de> Deserialize<'de> for Vendor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i16::deserialize(deserializer)?;
        Vendor::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown vendor code {}", code)))
    }
}

/// Generic cloud-asset metadata shared by any resource type.
///
/// `tags` is wire-level only; the resource table has no tags column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub id: String,
    pub vendor: Vendor,
    pub region: String,
    pub zone: String,
    pub create_at: i64,
    pub expire_at: i64,
    pub category: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub instance_id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub tags: HashMap<String, String>,
    pub update_at: i64,
    pub sync_at: i64,
    pub sync_account: String,
    pub public_ip: String,
    pub private_ip: String,
    pub pay_type: String,
}

impl Resource {
    /// Overwrite each field from `src` only when the incoming value is
    /// non-zero/non-empty. Fields absent from a partial payload deserialize to
    /// their zero values and are skipped.
    pub fn merge(&mut self, src: &Resource) {
        merge_str(&mut self.id, &src.id);
        if src.vendor != Vendor::default() {
            self.vendor = src.vendor;
        }
        merge_str(&mut self.region, &src.region);
        merge_str(&mut self.zone, &src.zone);
        merge_i64(&mut self.create_at, src.create_at);
        merge_i64(&mut self.expire_at, src.expire_at);
        merge_str(&mut self.category, &src.category);
        merge_str(&mut self.type_, &src.type_);
        merge_str(&mut self.instance_id, &src.instance_id);
        merge_str(&mut self.name, &src.name);
        merge_str(&mut self.description, &src.description);
        merge_str(&mut self.status, &src.status);
        if !src.tags.is_empty() {
            self.tags = src.tags.clone();
        }
        merge_i64(&mut self.update_at, src.update_at);
        merge_i64(&mut self.sync_at, src.sync_at);
        merge_str(&mut self.sync_account, &src.sync_account);
        merge_str(&mut self.public_ip, &src.public_ip);
        merge_str(&mut self.private_ip, &src.private_ip);
        merge_str(&mut self.pay_type, &src.pay_type);
    }
}

/// Host-specific hardware/software attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Describe {
    pub cpu: i32,
    pub memory: i32,
    pub gpu_amount: i32,
    pub gpu_spec: String,
    pub os_type: String,
    pub os_name: String,
    pub serial_number: String,
    pub image_id: String,
    /// Mbps.
    pub internet_max_bandwidth_out: i32,
    /// Mbps.
    pub internet_max_bandwidth_in: i32,
    pub key_pair_name: String,
    /// Comma-joined security group ids.
    pub security_groups: String,
}

impl Describe {
    pub fn merge(&mut self, src: &Describe) {
        merge_i32(&mut self.cpu, src.cpu);
        merge_i32(&mut self.memory, src.memory);
        merge_i32(&mut self.gpu_amount, src.gpu_amount);
        merge_str(&mut self.gpu_spec, &src.gpu_spec);
        merge_str(&mut self.os_type, &src.os_type);
        merge_str(&mut self.os_name, &src.os_name);
        merge_str(&mut self.serial_number, &src.serial_number);
        merge_str(&mut self.image_id, &src.image_id);
        merge_i32(&mut self.internet_max_bandwidth_out, src.internet_max_bandwidth_out);
        merge_i32(&mut self.internet_max_bandwidth_in, src.internet_max_bandwidth_in);
        merge_str(&mut self.key_pair_name, &src.key_pair_name);
        merge_str(&mut self.security_groups, &src.security_groups);
    }
}

fn merge_str(dst: &mut String, src: &str) {
    if !src.is_empty() {
        *dst = src.to_string();
    }
}

fn merge_i64(dst: &mut i64, src: i64) {
    if src != 0 {
        *dst = src;
    }
}

fn merge_i32(dst: &mut i32, src: i32) {
    if src != 0 {
        *dst = src;
    }
}

/// Composed entity: one Resource + one Describe. The two hash fields are
/// reserved for change detection and are stored and returned as-is.
///
/// Serialized flat: Resource and Describe fields sit at the top level of the
/// JSON object next to the hashes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    pub resource_hash: String,
    pub describe_hash: String,
    #[serde(flatten)]
    pub resource: Resource,
    #[serde(flatten)]
    pub describe: Describe,
}

impl Host {
    /// Empty host with `create_at` stamped to the current epoch milliseconds.
    pub fn new() -> Self {
        let mut host = Host::default();
        host.resource.create_at = now_millis();
        host
    }

    /// Required-field check: id, region, type, name non-empty; cpu and memory
    /// positive.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = |ok: bool, field: &str| {
            if ok {
                Ok(())
            } else {
                Err(AppError::Validation(format!("{} is required", field)))
            }
        };
        required(!self.resource.id.is_empty(), "id")?;
        required(!self.resource.region.is_empty(), "region")?;
        required(!self.resource.type_.is_empty(), "type")?;
        required(!self.resource.name.is_empty(), "name")?;
        required(self.describe.cpu > 0, "cpu")?;
        required(self.describe.memory > 0, "memory")?;
        Ok(())
    }

    /// Full replacement: both sub-structures are overwritten, fields omitted
    /// from the replacement fall back to their zero values. Stamps `update_at`.
    pub fn update(&mut self, resource: Resource, describe: Describe) {
        self.resource = resource;
        self.describe = describe;
        self.resource.update_at = now_millis();
    }

    /// Field-wise merge: incoming non-zero/non-empty fields overwrite, the
    /// rest keep their prior values. Stamps `update_at` first, so an explicit
    /// incoming `update_at` wins over the stamp.
    pub fn patch(&mut self, resource: &Resource, describe: &Describe) -> Result<(), AppError> {
        self.resource.update_at = now_millis();
        self.resource.merge(resource);
        self.describe.merge(describe);
        Ok(())
    }
}

/// Paginated query result envelope.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Set {
    /// Count of matching rows ignoring limit/offset.
    pub total: i64,
    pub items: Vec<Host>,
}

impl Set {
    pub fn new() -> Self {
        Set::default()
    }

    pub fn add(&mut self, item: Host) {
        self.items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_host() -> Host {
        let mut host = Host::new();
        host.resource.id = "h-001".into();
        host.resource.region = "cn-north-1".into();
        host.resource.type_ = "ecs.g6.large".into();
        host.resource.name = "web-01".into();
        host.describe.cpu = 4;
        host.describe.memory = 8192;
        host
    }

    #[test]
    fn new_host_stamps_create_at() {
        let host = Host::new();
        assert!(host.resource.create_at > 0);
        assert_eq!(host.resource.update_at, 0);
    }

    #[test]
    fn validate_accepts_complete_host() {
        assert!(valid_host().validate().is_ok());
    }

    #[test]
    fn validate_rejects_each_missing_required_field() {
        let clear: [(&str, fn(&mut Host)); 6] = [
            ("id", |h| h.resource.id.clear()),
            ("region", |h| h.resource.region.clear()),
            ("type", |h| h.resource.type_.clear()),
            ("name", |h| h.resource.name.clear()),
            ("cpu", |h| h.describe.cpu = 0),
            ("memory", |h| h.describe.memory = 0),
        ];
        for (field, clear_field) in clear {
            let mut host = valid_host();
            clear_field(&mut host);
            let err = host.validate().unwrap_err();
            assert!(
                matches!(&err, AppError::Validation(msg) if msg.contains(field)),
                "expected validation error for {}, got {:?}",
                field,
                err
            );
        }
    }

    #[test]
    fn patch_overwrites_only_non_zero_fields() {
        let mut host = valid_host();
        host.resource.zone = "cn-north-1a".into();

        let mut partial = Resource::default();
        partial.name = "web-02".into();
        host.patch(&partial, &Describe::default()).unwrap();

        assert_eq!(host.resource.name, "web-02");
        assert_eq!(host.resource.region, "cn-north-1");
        assert_eq!(host.resource.zone, "cn-north-1a");
        assert_eq!(host.describe.cpu, 4);
        assert!(host.resource.update_at > 0);
    }

    #[test]
    fn patch_never_resets_vendor_to_default_code() {
        let mut host = valid_host();
        host.resource.vendor = Vendor::HuaweiCloud;
        host.patch(&Resource::default(), &Describe::default()).unwrap();
        assert_eq!(host.resource.vendor, Vendor::HuaweiCloud);

        let mut partial = Resource::default();
        partial.vendor = Vendor::TencentCloud;
        host.patch(&partial, &Describe::default()).unwrap();
        assert_eq!(host.resource.vendor, Vendor::TencentCloud);
    }

    #[test]
    fn update_replaces_everything_including_omitted_fields() {
        let mut host = valid_host();
        host.resource.description = "old".into();

        let mut replacement = Resource::default();
        replacement.id = host.resource.id.clone();
        replacement.region = "cn-south-1".into();
        replacement.type_ = "ecs.g6.xlarge".into();
        replacement.name = "web-03".into();
        let mut describe = Describe::default();
        describe.cpu = 8;
        describe.memory = 16384;
        host.update(replacement, describe);

        assert_eq!(host.resource.name, "web-03");
        assert_eq!(host.resource.description, "");
        assert_eq!(host.describe.gpu_amount, 0);
        assert!(host.resource.update_at > 0);
    }

    #[test]
    fn host_serializes_flat() {
        let host = valid_host();
        let value = serde_json::to_value(&host).unwrap();
        assert_eq!(value["name"], "web-01");
        assert_eq!(value["type"], "ecs.g6.large");
        assert_eq!(value["cpu"], 4);
        assert_eq!(value["vendor"], 0);
        assert_eq!(value["resource_hash"], "");
    }

    #[test]
    fn host_deserializes_from_partial_body() {
        let host: Host = serde_json::from_str(
            r#"{"name":"web-01","region":"r1","type":"t1","cpu":2,"memory":4096}"#,
        )
        .unwrap();
        assert_eq!(host.resource.name, "web-01");
        assert_eq!(host.describe.memory, 4096);
        assert_eq!(host.resource.id, "");
    }

    #[test]
    fn vendor_rejects_unknown_code() {
        assert!(serde_json::from_str::<Vendor>("2").is_ok());
        assert!(serde_json::from_str::<Vendor>("7").is_err());
    }
}
