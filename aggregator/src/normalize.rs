//! Conversion of raw upstream payloads into canonical [`UserData`] records.
//!
//! The platforms are Drupal-like hosts and disagree on payload shape: the
//! user may live under `data.user` or `data.subscription_user`, `roles` may
//! be a sequence, a single role object, or garbage, and `code`/`status` may
//! be missing entirely. Normalization is total: any input, including `null`
//! or a bare scalar, produces a well-formed record.

use crate::platform::PlatformId;
use crate::types::{UserData, UserRecord};
use serde_json::{Map, Value as JsonValue};

/// Default HTTP-ish code when the upstream omits one.
const DEFAULT_CODE: u16 = 200;

/// Default status when the upstream omits one.
const DEFAULT_STATUS: &str = "success";

/// Normalize a raw decoded payload from `platform` into a [`UserData`].
pub fn normalize(platform: PlatformId, raw: &JsonValue) -> UserData {
    let data = raw.get("data");

    let user = data
        .and_then(|d| d.get("user").or_else(|| d.get("subscription_user")))
        .map(normalize_user)
        .unwrap_or_default();

    let content = match raw.get("content") {
        Some(JsonValue::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let code = match raw.get("code").and_then(JsonValue::as_u64) {
        Some(code) if u16::try_from(code).is_ok() => code as u16,
        _ => DEFAULT_CODE,
    };

    let status = match raw.get("status") {
        Some(JsonValue::String(status)) => status.clone(),
        _ => DEFAULT_STATUS.to_string(),
    };

    UserData {
        platform,
        user,
        content,
        code,
        status,
    }
}

/// The three role shapes the platforms are known to produce.
enum RoleShape<'a> {
    Sequence(&'a Vec<JsonValue>),
    SingleRole(&'a Map<String, JsonValue>),
    Invalid,
}

fn role_shape(value: &JsonValue) -> RoleShape<'_> {
    match value {
        JsonValue::Array(items) => RoleShape::Sequence(items),
        JsonValue::Object(obj) if obj.contains_key("target_id") => RoleShape::SingleRole(obj),
        _ => RoleShape::Invalid,
    }
}

fn normalize_user(raw_user: &JsonValue) -> UserRecord {
    let JsonValue::Object(obj) = raw_user else {
        return UserRecord::default();
    };

    let mut fields = obj.clone();
    let roles = match fields.remove("roles") {
        Some(value) => match role_shape(&value) {
            RoleShape::Sequence(items) => items.clone(),
            RoleShape::SingleRole(role) => vec![JsonValue::Object(role.clone())],
            RoleShape::Invalid => Vec::new(),
        },
        None => Vec::new(),
    };

    UserRecord { roles, fields }
}
