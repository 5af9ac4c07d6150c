use crate::platform::PlatformId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A remote user profile.
///
/// Upstream platforms return arbitrary key/value bags; everything except
/// `roles` passes through unchanged via the flattened field map. `roles` is
/// kept out of the bag so it is always a sequence after normalization,
/// whatever shape the upstream sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub roles: Vec<JsonValue>,

    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
}

impl UserRecord {
    /// Whether the record carries no upstream data at all.
    ///
    /// This is the "meaningful result" test for the username-to-email
    /// fallback: a record with no fields and no roles is treated the same as
    /// a not-found user.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.roles.is_empty()
    }
}

/// Canonical result unit: one user lookup against one platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub platform: PlatformId,
    pub user: UserRecord,
    pub content: Vec<JsonValue>,
    pub code: u16,
    pub status: String,
}

/// A single deletion to perform against one platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub uid: String,
    pub platform: PlatformId,
}

/// Outcome of one delete request. Exactly one of `data`/`error` is set,
/// depending on `success`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub uid: String,
    pub platform: PlatformId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteResult {
    pub fn ok(uid: String, platform: PlatformId, data: JsonValue) -> Self {
        DeleteResult {
            uid,
            platform,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(uid: String, platform: PlatformId, error: String) -> Self {
        DeleteResult {
            uid,
            platform,
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Stable `(code, reason)` pair derived from an error, used for
/// operator-facing display. The `code` strings are a contract the operator
/// UI depends on and must not be renamed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassifiedError {
    pub code: String,
    pub reason: String,
}

impl ClassifiedError {
    pub fn new<C, R>(code: C, reason: R) -> Self
    where
        C: Into<String>,
        R: Into<String>,
    {
        ClassifiedError {
            code: code.into(),
            reason: reason.into(),
        }
    }
}
