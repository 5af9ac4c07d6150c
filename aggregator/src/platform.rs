use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one of the fixed external identity platforms.
///
/// The variant order is the platform priority order: best-effort fetches walk
/// platforms in this order, and callers rely on result lists reflecting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Dcp,
    Dxsp,
    Cppg,
    Cphub,
}

impl PlatformId {
    /// All platforms, in priority order.
    pub const ALL: [PlatformId; 4] = [
        PlatformId::Dcp,
        PlatformId::Dxsp,
        PlatformId::Cppg,
        PlatformId::Cphub,
    ];

    /// Lower-case wire/config form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Dcp => "dcp",
            PlatformId::Dxsp => "dxsp",
            PlatformId::Cppg => "cppg",
            PlatformId::Cphub => "cphub",
        }
    }
}

impl std::str::FromStr for PlatformId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dcp" => Ok(PlatformId::Dcp),
            "dxsp" => Ok(PlatformId::Dxsp),
            "cppg" => Ok(PlatformId::Cppg),
            "cphub" => Ok(PlatformId::Cphub),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformId::Dcp => "DCP",
            PlatformId::Dxsp => "DXSP",
            PlatformId::Cppg => "CPPG",
            PlatformId::Cphub => "CPHUB",
        };
        f.write_str(name)
    }
}
