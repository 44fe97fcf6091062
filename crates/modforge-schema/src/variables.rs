//! Build-wide variables read from the environment once at startup.

use serde::{Deserialize, Serialize};

pub const ENV_BUILD_COUNTER: &str = "BUILD_COUNTER";
pub const ENV_VCS_VERSION: &str = "VCS_VERSION";

/// Version metadata stamped into every module that asks for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildVariables {
    pub version_code: u32,
    pub version_name: String,
    pub vcs_version: String,
}

impl Default for BuildVariables {
    fn default() -> Self {
        Self {
            version_code: 1,
            version_name: "1.0.0".to_owned(),
            vcs_version: "development".to_owned(),
        }
    }
}

impl BuildVariables {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values are treated as unset; a non-numeric build counter falls
    /// back to the default version code.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            version_code: get(ENV_BUILD_COUNTER)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.version_code),
            version_name: defaults.version_name,
            vcs_version: get(ENV_VCS_VERSION).unwrap_or(defaults.vcs_version),
        }
    }
}

/// A generated `BuildConfig` constant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildConfigField {
    pub name: String,
    /// Java type name, e.g. `int` or `String`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Java source literal.
    pub value: String,
}

impl BuildConfigField {
    pub fn int(name: &str, value: u32) -> Self {
        Self {
            name: name.to_owned(),
            field_type: "int".to_owned(),
            value: value.to_string(),
        }
    }

    pub fn string(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            field_type: "String".to_owned(),
            value: format!("\"{value}\""),
        }
    }
}
