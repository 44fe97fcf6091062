use crate::dependency::{CapabilityRequest, ProjectModuleRequest};
use crate::types::PresetName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read presets file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse presets: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("preset name must not be empty")]
    EmptyName,
    #[error("preset '{0}' includes itself")]
    SelfInclusion(String),
    #[error("preset '{preset}' declares an exclusion with neither group nor module")]
    EmptyExclusion { preset: String },
}

/// Scalar value of a build flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Int(i) => write!(f, "{i}"),
            FlagValue::Str(s) => write!(f, "\"{s}\""),
            FlagValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        FlagValue::Bool(b)
    }
}

impl From<i64> for FlagValue {
    fn from(i: i64) -> Self {
        FlagValue::Int(i)
    }
}

impl From<&str> for FlagValue {
    fn from(s: &str) -> Self {
        FlagValue::Str(s.to_owned())
    }
}

impl From<String> for FlagValue {
    fn from(s: String) -> Self {
        FlagValue::Str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SdkSection {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub target: Option<u32>,
    #[serde(default)]
    pub compile: Option<u32>,
}

impl SdkSection {
    /// Overwrite the levels `other` sets; keep the rest.
    pub fn merge(&mut self, other: &SdkSection) {
        self.min = other.min.or(self.min);
        self.target = other.target.or(self.target);
        self.compile = other.compile.or(self.compile);
    }
}

/// Unit and instrumented test settings. Unset fields leave earlier values alone.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_default_values: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_android_resources: Option<bool>,
    /// Test runner execution mode, e.g. `ANDROIDX_TEST_ORCHESTRATOR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<String>,
}

impl TestOptions {
    pub fn merge(&mut self, other: &TestOptions) {
        if other.return_default_values.is_some() {
            self.return_default_values = other.return_default_values;
        }
        if other.include_android_resources.is_some() {
            self.include_android_resources = other.include_android_resources;
        }
        if other.execution.is_some() {
            self.execution.clone_from(&other.execution);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackagingSection {
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub pick_firsts: Vec<String>,
}

/// Declarative form of a preset, as written in a presets file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PresetDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Presets applied before this one's own settings, in order.
    #[serde(default)]
    pub includes: Vec<PresetName>,
    #[serde(default)]
    pub sdk: Option<SdkSection>,
    /// Set version code, version name and VCS version from build variables.
    #[serde(default)]
    pub build_variables: bool,
    #[serde(default)]
    pub flags: BTreeMap<String, FlagValue>,
    /// Require the module name as prefix of every Android resource.
    #[serde(default)]
    pub resource_prefix: bool,
    #[serde(default)]
    pub kapt_arguments: BTreeMap<String, String>,
    /// Point Room at `<root>/schemas` and expose it as test assets.
    #[serde(default)]
    pub room_schema_location: bool,
    #[serde(default)]
    pub test_options: Option<TestOptions>,
    #[serde(default)]
    pub packaging: PackagingSection,
    /// Annotations opted into module-wide via `-opt-in=`.
    #[serde(default)]
    pub opt_in: Vec<String>,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<CapabilityRequest>,
    #[serde(default)]
    pub project_modules: Vec<ProjectModuleRequest>,
}

impl PresetDef {
    pub fn validate(&self) -> Result<(), PresetError> {
        if self.name.trim().is_empty() {
            return Err(PresetError::EmptyName);
        }
        if self.includes.iter().any(|inc| inc == self.name.as_str()) {
            return Err(PresetError::SelfInclusion(self.name.clone()));
        }
        if self
            .dependencies
            .iter()
            .flat_map(|d| &d.exclude)
            .any(crate::dependency::Exclusion::is_empty)
        {
            return Err(PresetError::EmptyExclusion {
                preset: self.name.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PresetFile {
    #[serde(default, rename = "preset")]
    pub presets: Vec<PresetDef>,
}

pub fn parse_presets_str(input: &str) -> Result<Vec<PresetDef>, PresetError> {
    let file: PresetFile = toml::from_str(input)?;
    for def in &file.presets {
        def.validate()?;
    }
    Ok(file.presets)
}

pub fn parse_presets_file(path: impl AsRef<Path>) -> Result<Vec<PresetDef>, PresetError> {
    let content = fs::read_to_string(path)?;
    parse_presets_str(&content)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BuiltinPreset {
    pub name: &'static str,
    pub description: &'static str,
    pub definition: &'static str,
}

impl BuiltinPreset {
    pub fn to_def(&self) -> Result<PresetDef, PresetError> {
        let mut def: PresetDef = toml::from_str(self.definition)?;
        self.name.clone_into(&mut def.name);
        self.description.clone_into(&mut def.description);
        def.validate()?;
        Ok(def)
    }
}

pub const DEFAULT_ANDROID_LIBRARY: &str = "default-android-library";

pub const BUILTIN_PRESETS: &[BuiltinPreset] = &[
    BuiltinPreset {
        name: "android-default-config",
        description: "SDK levels, version info and instrumentation runner",
        definition: r#"build_variables = true

[sdk]
min = 22
target = 31
compile = 31

[flags]
"defaultConfig.testInstrumentationRunner" = "androidx.test.runner.AndroidJUnitRunner"
"#,
    },
    BuiltinPreset {
        name: "java11-compile-options",
        description: "Java 11 source/target compatibility and Kotlin JVM target",
        definition: r#"[flags]
"compileOptions.sourceCompatibility" = "11"
"compileOptions.targetCompatibility" = "11"
"kotlinOptions.jvmTarget" = "11"
"#,
    },
    BuiltinPreset {
        name: "kotlin-jvm-target",
        description: "Kotlin JVM target 11 for every compile task",
        definition: r#"[flags]
"kotlinOptions.jvmTarget" = "11"
"#,
    },
    BuiltinPreset {
        name: "library-release-build-type",
        description: "Release build type without minification",
        definition: r#"[flags]
"buildTypes.release.minifyEnabled" = false
"buildTypes.release.proguardFiles" = ["proguard-android-optimize.txt", "proguard-rules.pro"]
"#,
    },
    BuiltinPreset {
        name: "default-packaging",
        description: "Drop duplicate license files pulled in by coroutines debug artifacts",
        definition: r#"[packaging]
excludes = ["META-INF/AL2.0", "META-INF/LGPL2.1", "META-INF/licenses/ASM"]
pick_firsts = ["win32-x86-64/attach_hotspot_windows.dll", "win32-x86/attach_hotspot_windows.dll"]
"#,
    },
    BuiltinPreset {
        name: "resource-prefix",
        description: "Require the module name as prefix for Android resources",
        definition: "resource_prefix = true\n",
    },
    BuiltinPreset {
        name: DEFAULT_ANDROID_LIBRARY,
        description: "Standard Android library module",
        definition: r#"includes = [
  "android-default-config",
  "resource-prefix",
  "java11-compile-options",
  "library-release-build-type",
  "default-packaging",
]
"#,
    },
    BuiltinPreset {
        name: "annotation-processing",
        description: "Enable the kapt annotation processor block",
        definition: r#"[flags]
"kapt.enabled" = true
"#,
    },
    BuiltinPreset {
        name: "room",
        description: "Room schema export and incremental processing",
        definition: r#"includes = ["annotation-processing"]
room_schema_location = true

[kapt_arguments]
"room.incremental" = "true"
"#,
    },
    BuiltinPreset {
        name: "test-options",
        description: "Unit tests return default values and see Android resources",
        definition: r"[test_options]
return_default_values = true
include_android_resources = true
",
    },
    BuiltinPreset {
        name: "test-orchestrator",
        description: "Run instrumented tests through AndroidX Test Orchestrator",
        definition: r#"[test_options]
execution = "ANDROIDX_TEST_ORCHESTRATOR"
"#,
    },
    BuiltinPreset {
        name: "view-binding",
        description: "Enable ViewBinding",
        definition: r#"[flags]
"buildFeatures.viewBinding" = true
"#,
    },
    BuiltinPreset {
        name: "opt-in-default",
        description: "Module-wide opt-in to RequiresOptIn and experimental coroutines",
        definition: r#"opt_in = ["kotlin.RequiresOptIn", "kotlinx.coroutines.ExperimentalCoroutinesApi"]
"#,
    },
    BuiltinPreset {
        name: "default-repositories",
        description: "Google, Maven Central and JitPack repositories",
        definition: r#"repositories = ["google", "mavenCentral", "https://jitpack.io"]
"#,
    },
];

pub fn get_preset(name: &str) -> Option<&'static BuiltinPreset> {
    BUILTIN_PRESETS.iter().find(|p| p.name == name)
}

pub fn list_presets() -> &'static [BuiltinPreset] {
    BUILTIN_PRESETS
}
