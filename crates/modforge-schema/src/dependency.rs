//! Dependency coordinates, scopes and exclusion rules.

use crate::types::CapabilityName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Build-visibility classification of a dependency.
///
/// Serialized with the configuration names the build tool uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    CompileOnly,
    Implementation,
    Api,
    DebugImplementation,
    TestImplementation,
    AndroidTestImplementation,
    AndroidTestUtil,
    Kapt,
    KaptTest,
    KaptAndroidTest,
    TestAnnotationProcessor,
    Classpath,
}

impl Scope {
    pub const ALL: [Scope; 12] = [
        Scope::CompileOnly,
        Scope::Implementation,
        Scope::Api,
        Scope::DebugImplementation,
        Scope::TestImplementation,
        Scope::AndroidTestImplementation,
        Scope::AndroidTestUtil,
        Scope::Kapt,
        Scope::KaptTest,
        Scope::KaptAndroidTest,
        Scope::TestAnnotationProcessor,
        Scope::Classpath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::CompileOnly => "compileOnly",
            Scope::Implementation => "implementation",
            Scope::Api => "api",
            Scope::DebugImplementation => "debugImplementation",
            Scope::TestImplementation => "testImplementation",
            Scope::AndroidTestImplementation => "androidTestImplementation",
            Scope::AndroidTestUtil => "androidTestUtil",
            Scope::Kapt => "kapt",
            Scope::KaptTest => "kaptTest",
            Scope::KaptAndroidTest => "kaptAndroidTest",
            Scope::TestAnnotationProcessor => "testAnnotationProcessor",
            Scope::Classpath => "classpath",
        }
    }

    /// Scopes consumed by an annotation processor rather than the compiler.
    pub fn is_annotation_processor(self) -> bool {
        matches!(
            self,
            Scope::Kapt | Scope::KaptTest | Scope::KaptAndroidTest | Scope::TestAnnotationProcessor
        )
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Scope::ALL.iter().map(|sc| sc.as_str()).collect();
                format!("unknown scope '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Fully qualified library identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Coordinate {
    External {
        group: String,
        artifact: String,
        version: String,
    },
    /// Another module of the same build, addressed by its project path.
    Project { path: String },
}

impl Coordinate {
    pub fn external(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Coordinate::External {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Project paths are normalized to start with `:`.
    pub fn project(path: &str) -> Self {
        let trimmed = path.trim();
        let path = if trimmed.starts_with(':') {
            trimmed.to_owned()
        } else {
            format!(":{trimmed}")
        };
        Coordinate::Project { path }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Coordinate::External { version, .. } => Some(version),
            Coordinate::Project { .. } => None,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::External {
                group,
                artifact,
                version,
            } => write!(f, "{group}:{artifact}:{version}"),
            Coordinate::Project { path } => write!(f, "project({path})"),
        }
    }
}

/// Transitive dependency exclusion rule. At least one side must be set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Exclusion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl Exclusion {
    pub fn group(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            module: None,
        }
    }

    pub fn module(module: impl Into<String>) -> Self {
        Self {
            group: None,
            module: Some(module.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_none() && self.module.is_none()
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.group, &self.module) {
            (Some(g), Some(m)) => write!(f, "{g}:{m}"),
            (Some(g), None) => write!(f, "{g}:*"),
            (None, Some(m)) => write!(f, "*:{m}"),
            (None, None) => f.write_str("*"),
        }
    }
}

/// One resolved dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub coordinate: Coordinate,
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exclusions: BTreeSet<Exclusion>,
}

impl DependencyEntry {
    pub fn new(coordinate: Coordinate, scope: Scope) -> Self {
        Self {
            coordinate,
            scope,
            exclusions: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_exclusions(mut self, exclusions: impl IntoIterator<Item = Exclusion>) -> Self {
        self.exclusions.extend(exclusions);
        self
    }

    /// Two entries with the same key must agree on everything else.
    pub fn key(&self) -> (&Coordinate, Scope) {
        (&self.coordinate, self.scope)
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(\"{}\")", self.scope, self.coordinate)?;
        if !self.exclusions.is_empty() {
            let rules: Vec<String> = self.exclusions.iter().map(ToString::to_string).collect();
            write!(f, " excluding {}", rules.join(", "))?;
        }
        Ok(())
    }
}

/// A symbolic dependency request, as written in preset and project files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityRequest {
    pub capability: CapabilityName,
    /// Falls back to the capability's default scope when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Exclusion>,
}

impl CapabilityRequest {
    pub fn new(capability: impl Into<CapabilityName>, scope: Scope) -> Self {
        Self {
            capability: capability.into(),
            scope: Some(scope),
            exclude: Vec::new(),
        }
    }

    pub fn with_default_scope(capability: impl Into<CapabilityName>) -> Self {
        Self {
            capability: capability.into(),
            scope: None,
            exclude: Vec::new(),
        }
    }
}

/// A dependency on another module of the same build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectModuleRequest {
    pub path: String,
    #[serde(default = "default_project_scope")]
    pub scope: Scope,
}

fn default_project_scope() -> Scope {
    Scope::Implementation
}
