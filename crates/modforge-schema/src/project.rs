//! Project file (`modforge.toml`): which manifest and presets to load, and
//! what each module needs.

use crate::dependency::{CapabilityRequest, Exclusion, ProjectModuleRequest};
use crate::types::{ModuleName, PresetName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PROJECT_FILE: &str = "modforge.toml";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read project file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse project file: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("module name must not be empty")]
    EmptyModuleName,
    #[error("module name '{0}' must be a single path segment without '/', '\\' or ':'")]
    InvalidModuleName(String),
    #[error("module '{module}' declares an exclusion with neither group nor module")]
    EmptyExclusion { module: String },
    #[error("module '{0}' is declared more than once")]
    DuplicateModule(String),
    #[error("module '{module}' depends on itself")]
    SelfDependency { module: String },
    #[error("module '{module}' depends on undeclared module '{path}'")]
    UnknownProjectModule { module: String, path: String },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AllProjectsSection {
    /// Presets applied to every module before its own presets.
    #[serde(default)]
    pub presets: Vec<PresetName>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    pub name: ModuleName,
    #[serde(default)]
    pub presets: Vec<PresetName>,
    #[serde(default)]
    pub dependencies: Vec<CapabilityRequest>,
    #[serde(default)]
    pub project_modules: Vec<ProjectModuleRequest>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<ModuleName>) -> Self {
        Self {
            name: name.into(),
            presets: Vec::new(),
            dependencies: Vec::new(),
            project_modules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    /// Version manifest path; the built-in manifest is used when absent.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    /// Extra presets, added on top of the built-in ones.
    #[serde(default)]
    pub presets: Option<PathBuf>,
    #[serde(default)]
    pub allprojects: AllProjectsSection,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSpec>,
    /// Directory holding the project file; relative paths resolve against it.
    #[serde(skip)]
    pub root_dir: PathBuf,
}

impl ProjectFile {
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.manifest.as_ref().map(|p| self.root_dir.join(p))
    }

    pub fn presets_path(&self) -> Option<PathBuf> {
        self.presets.as_ref().map(|p| self.root_dir.join(p))
    }

    pub fn module(&self, name: &str) -> Option<&ModuleSpec> {
        self.modules.iter().find(|m| m.name == name)
    }

    fn validate(&self) -> Result<(), ProjectError> {
        let mut seen = BTreeSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(ProjectError::EmptyModuleName);
            }
            if !is_plain_module_name(&module.name) {
                return Err(ProjectError::InvalidModuleName(module.name.to_string()));
            }
            if module
                .dependencies
                .iter()
                .flat_map(|d| &d.exclude)
                .any(Exclusion::is_empty)
            {
                return Err(ProjectError::EmptyExclusion {
                    module: module.name.to_string(),
                });
            }
            if !seen.insert(module.name.as_str()) {
                return Err(ProjectError::DuplicateModule(module.name.to_string()));
            }
        }
        for module in &self.modules {
            for dep in &module.project_modules {
                let target = dep.path.trim().trim_start_matches(':');
                if target == module.name.as_str() {
                    return Err(ProjectError::SelfDependency {
                        module: module.name.to_string(),
                    });
                }
                if !seen.contains(target) {
                    return Err(ProjectError::UnknownProjectModule {
                        module: module.name.to_string(),
                        path: dep.path.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Module names become file names, so they must not address another
/// directory.
pub fn is_plain_module_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', ':'])
        && !name.contains("..")
}

pub fn parse_project_str(input: &str, root_dir: &Path) -> Result<ProjectFile, ProjectError> {
    let mut project: ProjectFile = toml::from_str(input)?;
    project.root_dir = root_dir.to_path_buf();
    project.validate()?;
    Ok(project)
}

pub fn parse_project_file(path: impl AsRef<Path>) -> Result<ProjectFile, ProjectError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let root = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    parse_project_str(&content, &root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::Scope;

    const SAMPLE: &str = r#"
manifest = "gradle/versions.toml"

[allprojects]
presets = ["default-repositories", "kotlin-jvm-target"]

[[module]]
name = "domain"
presets = ["default-android-library"]

[[module]]
name = "data"
presets = ["default-android-library", "room"]
dependencies = [
  { capability = "androidLifecycle", scope = "implementation" },
  { capability = "junit" },
]
project_modules = [{ path = ":domain", scope = "api" }]
"#;

    #[test]
    fn parses_project() {
        let project = parse_project_str(SAMPLE, Path::new("/work")).unwrap();
        assert_eq!(project.modules.len(), 2);
        assert_eq!(project.allprojects.presets.len(), 2);
        assert_eq!(
            project.manifest_path(),
            Some(PathBuf::from("/work/gradle/versions.toml"))
        );
        assert_eq!(project.presets_path(), None);
        let data = project.module("data").unwrap();
        assert_eq!(data.project_modules[0].scope, Scope::Api);
        assert_eq!(data.dependencies[1].scope, None);
    }

    #[test]
    fn empty_project_is_valid() {
        let project = parse_project_str("", Path::new(".")).unwrap();
        assert!(project.modules.is_empty());
        assert!(project.manifest.is_none());
    }

    #[test]
    fn rejects_duplicate_modules() {
        let input = r#"
[[module]]
name = "core"
[[module]]
name = "core"
"#;
        assert!(matches!(
            parse_project_str(input, Path::new(".")),
            Err(ProjectError::DuplicateModule(_))
        ));
    }

    #[test]
    fn rejects_undeclared_project_module() {
        let input = r#"
[[module]]
name = "app"
project_modules = [{ path = ":missing" }]
"#;
        assert!(matches!(
            parse_project_str(input, Path::new(".")),
            Err(ProjectError::UnknownProjectModule { .. })
        ));
    }

    #[test]
    fn rejects_module_names_that_leave_the_output_dir() {
        for name in ["../escaped", "a/b", "a\\\\b", "..", ".", "core:data"] {
            let input = format!("[[module]]\nname = \"{name}\"\n");
            assert!(
                matches!(
                    parse_project_str(&input, Path::new(".")),
                    Err(ProjectError::InvalidModuleName(_))
                ),
                "accepted {name}"
            );
        }
        assert!(is_plain_module_name("feature-login"));
        assert!(is_plain_module_name("core.data"));
    }

    #[test]
    fn rejects_empty_exclusion_in_module_dependencies() {
        let input = r#"
[[module]]
name = "app"
dependencies = [{ capability = "junit", exclude = [{}] }]
"#;
        assert!(matches!(
            parse_project_str(input, Path::new(".")),
            Err(ProjectError::EmptyExclusion { ref module }) if module == "app"
        ));
    }

    #[test]
    fn rejects_self_dependency() {
        let input = r#"
[[module]]
name = "app"
project_modules = [{ path = "app" }]
"#;
        assert!(matches!(
            parse_project_str(input, Path::new(".")),
            Err(ProjectError::SelfDependency { .. })
        ));
    }

    #[test]
    fn reads_project_file_relative_to_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_PROJECT_FILE);
        std::fs::write(&path, SAMPLE).unwrap();
        let project = parse_project_file(&path).unwrap();
        assert_eq!(project.root_dir, dir.path());
        assert_eq!(
            project.manifest_path().unwrap(),
            dir.path().join("gradle/versions.toml")
        );
    }
}
