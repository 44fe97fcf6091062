//! Data formats for modforge.
//!
//! This crate defines the schema layer: the version manifest
//! (`VersionManifest`), dependency coordinates and scopes, the static
//! capability catalog, declarative preset definitions with the built-in
//! preset set, the project file, and build variables read from the
//! environment.

pub mod catalog;
pub mod dependency;
pub mod manifest;
pub mod preset;
pub mod project;
pub mod types;
pub mod variables;

pub use catalog::{get_capability, list_capabilities, Capability, CatalogItem, CAPABILITIES};
pub use dependency::{
    CapabilityRequest, Coordinate, DependencyEntry, Exclusion, ProjectModuleRequest, Scope,
};
pub use manifest::{parse_manifest_file, parse_manifest_str, ManifestError, VersionManifest};
pub use preset::{
    get_preset, list_presets, parse_presets_file, parse_presets_str, BuiltinPreset, FlagValue,
    PackagingSection, PresetDef, PresetError, SdkSection, TestOptions, BUILTIN_PRESETS,
    DEFAULT_ANDROID_LIBRARY,
};
pub use project::{
    is_plain_module_name, parse_project_file, parse_project_str, AllProjectsSection, ModuleSpec, ProjectError,
    ProjectFile, DEFAULT_PROJECT_FILE,
};
pub use types::{CapabilityName, DescriptorId, ModuleName, PresetName, ShortId};
pub use variables::{BuildConfigField, BuildVariables};
