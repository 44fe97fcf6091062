//! Module configuration core for modforge.
//!
//! This crate turns schema data into finalized module descriptors: the
//! `DependencyResolver` expands capability names into versioned entries, the
//! `PresetRegistry` folds composable presets into a `ModuleDescriptor`, and
//! the `Orchestrator` ties both together behind a single `configure` call.
//! Finalized descriptors are handed to a `BuildExecutor` by the caller.

pub mod descriptor;
pub mod executor;
pub mod fingerprint;
pub mod lifecycle;
pub mod mutation;
pub mod orchestrator;
pub mod registry;
pub mod resolver;

pub use descriptor::ModuleDescriptor;
pub use executor::{
    BuildDocument, BuildExecutor, ExecutorError, JsonDirExecutor, RecordingExecutor,
};
pub use fingerprint::{compute_fingerprint, DescriptorIdentity};
pub use lifecycle::{validate_transition, DescriptorState};
pub use mutation::{ApplyContext, Mutation};
pub use orchestrator::Orchestrator;
pub use registry::{ModulePreset, PresetRegistry};
pub use resolver::DependencyResolver;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] modforge_schema::ManifestError),
    #[error("preset error: {0}")]
    Preset(#[from] modforge_schema::PresetError),
    #[error("project error: {0}")]
    Project(#[from] modforge_schema::ProjectError),
    #[error("unknown library '{library}' required by capability '{capability}'")]
    UnknownLibrary { capability: String, library: String },
    #[error("unknown capability '{0}'")]
    UnknownCapability(String),
    #[error("preset '{0}' is already registered")]
    DuplicatePresetName(String),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("cyclic preset inclusion: {}", .0.join(" -> "))]
    CyclicPresetInclusion(Vec<String>),
    #[error("module '{0}' is already finalized")]
    DescriptorAlreadyFinalized(String),
    #[error("module '{0}' is not finalized")]
    NotFinalized(String),
    #[error("invalid SDK range for module '{module}': {detail}")]
    InvalidSdkRange { module: String, detail: String },
    #[error(
        "conflicting declarations of {coordinate} ({scope}) in module '{module}': exclusion sets differ"
    )]
    ConflictingDependencyDeclaration {
        module: String,
        coordinate: String,
        scope: String,
    },
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
