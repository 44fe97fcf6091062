use crate::descriptor::ModuleDescriptor;
use crate::fingerprint::{compute_fingerprint, DescriptorIdentity};
use modforge_schema::{is_plain_module_name, BuildConfigField};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("module '{0}' must be finalized before it is built")]
    NotFinalized(String),
    #[error("module name '{0}' does not name a file inside the output directory")]
    InvalidModuleName(String),
    #[error("executor I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("executor serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("executor failed: {0}")]
    Failed(String),
}

/// Consumer of finalized descriptors.
///
/// Only ever receives descriptors in the `Finalized` state; implementations
/// must not be handed a descriptor that is still being configured.
pub trait BuildExecutor: Send + Sync {
    fn name(&self) -> &str;

    fn build(&self, descriptor: &ModuleDescriptor) -> Result<(), ExecutorError>;
}

fn require_finalized(descriptor: &ModuleDescriptor) -> Result<(), ExecutorError> {
    if descriptor.is_finalized() {
        Ok(())
    } else {
        Err(ExecutorError::NotFinalized(
            descriptor.module_name().to_string(),
        ))
    }
}

/// On-disk form written by [`JsonDirExecutor`].
#[derive(Debug, Serialize)]
pub struct BuildDocument<'a> {
    pub identity: DescriptorIdentity,
    pub build_config: Vec<BuildConfigField>,
    pub descriptor: &'a ModuleDescriptor,
}

impl<'a> BuildDocument<'a> {
    pub fn new(descriptor: &'a ModuleDescriptor) -> Result<Self, ExecutorError> {
        require_finalized(descriptor)?;
        let identity = compute_fingerprint(descriptor)
            .map_err(|e| ExecutorError::Failed(e.to_string()))?;
        Ok(Self {
            identity,
            build_config: descriptor.build_config_fields(),
            descriptor,
        })
    }
}

/// Writes one `<module>.json` per descriptor into a directory.
pub struct JsonDirExecutor {
    out_dir: PathBuf,
}

impl JsonDirExecutor {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn output_path(&self, module: &str) -> Result<PathBuf, ExecutorError> {
        if !is_plain_module_name(module) {
            return Err(ExecutorError::InvalidModuleName(module.to_owned()));
        }
        Ok(self.out_dir.join(format!("{module}.json")))
    }

    fn stage(&self, descriptor: &ModuleDescriptor) -> Result<(NamedTempFile, PathBuf), ExecutorError> {
        let dest = self.output_path(descriptor.module_name())?;
        let document = BuildDocument::new(descriptor)?;
        let content = serde_json::to_string_pretty(&document)?;

        let mut tmp = NamedTempFile::new_in(&self.out_dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        Ok((tmp, dest))
    }

    /// Writes every descriptor or none of them.
    ///
    /// All documents are staged as temp files first; existing outputs are
    /// only replaced once every descriptor has been staged. A failure while
    /// replacing can still leave earlier files renamed into place.
    pub fn build_all(&self, descriptors: &[ModuleDescriptor]) -> Result<Vec<PathBuf>, ExecutorError> {
        std::fs::create_dir_all(&self.out_dir)?;
        let mut staged = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            staged.push(self.stage(descriptor)?);
        }

        let mut written = Vec::with_capacity(staged.len());
        for (tmp, dest) in staged {
            tmp.persist(&dest).map_err(|e| ExecutorError::Io(e.error))?;
            debug!("wrote {}", dest.display());
            written.push(dest);
        }
        Ok(written)
    }
}

impl BuildExecutor for JsonDirExecutor {
    fn name(&self) -> &'static str {
        "json-dir"
    }

    fn build(&self, descriptor: &ModuleDescriptor) -> Result<(), ExecutorError> {
        std::fs::create_dir_all(&self.out_dir)?;
        let (tmp, dest) = self.stage(descriptor)?;
        tmp.persist(&dest).map_err(|e| ExecutorError::Io(e.error))?;

        debug!("wrote {}", dest.display());
        Ok(())
    }
}

/// In-memory executor that keeps a copy of every descriptor it was given.
#[derive(Default)]
pub struct RecordingExecutor {
    built: Mutex<Vec<ModuleDescriptor>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn built(&self) -> Result<Vec<ModuleDescriptor>, ExecutorError> {
        let built = self
            .built
            .lock()
            .map_err(|e| ExecutorError::Failed(format!("mutex poisoned: {e}")))?;
        Ok(built.clone())
    }
}

impl BuildExecutor for RecordingExecutor {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn build(&self, descriptor: &ModuleDescriptor) -> Result<(), ExecutorError> {
        require_finalized(descriptor)?;
        let mut built = self
            .built
            .lock()
            .map_err(|e| ExecutorError::Failed(format!("mutex poisoned: {e}")))?;
        built.push(descriptor.clone());
        Ok(())
    }
}
