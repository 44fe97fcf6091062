use crate::descriptor::ModuleDescriptor;
use crate::CoreError;
use modforge_schema::{DescriptorId, ShortId};
use serde::Serialize;

/// Content identity of a finalized descriptor.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DescriptorIdentity {
    pub id: DescriptorId,
    pub short_id: ShortId,
}

/// Hash the canonical form of a finalized descriptor.
///
/// Two descriptors produced from the same manifest, presets and build
/// variables always share an identity; executors may use it to skip
/// unchanged modules.
pub fn compute_fingerprint(descriptor: &ModuleDescriptor) -> Result<DescriptorIdentity, CoreError> {
    if !descriptor.is_finalized() {
        return Err(CoreError::NotFinalized(descriptor.module_name().to_string()));
    }
    let canonical = serde_json::to_string(descriptor)?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(format!("module:{}", descriptor.module_name()).as_bytes());
    hasher.update(canonical.as_bytes());

    let hex = hasher.finalize().to_hex().to_string();
    let short = hex[..12].to_owned();

    Ok(DescriptorIdentity {
        id: DescriptorId::new(hex),
        short_id: ShortId::new(short),
    })
}

impl ModuleDescriptor {
    pub fn fingerprint(&self) -> Result<DescriptorIdentity, CoreError> {
        compute_fingerprint(self)
    }
}
