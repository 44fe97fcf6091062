use crate::CoreError;
use modforge_schema::{
    Capability, CapabilityRequest, Coordinate, DependencyEntry, ManifestError,
    ProjectModuleRequest, Scope, VersionManifest, CAPABILITIES,
};
use tracing::debug;

/// Expands capability names into version-pinned dependency entries.
///
/// A pure function of the version manifest and the capability table; holds
/// no mutable state and can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    manifest: VersionManifest,
    capabilities: &'static [Capability],
}

impl DependencyResolver {
    pub fn new(manifest: VersionManifest) -> Self {
        Self::with_catalog(manifest, CAPABILITIES)
    }

    pub fn with_catalog(manifest: VersionManifest, capabilities: &'static [Capability]) -> Self {
        Self {
            manifest,
            capabilities,
        }
    }

    pub fn manifest(&self) -> &VersionManifest {
        &self.manifest
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        self.capabilities
    }

    pub fn capability(&self, name: &str) -> Result<&'static Capability, CoreError> {
        self.capabilities
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CoreError::UnknownCapability(name.to_owned()))
    }

    /// Resolve every library of `capability`. Items pinned to a fixed
    /// configuration keep it; all others take `scope`.
    pub fn resolve(
        &self,
        capability: &str,
        scope: Scope,
    ) -> Result<Vec<DependencyEntry>, CoreError> {
        let cap = self.capability(capability)?;
        let mut entries = Vec::with_capacity(cap.items.len());
        for item in cap.items {
            let version = self.manifest.get(item.library).map_err(|e| match e {
                ManifestError::UnknownLibrary(library) => CoreError::UnknownLibrary {
                    capability: cap.name.to_owned(),
                    library,
                },
                other => CoreError::Manifest(other),
            })?;
            entries.push(DependencyEntry::new(
                Coordinate::external(item.group, item.artifact, version),
                item.fixed_scope.unwrap_or(scope),
            ));
        }
        debug!(
            "resolved {capability} ({scope}) to {} entries",
            entries.len()
        );
        Ok(entries)
    }

    /// Resolve a declarative request: default scope when none is given, and
    /// the request's exclusions attached to every entry.
    pub fn resolve_request(
        &self,
        request: &CapabilityRequest,
    ) -> Result<Vec<DependencyEntry>, CoreError> {
        let scope = match request.scope {
            Some(scope) => scope,
            None => self.capability(&request.capability)?.default_scope,
        };
        let entries = self.resolve(&request.capability, scope)?;
        Ok(entries
            .into_iter()
            .map(|e| e.with_exclusions(request.exclude.iter().cloned()))
            .collect())
    }

    pub fn project_module(request: &ProjectModuleRequest) -> DependencyEntry {
        DependencyEntry::new(Coordinate::project(&request.path), request.scope)
    }

    /// Check that every library the capability table references is pinned.
    pub fn verify_catalog(&self) -> Result<(), CoreError> {
        for cap in self.capabilities {
            for item in cap.items {
                if !self.manifest.contains(item.library) {
                    return Err(CoreError::UnknownLibrary {
                        capability: cap.name.to_owned(),
                        library: item.library.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}
