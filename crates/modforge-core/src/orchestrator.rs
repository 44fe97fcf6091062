use crate::descriptor::ModuleDescriptor;
use crate::mutation::{ApplyContext, Mutation};
use crate::registry::PresetRegistry;
use crate::resolver::DependencyResolver;
use crate::CoreError;
use modforge_schema::{
    parse_manifest_file, BuildVariables, CapabilityRequest, ModuleSpec, ProjectFile,
    VersionManifest,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Single entry point for turning preset names and dependency requests into a
/// finalized [`ModuleDescriptor`].
///
/// Holds only read-only context after construction; one instance can serve
/// concurrent `configure` calls from several threads.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    resolver: DependencyResolver,
    registry: PresetRegistry,
    variables: BuildVariables,
    root_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(manifest: VersionManifest, registry: PresetRegistry) -> Self {
        Self {
            resolver: DependencyResolver::new(manifest),
            registry,
            variables: BuildVariables::default(),
            root_dir: PathBuf::from("."),
        }
    }

    /// Built-in manifest and presets.
    pub fn builtin() -> Result<Self, CoreError> {
        Ok(Self::new(
            VersionManifest::builtin()?,
            PresetRegistry::with_builtins()?,
        ))
    }

    #[must_use]
    pub fn with_variables(mut self, variables: BuildVariables) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Load manifest and presets referenced by a project file and check the
    /// result before any module is configured.
    pub fn from_project(project: &ProjectFile, variables: BuildVariables) -> Result<Self, CoreError> {
        let manifest = match project.manifest_path() {
            Some(path) => {
                debug!("loading version manifest {}", path.display());
                parse_manifest_file(&path)?
            }
            None => VersionManifest::builtin()?,
        };

        let mut registry = PresetRegistry::with_builtins()?;
        if let Some(path) = project.presets_path() {
            debug!("loading presets {}", path.display());
            registry.load_file(&path)?;
        }
        registry.validate()?;

        let orchestrator = Self::new(manifest, registry)
            .with_variables(variables)
            .with_root_dir(&project.root_dir);
        orchestrator.resolver.verify_catalog()?;
        Ok(orchestrator)
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn variables(&self) -> &BuildVariables {
        &self.variables
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn context(&self) -> ApplyContext<'_> {
        ApplyContext {
            resolver: &self.resolver,
            variables: &self.variables,
            root_dir: &self.root_dir,
        }
    }

    /// Fold `presets` left to right into a fresh descriptor, append the
    /// resolved `extra` requests and finalize.
    ///
    /// The first error aborts the call; no partially configured descriptor
    /// is ever returned.
    pub fn configure<P: AsRef<str>>(
        &self,
        module: &str,
        presets: &[P],
        extra: &[CapabilityRequest],
    ) -> Result<ModuleDescriptor, CoreError> {
        info!("configuring module {module}");
        let mut descriptor = ModuleDescriptor::new(module);
        let ctx = self.context();
        for preset in presets {
            self.registry.apply(preset.as_ref(), &mut descriptor, &ctx)?;
        }
        for request in extra {
            Mutation::Capability(request.clone()).apply(&mut descriptor, &ctx)?;
        }
        descriptor.finalize()?;
        debug!(
            "module {module} finalized with {} dependencies",
            descriptor.dependencies().len()
        );
        Ok(descriptor)
    }

    /// Configure a module declared in a project file. The project-wide
    /// presets are applied before the module's own.
    pub fn configure_spec<P: AsRef<str>>(
        &self,
        spec: &ModuleSpec,
        allprojects: &[P],
    ) -> Result<ModuleDescriptor, CoreError> {
        let presets: Vec<&str> = allprojects
            .iter()
            .map(|p| p.as_ref())
            .chain(spec.presets.iter().map(|p| p.as_str()))
            .collect();
        info!("configuring module {} from project file", spec.name);
        let mut descriptor = ModuleDescriptor::new(spec.name.clone());
        let ctx = self.context();
        for preset in presets {
            self.registry.apply(preset, &mut descriptor, &ctx)?;
        }
        for request in &spec.dependencies {
            Mutation::Capability(request.clone()).apply(&mut descriptor, &ctx)?;
        }
        for request in &spec.project_modules {
            Mutation::ProjectModule(request.clone()).apply(&mut descriptor, &ctx)?;
        }
        descriptor.finalize()?;
        Ok(descriptor)
    }

    /// Configure every module of a project, in declaration order.
    pub fn configure_project(&self, project: &ProjectFile) -> Result<Vec<ModuleDescriptor>, CoreError> {
        project
            .modules
            .iter()
            .map(|spec| self.configure_spec(spec, &project.allprojects.presets))
            .collect()
    }
}
