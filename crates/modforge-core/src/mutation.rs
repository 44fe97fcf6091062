use crate::descriptor::{
    ModuleDescriptor, FLAG_VCS_VERSION, FLAG_VERSION_CODE, FLAG_VERSION_NAME,
};
use crate::resolver::DependencyResolver;
use crate::CoreError;
use modforge_schema::{
    BuildVariables, CapabilityRequest, FlagValue, PresetDef, ProjectModuleRequest, SdkSection,
    TestOptions,
};
use serde::Serialize;
use std::path::Path;

pub const SCHEMA_DIR: &str = "schemas";
pub const KAPT_ROOM_SCHEMA_LOCATION: &str = "room.schemaLocation";

/// Read-only inputs a mutation may consult.
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    pub resolver: &'a DependencyResolver,
    pub variables: &'a BuildVariables,
    /// Root of the build; Room schemas live under `<root>/schemas`.
    pub root_dir: &'a Path,
}

/// One configuration step of a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    Sdk(SdkSection),
    BuildVariables,
    Flag { name: String, value: FlagValue },
    ResourcePrefix,
    KaptArgument { key: String, value: String },
    RoomSchemaLocation,
    TestOptions(TestOptions),
    PackagingExclude { pattern: String },
    PackagingPickFirst { pattern: String },
    OptIn { annotation: String },
    Repository { url: String },
    Capability(CapabilityRequest),
    ProjectModule(ProjectModuleRequest),
}

impl Mutation {
    pub fn apply(
        &self,
        descriptor: &mut ModuleDescriptor,
        ctx: &ApplyContext<'_>,
    ) -> Result<(), CoreError> {
        match self {
            Mutation::Sdk(sdk) => descriptor.set_sdk(sdk),
            Mutation::BuildVariables => {
                let vars = ctx.variables;
                descriptor.set_flag(FLAG_VERSION_CODE, FlagValue::Int(i64::from(vars.version_code)))?;
                descriptor.set_flag(FLAG_VERSION_NAME, FlagValue::from(vars.version_name.as_str()))?;
                descriptor.set_flag(FLAG_VCS_VERSION, FlagValue::from(vars.vcs_version.as_str()))
            }
            Mutation::Flag { name, value } => descriptor.set_flag(name, value.clone()),
            Mutation::ResourcePrefix => {
                let prefix = descriptor.module_name().to_string();
                descriptor.set_resource_prefix(&prefix)
            }
            Mutation::KaptArgument { key, value } => descriptor.set_kapt_argument(key, value),
            Mutation::RoomSchemaLocation => {
                let location = ctx.root_dir.join(SCHEMA_DIR).to_string_lossy().into_owned();
                descriptor.set_kapt_argument(KAPT_ROOM_SCHEMA_LOCATION, &location)?;
                descriptor.add_test_asset_dir("test", &location)?;
                descriptor.add_test_asset_dir("androidTest", &location)
            }
            Mutation::TestOptions(options) => descriptor.merge_test_options(options),
            Mutation::PackagingExclude { pattern } => descriptor.add_packaging_exclude(pattern),
            Mutation::PackagingPickFirst { pattern } => descriptor.add_packaging_pick_first(pattern),
            Mutation::OptIn { annotation } => {
                descriptor.add_compiler_arg(&format!("-opt-in={annotation}"))
            }
            Mutation::Repository { url } => descriptor.add_repository(url),
            Mutation::Capability(request) => {
                for entry in ctx.resolver.resolve_request(request)? {
                    descriptor.add_dependency(entry)?;
                }
                Ok(())
            }
            Mutation::ProjectModule(request) => {
                descriptor.add_dependency(DependencyResolver::project_module(request))
            }
        }
    }
}

/// Lower a declarative preset into its ordered mutation list.
///
/// Order: SDK, build variables, flags, resource prefix, kapt arguments, Room
/// schema, test options, packaging, opt-ins, repositories, capabilities,
/// project modules.
pub fn compile_def(def: &PresetDef) -> Vec<Mutation> {
    let mut steps = Vec::new();
    if let Some(sdk) = def.sdk {
        steps.push(Mutation::Sdk(sdk));
    }
    if def.build_variables {
        steps.push(Mutation::BuildVariables);
    }
    steps.extend(def.flags.iter().map(|(name, value)| Mutation::Flag {
        name: name.clone(),
        value: value.clone(),
    }));
    if def.resource_prefix {
        steps.push(Mutation::ResourcePrefix);
    }
    steps.extend(def.kapt_arguments.iter().map(|(key, value)| Mutation::KaptArgument {
        key: key.clone(),
        value: value.clone(),
    }));
    if def.room_schema_location {
        steps.push(Mutation::RoomSchemaLocation);
    }
    if let Some(options) = &def.test_options {
        steps.push(Mutation::TestOptions(options.clone()));
    }
    steps.extend(def.packaging.excludes.iter().map(|p| Mutation::PackagingExclude {
        pattern: p.clone(),
    }));
    steps.extend(def.packaging.pick_firsts.iter().map(|p| Mutation::PackagingPickFirst {
        pattern: p.clone(),
    }));
    steps.extend(def.opt_in.iter().map(|a| Mutation::OptIn {
        annotation: a.clone(),
    }));
    steps.extend(def.repositories.iter().map(|url| Mutation::Repository { url: url.clone() }));
    steps.extend(def.dependencies.iter().cloned().map(Mutation::Capability));
    steps.extend(def.project_modules.iter().cloned().map(Mutation::ProjectModule));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_schema::{Scope, VersionManifest};

    fn with_ctx<R>(f: impl FnOnce(&ApplyContext<'_>) -> R) -> R {
        let resolver = DependencyResolver::new(VersionManifest::builtin().unwrap());
        let variables = BuildVariables {
            version_code: 42,
            version_name: "1.0.0".to_owned(),
            vcs_version: "abc123".to_owned(),
        };
        let ctx = ApplyContext {
            resolver: &resolver,
            variables: &variables,
            root_dir: Path::new("/work"),
        };
        f(&ctx)
    }

    #[test]
    fn build_variables_set_version_flags() {
        with_ctx(|ctx| {
            let mut d = ModuleDescriptor::new("foo");
            Mutation::BuildVariables.apply(&mut d, ctx).unwrap();
            assert_eq!(d.flag(FLAG_VERSION_CODE), Some(&FlagValue::Int(42)));
            assert_eq!(d.flag(FLAG_VCS_VERSION), Some(&FlagValue::from("abc123")));
        });
    }

    #[test]
    fn resource_prefix_uses_module_name() {
        with_ctx(|ctx| {
            let mut d = ModuleDescriptor::new("feature-login");
            Mutation::ResourcePrefix.apply(&mut d, ctx).unwrap();
            assert_eq!(d.resource_prefix(), Some("feature-login"));
        });
    }

    #[test]
    fn room_schema_location_points_at_root_schemas() {
        with_ctx(|ctx| {
            let mut d = ModuleDescriptor::new("data");
            Mutation::RoomSchemaLocation.apply(&mut d, ctx).unwrap();
            let expected = Path::new("/work").join("schemas").to_string_lossy().into_owned();
            assert_eq!(d.kapt_arguments()[KAPT_ROOM_SCHEMA_LOCATION], expected);
            assert!(d.test_assets()["test"].contains(&expected));
            assert!(d.test_assets()["androidTest"].contains(&expected));
        });
    }

    #[test]
    fn opt_in_becomes_compiler_arg() {
        with_ctx(|ctx| {
            let mut d = ModuleDescriptor::new("foo");
            Mutation::OptIn {
                annotation: "kotlin.RequiresOptIn".to_owned(),
            }
            .apply(&mut d, ctx)
            .unwrap();
            assert_eq!(d.compiler_args(), ["-opt-in=kotlin.RequiresOptIn"]);
        });
    }

    #[test]
    fn capability_mutation_appends_resolved_entries() {
        with_ctx(|ctx| {
            let mut d = ModuleDescriptor::new("foo");
            Mutation::Capability(CapabilityRequest::new("fragment", Scope::Api))
                .apply(&mut d, ctx)
                .unwrap();
            assert_eq!(d.dependencies().len(), 2);
            assert!(d.dependencies().iter().all(|e| e.scope == Scope::Api));
        });
    }

    #[test]
    fn unknown_capability_propagates() {
        with_ctx(|ctx| {
            let mut d = ModuleDescriptor::new("foo");
            let err = Mutation::Capability(CapabilityRequest::new("nope", Scope::Api))
                .apply(&mut d, ctx)
                .unwrap_err();
            assert!(matches!(err, CoreError::UnknownCapability(_)));
        });
    }

    #[test]
    fn compile_def_orders_steps() {
        let def = modforge_schema::get_preset("android-default-config")
            .unwrap()
            .to_def()
            .unwrap();
        let steps = compile_def(&def);
        assert!(matches!(steps[0], Mutation::Sdk(_)));
        assert_eq!(steps[1], Mutation::BuildVariables);
        assert!(matches!(steps[2], Mutation::Flag { .. }));
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn mutation_serializes_with_op_tag() {
        let json = serde_json::to_value(Mutation::Repository {
            url: "google".to_owned(),
        })
        .unwrap();
        assert_eq!(json["op"], "repository");
        assert_eq!(json["url"], "google");
    }
}
