use crate::lifecycle::{validate_transition, DescriptorState};
use crate::CoreError;
use modforge_schema::{
    BuildConfigField, DependencyEntry, FlagValue, ModuleName, SdkSection, TestOptions,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const FLAG_VERSION_CODE: &str = "defaultConfig.versionCode";
pub const FLAG_VERSION_NAME: &str = "defaultConfig.versionName";
pub const FLAG_VCS_VERSION: &str = "buildConfig.vcsVersion";

/// Configuration state for one buildable module.
///
/// Mutable while `Empty` or `Configuring`; every mutator fails with
/// `DescriptorAlreadyFinalized` once `finalize()` has succeeded.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModuleDescriptor {
    module_name: ModuleName,
    state: DescriptorState,
    sdk: SdkSection,
    dependencies: Vec<DependencyEntry>,
    build_flags: BTreeMap<String, FlagValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_options: Option<TestOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_prefix: Option<String>,
    kapt_arguments: BTreeMap<String, String>,
    /// Extra asset directories per source set (`test`, `androidTest`).
    test_assets: BTreeMap<String, BTreeSet<String>>,
    packaging_excludes: BTreeSet<String>,
    packaging_pick_firsts: BTreeSet<String>,
    compiler_args: Vec<String>,
    repositories: Vec<String>,
}

impl ModuleDescriptor {
    pub fn new(module_name: impl Into<ModuleName>) -> Self {
        Self {
            module_name: module_name.into(),
            state: DescriptorState::Empty,
            sdk: SdkSection::default(),
            dependencies: Vec::new(),
            build_flags: BTreeMap::new(),
            test_options: None,
            resource_prefix: None,
            kapt_arguments: BTreeMap::new(),
            test_assets: BTreeMap::new(),
            packaging_excludes: BTreeSet::new(),
            packaging_pick_firsts: BTreeSet::new(),
            compiler_args: Vec::new(),
            repositories: Vec::new(),
        }
    }

    pub fn module_name(&self) -> &ModuleName {
        &self.module_name
    }

    pub fn state(&self) -> DescriptorState {
        self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state == DescriptorState::Finalized
    }

    pub fn sdk(&self) -> &SdkSection {
        &self.sdk
    }

    pub fn dependencies(&self) -> &[DependencyEntry] {
        &self.dependencies
    }

    pub fn build_flags(&self) -> &BTreeMap<String, FlagValue> {
        &self.build_flags
    }

    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.build_flags.get(name)
    }

    pub fn test_options(&self) -> Option<&TestOptions> {
        self.test_options.as_ref()
    }

    pub fn resource_prefix(&self) -> Option<&str> {
        self.resource_prefix.as_deref()
    }

    pub fn kapt_arguments(&self) -> &BTreeMap<String, String> {
        &self.kapt_arguments
    }

    pub fn test_assets(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.test_assets
    }

    pub fn packaging_excludes(&self) -> &BTreeSet<String> {
        &self.packaging_excludes
    }

    pub fn packaging_pick_firsts(&self) -> &BTreeSet<String> {
        &self.packaging_pick_firsts
    }

    pub fn compiler_args(&self) -> &[String] {
        &self.compiler_args
    }

    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    fn begin_mutation(&mut self) -> Result<(), CoreError> {
        self.transition(DescriptorState::Configuring)
    }

    fn transition(&mut self, to: DescriptorState) -> Result<(), CoreError> {
        if self.is_finalized() {
            return Err(CoreError::DescriptorAlreadyFinalized(
                self.module_name.to_string(),
            ));
        }
        validate_transition(self.state, to)?;
        self.state = to;
        Ok(())
    }

    /// Levels left unset in `sdk` keep their current value.
    pub fn set_sdk(&mut self, sdk: &SdkSection) -> Result<(), CoreError> {
        self.begin_mutation()?;
        self.sdk.merge(sdk);
        Ok(())
    }

    pub fn set_flag(&mut self, name: &str, value: FlagValue) -> Result<(), CoreError> {
        self.begin_mutation()?;
        self.build_flags.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn set_resource_prefix(&mut self, prefix: &str) -> Result<(), CoreError> {
        self.begin_mutation()?;
        self.resource_prefix = Some(prefix.to_owned());
        Ok(())
    }

    pub fn set_kapt_argument(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.begin_mutation()?;
        self.kapt_arguments.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    pub fn add_test_asset_dir(&mut self, source_set: &str, dir: &str) -> Result<(), CoreError> {
        self.begin_mutation()?;
        self.test_assets
            .entry(source_set.to_owned())
            .or_default()
            .insert(dir.to_owned());
        Ok(())
    }

    pub fn merge_test_options(&mut self, options: &TestOptions) -> Result<(), CoreError> {
        self.begin_mutation()?;
        self.test_options
            .get_or_insert_with(TestOptions::default)
            .merge(options);
        Ok(())
    }

    pub fn add_packaging_exclude(&mut self, pattern: &str) -> Result<(), CoreError> {
        self.begin_mutation()?;
        self.packaging_excludes.insert(pattern.to_owned());
        Ok(())
    }

    pub fn add_packaging_pick_first(&mut self, pattern: &str) -> Result<(), CoreError> {
        self.begin_mutation()?;
        self.packaging_pick_firsts.insert(pattern.to_owned());
        Ok(())
    }

    pub fn add_compiler_arg(&mut self, arg: &str) -> Result<(), CoreError> {
        self.begin_mutation()?;
        push_unique(&mut self.compiler_args, arg);
        Ok(())
    }

    pub fn add_repository(&mut self, repository: &str) -> Result<(), CoreError> {
        self.begin_mutation()?;
        push_unique(&mut self.repositories, repository);
        Ok(())
    }

    /// Append a dependency. An entry equal to one already present is merged.
    pub fn add_dependency(&mut self, entry: DependencyEntry) -> Result<(), CoreError> {
        self.begin_mutation()?;
        if !self.dependencies.contains(&entry) {
            self.dependencies.push(entry);
        }
        Ok(())
    }

    /// Validate and freeze the descriptor.
    pub fn finalize(&mut self) -> Result<(), CoreError> {
        if self.is_finalized() {
            return Err(CoreError::DescriptorAlreadyFinalized(
                self.module_name.to_string(),
            ));
        }
        self.check_sdk_range()?;
        self.check_dependency_conflicts()?;
        self.transition(DescriptorState::Finalized)
    }

    fn check_sdk_range(&self) -> Result<(), CoreError> {
        let levels = [
            ("minSdk", self.sdk.min),
            ("targetSdk", self.sdk.target),
            ("compileSdk", self.sdk.compile),
        ];
        for (i, (low_name, low)) in levels.iter().enumerate() {
            for (high_name, high) in &levels[i + 1..] {
                if let (Some(low), Some(high)) = (low, high) {
                    if low > high {
                        return Err(CoreError::InvalidSdkRange {
                            module: self.module_name.to_string(),
                            detail: format!("{low_name} {low} > {high_name} {high}"),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_dependency_conflicts(&self) -> Result<(), CoreError> {
        let mut seen = HashMap::new();
        for entry in &self.dependencies {
            if let Some(previous) = seen.insert(entry.key(), &entry.exclusions) {
                if *previous != entry.exclusions {
                    return Err(CoreError::ConflictingDependencyDeclaration {
                        module: self.module_name.to_string(),
                        coordinate: entry.coordinate.to_string(),
                        scope: entry.scope.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// `BuildConfig` constants derived from the SDK levels and VCS version.
    pub fn build_config_fields(&self) -> Vec<BuildConfigField> {
        let mut fields = Vec::new();
        for (name, level) in [
            ("minSdkVersion", self.sdk.min),
            ("targetSdkVersion", self.sdk.target),
            ("compileSdkVersion", self.sdk.compile),
        ] {
            if let Some(level) = level {
                fields.push(BuildConfigField::int(name, level));
            }
        }
        if let Some(FlagValue::Str(vcs)) = self.build_flags.get(FLAG_VCS_VERSION) {
            fields.push(BuildConfigField::string("vcsVersion", vcs));
        }
        fields
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_schema::{Coordinate, Exclusion, Scope};

    fn lifecycle_entry() -> DependencyEntry {
        DependencyEntry::new(
            Coordinate::external("androidx.lifecycle", "lifecycle-process", "2.4.1"),
            Scope::Implementation,
        )
    }

    fn sdk(min: u32, target: u32, compile: u32) -> SdkSection {
        SdkSection {
            min: Some(min),
            target: Some(target),
            compile: Some(compile),
        }
    }

    #[test]
    fn new_descriptor_is_empty() {
        let d = ModuleDescriptor::new("foo");
        assert_eq!(d.state(), DescriptorState::Empty);
        assert!(d.dependencies().is_empty());
    }

    #[test]
    fn first_mutation_moves_to_configuring() {
        let mut d = ModuleDescriptor::new("foo");
        d.set_flag("kapt.enabled", FlagValue::Bool(true)).unwrap();
        assert_eq!(d.state(), DescriptorState::Configuring);
    }

    #[test]
    fn sdk_merge_is_last_applied_wins() {
        let mut d = ModuleDescriptor::new("foo");
        d.set_sdk(&sdk(22, 31, 31)).unwrap();
        d.set_sdk(&SdkSection {
            min: Some(24),
            ..SdkSection::default()
        })
        .unwrap();
        assert_eq!(d.sdk(), &sdk(24, 31, 31));
    }

    #[test]
    fn identical_dependencies_merge() {
        let mut d = ModuleDescriptor::new("foo");
        d.add_dependency(lifecycle_entry()).unwrap();
        d.add_dependency(lifecycle_entry()).unwrap();
        assert_eq!(d.dependencies().len(), 1);
    }

    #[test]
    fn same_coordinate_in_other_scope_is_kept() {
        let mut d = ModuleDescriptor::new("foo");
        d.add_dependency(lifecycle_entry()).unwrap();
        let mut test_entry = lifecycle_entry();
        test_entry.scope = Scope::TestImplementation;
        d.add_dependency(test_entry).unwrap();
        assert_eq!(d.dependencies().len(), 2);
        assert!(d.finalize().is_ok());
    }

    #[test]
    fn finalize_accepts_valid_sdk_range() {
        let mut d = ModuleDescriptor::new("foo");
        d.set_sdk(&sdk(22, 31, 31)).unwrap();
        d.finalize().unwrap();
        assert!(d.is_finalized());
    }

    #[test]
    fn finalize_rejects_min_above_target() {
        let mut d = ModuleDescriptor::new("foo");
        d.set_sdk(&sdk(33, 31, 31)).unwrap();
        let err = d.finalize().unwrap_err();
        assert!(matches!(err, CoreError::InvalidSdkRange { .. }));
        assert_eq!(d.state(), DescriptorState::Configuring);
    }

    #[test]
    fn finalize_rejects_target_above_compile() {
        let mut d = ModuleDescriptor::new("foo");
        d.set_sdk(&sdk(22, 33, 31)).unwrap();
        assert!(matches!(
            d.finalize(),
            Err(CoreError::InvalidSdkRange { .. })
        ));
    }

    #[test]
    fn finalize_checks_partial_sdk_levels() {
        let mut d = ModuleDescriptor::new("foo");
        d.set_sdk(&SdkSection {
            min: Some(30),
            target: None,
            compile: Some(29),
        })
        .unwrap();
        assert!(d.finalize().is_err());
    }

    #[test]
    fn finalize_rejects_conflicting_exclusions() {
        let mut d = ModuleDescriptor::new("foo");
        d.add_dependency(lifecycle_entry()).unwrap();
        d.add_dependency(lifecycle_entry().with_exclusions([Exclusion::group("androidx.arch.core")]))
            .unwrap();
        assert!(matches!(
            d.finalize(),
            Err(CoreError::ConflictingDependencyDeclaration { .. })
        ));
    }

    #[test]
    fn empty_descriptor_can_be_finalized() {
        let mut d = ModuleDescriptor::new("foo");
        d.finalize().unwrap();
        assert!(d.is_finalized());
    }

    #[test]
    fn mutations_after_finalize_fail() {
        let mut d = ModuleDescriptor::new("foo");
        d.finalize().unwrap();
        let before = d.clone();
        assert!(matches!(
            d.add_dependency(lifecycle_entry()),
            Err(CoreError::DescriptorAlreadyFinalized(_))
        ));
        assert!(matches!(
            d.set_sdk(&sdk(22, 31, 31)),
            Err(CoreError::DescriptorAlreadyFinalized(_))
        ));
        assert!(matches!(
            d.set_flag("x", FlagValue::Bool(true)),
            Err(CoreError::DescriptorAlreadyFinalized(_))
        ));
        assert!(matches!(
            d.add_repository("google"),
            Err(CoreError::DescriptorAlreadyFinalized(_))
        ));
        assert!(matches!(
            d.finalize(),
            Err(CoreError::DescriptorAlreadyFinalized(_))
        ));
        assert_eq!(d, before);
    }

    #[test]
    fn repositories_and_compiler_args_keep_first_position() {
        let mut d = ModuleDescriptor::new("foo");
        d.add_repository("google").unwrap();
        d.add_repository("mavenCentral").unwrap();
        d.add_repository("google").unwrap();
        assert_eq!(d.repositories(), ["google", "mavenCentral"]);
        d.add_compiler_arg("-opt-in=kotlin.RequiresOptIn").unwrap();
        d.add_compiler_arg("-opt-in=kotlin.RequiresOptIn").unwrap();
        assert_eq!(d.compiler_args().len(), 1);
    }

    #[test]
    fn test_options_are_merged() {
        let mut d = ModuleDescriptor::new("foo");
        d.merge_test_options(&TestOptions {
            return_default_values: Some(true),
            ..TestOptions::default()
        })
        .unwrap();
        d.merge_test_options(&TestOptions {
            execution: Some("ANDROIDX_TEST_ORCHESTRATOR".to_owned()),
            ..TestOptions::default()
        })
        .unwrap();
        let opts = d.test_options().unwrap();
        assert_eq!(opts.return_default_values, Some(true));
        assert_eq!(opts.execution.as_deref(), Some("ANDROIDX_TEST_ORCHESTRATOR"));
    }

    #[test]
    fn build_config_fields_follow_sdk_and_vcs() {
        let mut d = ModuleDescriptor::new("foo");
        d.set_sdk(&sdk(22, 31, 31)).unwrap();
        d.set_flag(FLAG_VCS_VERSION, FlagValue::from("development"))
            .unwrap();
        let fields = d.build_config_fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "minSdkVersion",
                "targetSdkVersion",
                "compileSdkVersion",
                "vcsVersion"
            ]
        );
        assert_eq!(fields[3].value, "\"development\"");
    }
}
