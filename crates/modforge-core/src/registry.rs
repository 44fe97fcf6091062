use crate::descriptor::ModuleDescriptor;
use crate::mutation::{compile_def, ApplyContext, Mutation};
use crate::CoreError;
use modforge_schema::{parse_presets_file, parse_presets_str, PresetDef, PresetName, BUILTIN_PRESETS};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// A named, composable bundle of descriptor mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModulePreset {
    pub name: PresetName,
    pub description: String,
    /// Expanded depth-first before this preset's own mutations.
    pub includes: Vec<PresetName>,
    pub mutations: Vec<Mutation>,
}

impl ModulePreset {
    pub fn new(name: impl Into<PresetName>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            includes: Vec::new(),
            mutations: Vec::new(),
        }
    }

    #[must_use]
    pub fn describe(mut self, description: &str) -> Self {
        description.clone_into(&mut self.description);
        self
    }

    #[must_use]
    pub fn include(mut self, preset: impl Into<PresetName>) -> Self {
        self.includes.push(preset.into());
        self
    }

    #[must_use]
    pub fn mutate(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    pub fn from_def(def: &PresetDef) -> Self {
        Self {
            name: PresetName::new(def.name.clone()),
            description: def.description.clone(),
            includes: def.includes.clone(),
            mutations: compile_def(def),
        }
    }
}

/// Process-wide table of presets, read-only once loading is done.
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<PresetName, ModulePreset>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in presets.
    pub fn with_builtins() -> Result<Self, CoreError> {
        let mut registry = Self::new();
        for builtin in BUILTIN_PRESETS {
            registry.register(ModulePreset::from_def(&builtin.to_def()?))?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, preset: ModulePreset) -> Result<(), CoreError> {
        if self.presets.contains_key(&preset.name) {
            return Err(CoreError::DuplicatePresetName(preset.name.into_inner()));
        }
        debug!("registered preset {}", preset.name);
        self.presets.insert(preset.name.clone(), preset);
        Ok(())
    }

    pub fn register_defs(&mut self, defs: &[PresetDef]) -> Result<(), CoreError> {
        for def in defs {
            self.register(ModulePreset::from_def(def))?;
        }
        Ok(())
    }

    pub fn load_str(&mut self, input: &str) -> Result<(), CoreError> {
        let defs = parse_presets_str(input)?;
        self.register_defs(&defs)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<(), CoreError> {
        let defs = parse_presets_file(path)?;
        self.register_defs(&defs)
    }

    pub fn get(&self, name: &str) -> Option<&ModulePreset> {
        self.presets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModulePreset> + '_ {
        self.presets.values()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Load-time check: every include resolves and the inclusion graph has
    /// no cycle.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut done = HashSet::new();
        for name in self.presets.keys() {
            let mut stack = Vec::new();
            self.visit(name, &mut stack, &mut done)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        stack: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), CoreError> {
        if done.contains(name) {
            return Ok(());
        }
        if stack.contains(&name) {
            return Err(cycle_error(stack, name));
        }
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| CoreError::UnknownPreset(name.to_owned()))?;
        stack.push(name);
        for inc in &preset.includes {
            self.visit(inc, stack, done)?;
        }
        stack.pop();
        done.insert(name);
        Ok(())
    }

    /// Presets in application order: includes depth-first, then the preset
    /// itself. A preset reached through two sibling branches appears twice.
    pub fn expand(&self, name: &str) -> Result<Vec<&ModulePreset>, CoreError> {
        let root = self
            .presets
            .get(name)
            .ok_or_else(|| CoreError::UnknownPreset(name.to_owned()))?;
        let mut order = Vec::new();
        let mut stack = Vec::new();
        self.expand_into(root.name.as_str(), &mut stack, &mut order)?;
        Ok(order)
    }

    fn expand_into<'a>(
        &'a self,
        name: &'a str,
        stack: &mut Vec<&'a str>,
        order: &mut Vec<&'a ModulePreset>,
    ) -> Result<(), CoreError> {
        if stack.contains(&name) {
            return Err(cycle_error(stack, name));
        }
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| CoreError::UnknownPreset(name.to_owned()))?;
        stack.push(name);
        for inc in &preset.includes {
            self.expand_into(inc, stack, order)?;
        }
        stack.pop();
        order.push(preset);
        Ok(())
    }

    /// Apply `name` and everything it includes to `descriptor`.
    ///
    /// The expansion is computed up front, so an unknown or cyclic include
    /// fails before any mutation touches the descriptor.
    pub fn apply(
        &self,
        name: &str,
        descriptor: &mut ModuleDescriptor,
        ctx: &ApplyContext<'_>,
    ) -> Result<(), CoreError> {
        let order = self.expand(name)?;
        for preset in order {
            debug!(
                "applying preset {} to {}",
                preset.name,
                descriptor.module_name()
            );
            for mutation in &preset.mutations {
                mutation.apply(descriptor, ctx)?;
            }
        }
        Ok(())
    }
}

fn cycle_error(stack: &[&str], repeated: &str) -> CoreError {
    let start = stack.iter().position(|n| *n == repeated).unwrap_or(0);
    let mut chain: Vec<String> = stack[start..].iter().map(|n| (*n).to_owned()).collect();
    chain.push(repeated.to_owned());
    CoreError::CyclicPresetInclusion(chain)
}
