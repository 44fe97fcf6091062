use super::{config_error, json_pretty, load_orchestrator, load_project, EXIT_SUCCESS};
use modforge_core::PresetRegistry;
use std::path::Path;

fn registry_for(project: Option<&Path>) -> Result<PresetRegistry, String> {
    match project {
        Some(path) => {
            let project = load_project(path)?;
            Ok(load_orchestrator(&project)?.registry().clone())
        }
        None => PresetRegistry::with_builtins().map_err(|e| config_error(&e)),
    }
}

pub fn run(project: Option<&Path>, name: Option<&str>, json: bool) -> Result<u8, String> {
    let registry = registry_for(project)?;
    match name {
        Some(name) => show(&registry, name, json),
        None => list(&registry, json),
    }
}

fn list(registry: &PresetRegistry, json: bool) -> Result<u8, String> {
    if json {
        let payload: Vec<_> = registry
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "description": p.description,
                    "includes": p.includes,
                })
            })
            .collect();
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{:<28} DESCRIPTION", "PRESET");
        for preset in registry.iter() {
            println!("{:<28} {}", preset.name, preset.description);
            if !preset.includes.is_empty() {
                let includes: Vec<&str> = preset.includes.iter().map(|i| i.as_str()).collect();
                println!("{:<28}   includes: {}", "", includes.join(", "));
            }
        }
    }
    Ok(EXIT_SUCCESS)
}

fn show(registry: &PresetRegistry, name: &str, json: bool) -> Result<u8, String> {
    let expansion = registry.expand(name).map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&expansion)?);
    } else {
        for preset in expansion {
            println!("{}", console::style(&preset.name).bold());
            for mutation in &preset.mutations {
                let line = serde_json::to_string(mutation)
                    .map_err(|e| format!("JSON serialization failed: {e}"))?;
                println!("  {line}");
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
