use super::{
    json_pretty, load_orchestrator, load_project, spin_fail, spin_ok, spinner, EXIT_SUCCESS,
};
use modforge_core::JsonDirExecutor;
use std::path::Path;

pub fn run(project_path: &Path, module: Option<&str>, out: &Path, json: bool) -> Result<u8, String> {
    let project = load_project(project_path)?;
    let orchestrator = load_orchestrator(&project)?;

    let spec = match module {
        Some(name) => Some(project.module(name).ok_or_else(|| {
            format!(
                "module '{name}' is not declared in {}",
                project_path.display()
            )
        })?),
        None => None,
    };

    let pb = if json {
        None
    } else {
        Some(spinner("configuring modules..."))
    };

    let configured = match spec {
        Some(spec) => orchestrator
            .configure_spec(spec, &project.allprojects.presets)
            .map(|d| vec![d]),
        None => orchestrator.configure_project(&project),
    };
    let descriptors = match configured {
        Ok(d) => d,
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "configuration failed");
            }
            return Err(e.to_string());
        }
    };

    let executor = JsonDirExecutor::new(out);
    let mut identities = Vec::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        identities.push(descriptor.fingerprint().map_err(|e| e.to_string())?);
    }
    let paths = match executor.build_all(&descriptors) {
        Ok(paths) => paths,
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "writing descriptors failed");
            }
            return Err(format!("writing descriptors to {} failed: {e}", out.display()));
        }
    };
    let written: Vec<_> = descriptors.iter().zip(identities).zip(paths).collect();
    if let Some(ref pb) = pb {
        spin_ok(pb, &format!("{} module(s) configured", descriptors.len()));
    }

    if json {
        let payload: Vec<_> = written
            .iter()
            .map(|((d, identity), path)| {
                serde_json::json!({
                    "module": d.module_name(),
                    "short_id": identity.short_id,
                    "dependencies": d.dependencies().len(),
                    "output": path,
                })
            })
            .collect();
        println!("{}", json_pretty(&payload)?);
    } else {
        for ((d, identity), _) in &written {
            println!(
                "{:<24} {} ({} dependencies)",
                d.module_name(),
                identity.short_id,
                d.dependencies().len()
            );
        }
        println!("descriptors written to {}", executor.out_dir().display());
    }
    Ok(EXIT_SUCCESS)
}
