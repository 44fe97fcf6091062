use super::{json_pretty, load_orchestrator, load_project, EXIT_FAILURE, EXIT_SUCCESS};
use std::path::Path;

/// Configure every module without writing anything, reporting all failures
/// instead of stopping at the first one.
pub fn run(project_path: &Path, json: bool) -> Result<u8, String> {
    let project = load_project(project_path)?;
    let orchestrator = load_orchestrator(&project)?;

    let mut results = Vec::with_capacity(project.modules.len());
    for spec in &project.modules {
        let outcome = orchestrator
            .configure_spec(spec, &project.allprojects.presets)
            .map_err(|e| e.to_string());
        results.push((spec.name.as_str(), outcome));
    }
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();

    if json {
        let payload: Vec<_> = results
            .iter()
            .map(|(name, r)| match r {
                Ok(d) => serde_json::json!({
                    "module": name,
                    "ok": true,
                    "dependencies": d.dependencies().len(),
                }),
                Err(e) => serde_json::json!({
                    "module": name,
                    "ok": false,
                    "error": e,
                }),
            })
            .collect();
        println!("{}", json_pretty(&payload)?);
    } else {
        let ok = console::Style::new().green();
        let bad = console::Style::new().red();
        for (name, r) in &results {
            match r {
                Ok(_) => println!("{} {name}", ok.apply_to("ok  ")),
                Err(e) => println!("{} {name}: {e}", bad.apply_to("FAIL")),
            }
        }
        println!(
            "{} module(s) checked, {failed} failed",
            results.len()
        );
    }

    Ok(if failed == 0 { EXIT_SUCCESS } else { EXIT_FAILURE })
}
