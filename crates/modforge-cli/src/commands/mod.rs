pub mod capabilities;
pub mod check;
pub mod completions;
pub mod configure;
pub mod man_pages;
pub mod presets;
pub mod resolve;
pub mod versions;

use indicatif::{ProgressBar, ProgressStyle};
use modforge_core::{CoreError, Orchestrator};
use modforge_schema::{
    parse_manifest_file, parse_project_file, BuildVariables, ProjectFile, Scope, VersionManifest,
};
use std::path::Path;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn finish_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(finish_style());
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(finish_style());
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Colour a scope name by the classpath it lands on.
pub fn colorize_scope(scope: Scope) -> String {
    use console::Style;
    let name = scope.as_str();
    match scope {
        Scope::Api | Scope::Implementation => Style::new().green().apply_to(name).to_string(),
        Scope::CompileOnly | Scope::Classpath => Style::new().blue().apply_to(name).to_string(),
        Scope::DebugImplementation => Style::new().yellow().apply_to(name).to_string(),
        Scope::TestImplementation | Scope::AndroidTestImplementation | Scope::AndroidTestUtil => {
            Style::new().cyan().apply_to(name).to_string()
        }
        s if s.is_annotation_processor() => Style::new().magenta().apply_to(name).to_string(),
        _ => name.to_owned(),
    }
}

pub fn load_manifest(path: Option<&Path>) -> Result<VersionManifest, String> {
    match path {
        Some(p) => parse_manifest_file(p).map_err(|e| format!("manifest error: {e}")),
        None => VersionManifest::builtin().map_err(|e| format!("manifest error: {e}")),
    }
}

pub fn load_project(path: &Path) -> Result<ProjectFile, String> {
    parse_project_file(path).map_err(|e| format!("project error: {e}"))
}

/// Everything `from_project` rejects is a configuration problem.
pub fn config_error(e: &CoreError) -> String {
    match e {
        CoreError::Manifest(_) | CoreError::Preset(_) | CoreError::Project(_) => e.to_string(),
        other => format!("config error: {other}"),
    }
}

pub fn load_orchestrator(project: &ProjectFile) -> Result<Orchestrator, String> {
    Orchestrator::from_project(project, BuildVariables::from_env()).map_err(|e| config_error(&e))
}

/// Exit code for an error message returned by a command.
pub fn exit_code_for(msg: &str) -> u8 {
    const CONFIG_PREFIXES: &[&str] = &[
        "manifest error:",
        "preset error:",
        "project error:",
        "config error:",
    ];
    if CONFIG_PREFIXES.iter().any(|p| msg.starts_with(p)) {
        EXIT_CONFIG_ERROR
    } else {
        EXIT_FAILURE
    }
}
