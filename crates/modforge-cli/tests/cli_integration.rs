//! CLI subprocess integration tests.
//!
//! These tests invoke the `modforge` binary as a subprocess and verify
//! exit codes, stdout content, and JSON output stability.

use std::path::{Path, PathBuf};
use std::process::Command;

fn modforge_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_modforge"));
    cmd.env_remove("MODFORGE_LOG");
    cmd.env_remove("BUILD_COUNTER");
    cmd.env_remove("VCS_VERSION");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn write_project(dir: &Path) -> PathBuf {
    write(
        dir,
        "modforge.toml",
        r#"
[allprojects]
presets = ["default-android-library"]

[[module]]
name = "core"
dependencies = [{ capability = "kotlin" }]

[[module]]
name = "feature"
presets = ["room", "opt-in-default"]
dependencies = [{ capability = "androidLifecycle", scope = "implementation" }]
project_modules = [{ path = ":core" }]
"#,
    )
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn cli_version_exits_zero() {
    let output = modforge_bin().arg("--version").output().unwrap();
    assert!(output.status.success(), "modforge --version must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("modforge"), "version output: {stdout}");
}

#[test]
fn cli_help_lists_commands() {
    let output = modforge_bin().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["configure", "resolve", "presets", "versions", "capabilities", "check"] {
        assert!(stdout.contains(cmd), "help must list '{cmd}'");
    }
}

#[test]
fn resolve_lifecycle_json() {
    let output = modforge_bin()
        .args(["--json", "resolve", "androidLifecycle", "--scope", "implementation"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 6);
    for entry in entries {
        assert_eq!(entry["scope"], "implementation");
        assert_eq!(entry["coordinate"]["version"], "2.4.1");
    }
}

#[test]
fn resolve_uses_default_scope() {
    let output = modforge_bin()
        .args(["--json", "resolve", "leakCanary"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json[0]["scope"], "debugImplementation");
}

#[test]
fn resolve_unknown_capability_exits_one() {
    let output = modforge_bin().args(["resolve", "retrofit"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown capability 'retrofit'"), "{stderr}");
}

#[test]
fn resolve_with_broken_manifest_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write(
        dir.path(),
        "versions.toml",
        "manifest_version = 1\n\n[versions]\nkotlin = \"1.7.0\"\nkotlin = \"1.8.0\"\n",
    );
    let output = modforge_bin()
        .args(["resolve", "kotlin", "--manifest"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn resolve_with_custom_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write(
        dir.path(),
        "versions.toml",
        "manifest_version = 1\n\n[versions]\njunit = \"4.13.1\"\n",
    );
    let output = modforge_bin()
        .args(["--json", "resolve", "junit", "--manifest"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json[0]["coordinate"]["version"], "4.13.1");
}

#[test]
fn versions_json_lists_manifest() {
    let output = modforge_bin().args(["--json", "versions"]).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["kotlin"], "1.7.0");
    assert_eq!(json["lifecycle"], "2.4.1");
}

#[test]
fn capabilities_lists_catalog() {
    let output = modforge_bin()
        .args(["--json", "capabilities"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"androidLifecycle"));
    assert!(names.contains(&"buildscriptClasspath"));
}

#[test]
fn presets_lists_builtins() {
    let output = modforge_bin().arg("presets").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("default-android-library"));
    assert!(stdout.contains("room"));
}

#[test]
fn presets_show_expansion_order() {
    let output = modforge_bin()
        .args(["--json", "presets", "default-android-library"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.first(), Some(&"android-default-config"));
    assert_eq!(names.last(), Some(&"default-android-library"));
}

#[test]
fn configure_writes_descriptors() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_project(dir.path());
    let out = dir.path().join("out");
    let output = modforge_bin()
        .args(["--json", "configure", "--project"])
        .arg(&project)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "configure failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let summary = stdout_json(&output);
    assert_eq!(summary.as_array().unwrap().len(), 2);

    let feature: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("feature.json")).unwrap()).unwrap();
    assert_eq!(feature["descriptor"]["state"], "finalized");
    assert_eq!(feature["descriptor"]["sdk"]["min"], 22);
    assert_eq!(feature["descriptor"]["resource_prefix"], "feature");
    assert!(out.join("core.json").exists());
}

#[test]
fn configure_single_module_reads_build_variables() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_project(dir.path());
    let out = dir.path().join("out");
    let output = modforge_bin()
        .env("BUILD_COUNTER", "57")
        .env("VCS_VERSION", "abc1234")
        .args(["configure", "--module", "core", "--project"])
        .arg(&project)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(out.join("core.json").exists());
    assert!(!out.join("feature.json").exists());

    let core: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("core.json")).unwrap()).unwrap();
    let flags = &core["descriptor"]["build_flags"];
    assert_eq!(flags["defaultConfig.versionCode"], 57);
    assert_eq!(flags["buildConfig.vcsVersion"], "abc1234");
}

#[test]
fn configure_unknown_module_fails() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_project(dir.path());
    let output = modforge_bin()
        .args(["configure", "--module", "ghost", "--project"])
        .arg(&project)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_project_file_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let output = modforge_bin()
        .args(["check", "--project"])
        .arg(dir.path().join("absent.toml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("project error"), "{stderr}");
}

#[test]
fn cyclic_presets_exit_two() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "presets.toml",
        "[[preset]]\nname = \"p\"\nincludes = [\"q\"]\n\n[[preset]]\nname = \"q\"\nincludes = [\"p\"]\n",
    );
    let project = write(dir.path(), "modforge.toml", "presets = \"presets.toml\"\n");
    let output = modforge_bin()
        .args(["check", "--project"])
        .arg(&project)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("p -> q -> p"), "{stderr}");
}

#[test]
fn check_reports_every_failing_module() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "presets.toml",
        "[[preset]]\nname = \"broken-sdk\"\n\n[preset.sdk]\nmin = 40\n",
    );
    let project = write(
        dir.path(),
        "modforge.toml",
        r#"
presets = "presets.toml"

[allprojects]
presets = ["default-android-library"]

[[module]]
name = "good"

[[module]]
name = "bad-one"
presets = ["broken-sdk"]

[[module]]
name = "bad-two"
dependencies = [{ capability = "retrofit" }]
"#,
    );
    let output = modforge_bin()
        .args(["--json", "check", "--project"])
        .arg(&project)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["ok"], true);
    assert_eq!(results[1]["ok"], false);
    assert!(results[1]["error"].as_str().unwrap().contains("invalid SDK range"));
    assert!(results[2]["error"].as_str().unwrap().contains("retrofit"));
}

#[test]
fn completions_bash() {
    let output = modforge_bin().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("modforge"));
}

#[test]
fn completions_written_to_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("completions");
    let output = modforge_bin()
        .args(["completions", "zsh", "--dir"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    let script = std::fs::read_to_string(out.join("_modforge")).unwrap();
    assert!(script.contains("configure"));
}

#[test]
fn project_module_name_with_path_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let project = write(
        dir.path(),
        "modforge.toml",
        "[[module]]\nname = \"../escaped\"\n",
    );
    let out = dir.path().join("out");
    let output = modforge_bin()
        .args(["configure", "--project"])
        .arg(&project)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("single path segment"), "{stderr}");
    assert!(!dir.path().join("escaped.json").exists());
}

#[test]
fn project_with_empty_exclusion_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let project = write(
        dir.path(),
        "modforge.toml",
        "[[module]]\nname = \"app\"\ndependencies = [{ capability = \"junit\", exclude = [{}] }]\n",
    );
    let output = modforge_bin()
        .args(["check", "--project"])
        .arg(&project)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn man_pages_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = modforge_bin()
        .arg("man-pages")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(dir.path().join("modforge.1").exists());
    assert!(dir.path().join("modforge-configure.1").exists());
}
