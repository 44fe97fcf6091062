use super::{colorize_scope, json_pretty, load_manifest, EXIT_SUCCESS};
use modforge_core::DependencyResolver;
use modforge_schema::{CapabilityRequest, Scope};
use std::path::Path;

pub fn run(
    capability: &str,
    scope: Option<Scope>,
    manifest: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    let resolver = DependencyResolver::new(load_manifest(manifest)?);
    let request = match scope {
        Some(scope) => CapabilityRequest::new(capability, scope),
        None => CapabilityRequest::with_default_scope(capability),
    };
    let entries = resolver
        .resolve_request(&request)
        .map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{:<28} {}", colorize_scope(entry.scope), entry.coordinate);
        }
    }
    Ok(EXIT_SUCCESS)
}
