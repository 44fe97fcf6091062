use super::{json_pretty, load_manifest, EXIT_SUCCESS};
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(manifest: Option<&Path>, json: bool) -> Result<u8, String> {
    let manifest = load_manifest(manifest)?;
    if json {
        let versions: BTreeMap<&str, &str> = manifest.all().collect();
        println!("{}", json_pretty(&versions)?);
    } else {
        println!("{:<24} VERSION", "LIBRARY");
        for (library, version) in manifest.all() {
            println!("{library:<24} {version}");
        }
    }
    Ok(EXIT_SUCCESS)
}
