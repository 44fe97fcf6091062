use super::{colorize_scope, json_pretty, EXIT_SUCCESS};
use modforge_schema::list_capabilities;

pub fn run(json: bool) -> Result<u8, String> {
    let caps = list_capabilities();
    if json {
        let payload: Vec<_> = caps
            .iter()
            .map(|c| {
                let artifacts: Vec<String> = c
                    .items
                    .iter()
                    .map(|i| format!("{}:{}", i.group, i.artifact))
                    .collect();
                serde_json::json!({
                    "name": c.name,
                    "description": c.description,
                    "default_scope": c.default_scope,
                    "artifacts": artifacts,
                })
            })
            .collect();
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{:<26} {:<28} DESCRIPTION", "CAPABILITY", "DEFAULT SCOPE");
        for cap in caps {
            println!(
                "{:<26} {:<28} {}",
                cap.name,
                colorize_scope(cap.default_scope),
                cap.description
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
