use super::EXIT_SUCCESS;
use clap::CommandFactory;
use clap_complete::Shell;
use std::path::Path;

const BIN_NAME: &str = "modforge";

/// Print the completion script, or write it into `dir` under the shell's
/// conventional file name (`modforge.bash`, `_modforge`, ...).
pub fn run<C: CommandFactory>(shell: Shell, dir: Option<&Path>) -> Result<u8, String> {
    let mut cmd = C::command();
    match dir {
        None => clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout()),
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| format!("failed to create dir: {e}"))?;
            let path = clap_complete::generate_to(shell, &mut cmd, BIN_NAME, dir)
                .map_err(|e| format!("failed to write {shell} completions: {e}"))?;
            println!("{shell} completions written to {}", path.display());
        }
    }
    Ok(EXIT_SUCCESS)
}
