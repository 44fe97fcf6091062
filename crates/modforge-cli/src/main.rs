mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use modforge_schema::{Scope, DEFAULT_PROJECT_FILE};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(
    name = "modforge",
    version,
    about = "Composable module configuration for multi-module Android builds"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

fn parse_scope(s: &str) -> Result<Scope, String> {
    Scope::from_str(s)
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Configure project modules and write one descriptor per module.
    Configure {
        /// Path to the project file.
        #[arg(long, default_value = DEFAULT_PROJECT_FILE)]
        project: PathBuf,
        /// Configure only this module.
        #[arg(long)]
        module: Option<String>,
        /// Output directory for module descriptors.
        #[arg(long, default_value = "build/modforge")]
        out: PathBuf,
    },
    /// Resolve a capability into versioned dependency coordinates.
    Resolve {
        /// Capability name, e.g. androidLifecycle.
        capability: String,
        /// Dependency scope; defaults to the capability's own default.
        #[arg(long, value_parser = parse_scope)]
        scope: Option<Scope>,
        /// Version manifest to use instead of the built-in one.
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// List presets, or show the expansion of one preset.
    Presets {
        /// Preset to expand.
        name: Option<String>,
        /// Project file whose presets are added to the built-in ones.
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// List pinned library versions.
    Versions {
        /// Version manifest to use instead of the built-in one.
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// List the capability catalog.
    Capabilities,
    /// Configure every module without writing output and report failures.
    Check {
        /// Path to the project file.
        #[arg(long, default_value = DEFAULT_PROJECT_FILE)]
        project: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
        /// Write the script into this directory instead of stdout.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("MODFORGE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        Commands::Configure {
            project,
            module,
            out,
        } => commands::configure::run(&project, module.as_deref(), &out, json_output),
        Commands::Resolve {
            capability,
            scope,
            manifest,
        } => commands::resolve::run(&capability, scope, manifest.as_deref(), json_output),
        Commands::Presets { name, project } => {
            commands::presets::run(project.as_deref(), name.as_deref(), json_output)
        }
        Commands::Versions { manifest } => commands::versions::run(manifest.as_deref(), json_output),
        Commands::Capabilities => commands::capabilities::run(json_output),
        Commands::Check { project } => commands::check::run(&project, json_output),
        Commands::Completions { shell, dir } => {
            commands::completions::run::<Cli>(shell, dir.as_deref())
        }
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(commands::exit_code_for(&msg))
        }
    }
}
