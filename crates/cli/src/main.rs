//! PanelForge CLI: the main entry point.
//!
//! Commands:
//! - `assist`   Ask the assistant, once or interactively
//! - `render`   Render a template file against JSON data
//! - `inspect`  Print a context projection of a project
//! - `serve`    Start the HTTP gateway
//! - `config`   Show, locate, create or validate the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "panelforge",
    about = "PanelForge: prompt orchestration runtime for manga projects",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.panelforge/config.toml
    #[arg(long, global = true, env = "PANELFORGE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the assistant to answer, generate, edit or draw
    Assist {
        /// Project to work on
        #[arg(short, long)]
        project: String,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Selected node, as `kind:id` (e.g. `scene:s1`)
        #[arg(short, long)]
        select: Option<String>,
    },

    /// Render a template file
    Render {
        /// Template file
        file: PathBuf,

        /// JSON data to render against, inline or as `@path/to/data.json`
        #[arg(short, long, default_value = "{}")]
        data: String,

        /// Fail on malformed templates instead of rendering leniently
        #[arg(long)]
        strict: bool,
    },

    /// Print what the prompts see of a project
    Inspect {
        project: String,

        /// `full` or `minimal`
        #[arg(short, long, default_value = "full")]
        mode: String,

        /// Narrow the view to one scene
        #[arg(long)]
        scene: Option<String>,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Check the configuration for problems
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Assist {
            project,
            message,
            select,
        } => commands::assist::run(config_path, project, message, select).await?,
        Commands::Render { file, data, strict } => commands::render::run(&file, &data, strict)?,
        Commands::Inspect { project, mode, scene } => {
            commands::inspect::run(config_path, &project, &mode, scene.as_deref()).await?
        }
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path)?,
            ConfigAction::Path => commands::config_cmd::path(config_path),
            ConfigAction::Init { force } => commands::config_cmd::init(config_path, force)?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path)?,
        },
    }

    Ok(())
}
