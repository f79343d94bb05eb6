//! exemplar CLI: build ready-to-run smart-contract example projects.
//!
//! Five commands: `list`, `plan`, `example`, `category` and `inject`.
//!
//! Build commands compose a fresh project with [`exemplar_core::composer::Composer`];
//! `inject` merges one example into an existing project through
//! [`exemplar_core::inject::Injector`].

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use exemplar_core::inject::Decision;

#[derive(Parser)]
#[command(
    name = "exemplar",
    about = "Scaffold smart-contract example projects, or inject examples into existing ones",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to exemplar.config.json (default: ./exemplar.config.json)
    #[arg(long, global = true, default_value = exemplar_core::config::CONFIG_FILE)]
    config: PathBuf,

    /// Assets root holding the catalog and asset sources (overrides config)
    #[arg(long, global = true, env = "EXEMPLAR_ASSETS")]
    assets: Option<PathBuf>,

    /// Base project template directory (overrides config)
    #[arg(long, global = true, env = "EXEMPLAR_TEMPLATE")]
    template: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog examples and categories
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a build would write, without writing anything
    Plan {
        /// Example ids, resolved in the given order
        ids: Vec<String>,

        /// Plan a whole category instead
        #[arg(long, conflicts_with = "ids")]
        category: Option<String>,

        /// Print the resolved asset set as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a standalone project for one example
    Example {
        /// Example id (prompts when omitted)
        id: Option<String>,

        /// Output directory (default: ./example-<id>)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Package name for the generated manifest
        #[arg(long)]
        name: Option<String>,

        /// Do not initialize a git repository
        #[arg(long)]
        no_git: bool,
    },

    /// Build one project holding every example of a category
    Category {
        /// Category id (prompts when omitted)
        id: Option<String>,

        /// Output directory (default: ./examples-<id>)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Do not initialize a git repository
        #[arg(long)]
        no_git: bool,
    },

    /// Add an example to an existing project
    Inject {
        /// Example id (prompts when omitted)
        id: Option<String>,

        /// Project to inject into
        #[arg(long, short, default_value = ".")]
        target: PathBuf,

        /// What to do with files that already exist
        #[arg(long, value_enum, default_value = "prompt")]
        on_conflict: ConflictChoice,

        /// Plan only: report the operations without touching the project
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ConflictChoice {
    Skip,
    Overwrite,
    Rename,
    Prompt,
}

impl ConflictChoice {
    /// The fixed policy, or `None` for interactive prompting.
    pub fn policy(self) -> Option<Decision> {
        match self {
            Self::Skip => Some(Decision::Skip),
            Self::Overwrite => Some(Decision::Overwrite),
            Self::Rename => Some(Decision::Rename),
            Self::Prompt => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let paths = commands::Paths {
        config: cli.config,
        assets: cli.assets,
        template: cli.template,
    };

    match cli.command {
        Commands::List { json } => {
            commands::list::run(&paths, json).await?;
        }
        Commands::Plan { ids, category, json } => {
            commands::plan::run(&paths, &ids, category.as_deref(), json).await?;
        }
        Commands::Example {
            id,
            output,
            name,
            no_git,
        } => {
            commands::example::run(&paths, id, output, name, no_git).await?;
        }
        Commands::Category { id, output, no_git } => {
            commands::category::run(&paths, id, output, no_git).await?;
        }
        Commands::Inject {
            id,
            target,
            on_conflict,
            dry_run,
        } => {
            commands::inject::run(&paths, id, &target, on_conflict, dry_run).await?;
        }
    }

    Ok(())
}
