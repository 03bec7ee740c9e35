//! chainnet-dev CLI - Development tool for the chainnet test network

use anyhow::Result;
use chainnet_dev::commands::{self, Context};
use chainnet_dev::config::{Action, Settings};
use chainnet_dev::utils::errors::{display_error_and_exit, enhance_error};
use chainnet_dev::utils::init_tracing;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chainnet-dev")]
#[command(author, version, about = "Development CLI for the chainnet blockchain test network", long_about = None)]
struct Cli {
    /// Verbose output (can be used multiple times: -v, -vv)
    /// default: INFO, -v: DEBUG, -vv: TRACE
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dry-run mode: print commands instead of running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Path to a configuration file
    #[arg(long, global = true, env = "CHAINNET_DEV_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the status API and the interactive menu (default)
    Run,

    /// Start only the status API
    Serve,

    /// Build images, create clusters and apply manifests
    Deploy,

    /// Delete manifests, clusters and images
    Remove {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage node images
    Images {
        #[command(subcommand)]
        command: ImagesCommands,
    },

    /// Manage minikube clusters
    Clusters {
        #[command(subcommand)]
        command: ClustersCommands,
    },

    /// Apply or delete manifests in the current context
    Manifests {
        #[command(subcommand)]
        command: ManifestsCommands,
    },

    /// Check prerequisites and run preflight checks
    Check,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ImagesCommands {
    /// Build every configured image
    Build,

    /// Remove every configured image
    Remove,
}

#[derive(Subcommand)]
enum ClustersCommands {
    /// Create the clusters and deploy node workloads
    Create,

    /// Delete node workloads and clusters
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print nodes and pods of every profile as JSON
    Status,
}

#[derive(Subcommand)]
enum ManifestsCommands {
    /// kubectl apply every manifest
    Apply,

    /// kubectl delete every manifest
    Delete,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write an example configuration file
    Init {
        /// Destination path
        #[arg(short, long, default_value = ".chainnet-dev.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => display_error_and_exit(enhance_error(&e)),
    }
}

fn run(cli: Cli) -> Result<i32> {
    let command = cli.command.unwrap_or(Commands::Run);

    // These never touch the configuration
    match &command {
        Commands::Completion { shell } => return handle_completion_command(*shell),
        Commands::Version => return handle_version_command(),
        Commands::Config {
            command: ConfigCommands::Init { path, force },
        } => {
            commands::config::init(path, *force)?;
            return Ok(0);
        }
        _ => {}
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let ctx = Context::new(settings, cli.dry_run);
    if cli.dry_run {
        ctx.log.info("DRY RUN MODE: commands are printed, not executed");
    }

    match command {
        Commands::Run => {
            let exit = commands::serve::run(&ctx)?;
            return Ok(exit.code());
        }
        Commands::Serve => commands::serve::serve(&ctx)?,
        Commands::Deploy => commands::deploy::run(&ctx, Action::Create, false)?,
        Commands::Remove { yes } => commands::deploy::run(&ctx, Action::Remove, yes)?,
        Commands::Images { command } => handle_images_command(&ctx, command)?,
        Commands::Clusters { command } => handle_clusters_command(&ctx, command)?,
        Commands::Manifests { command } => handle_manifests_command(&ctx, command)?,
        Commands::Check => commands::check::run(&ctx)?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(&ctx.settings)?,
            ConfigCommands::Init { path, force } => commands::config::init(&path, force)?,
        },
        Commands::Completion { .. } | Commands::Version => {}
    }

    Ok(0)
}

fn handle_images_command(ctx: &Context, command: ImagesCommands) -> Result<()> {
    match command {
        ImagesCommands::Build => commands::images::manage(ctx, Action::Create),
        ImagesCommands::Remove => commands::images::manage(ctx, Action::Remove),
    }
}

fn handle_clusters_command(ctx: &Context, command: ClustersCommands) -> Result<()> {
    match command {
        ClustersCommands::Create => commands::clusters::create(ctx),
        ClustersCommands::Delete { yes } => commands::clusters::delete(ctx, yes),
        ClustersCommands::Status => commands::clusters::status(ctx),
    }
}

fn handle_manifests_command(ctx: &Context, command: ManifestsCommands) -> Result<()> {
    match command {
        ManifestsCommands::Apply => commands::manifests::deploy(ctx, Action::Create),
        ManifestsCommands::Delete => commands::manifests::deploy(ctx, Action::Remove),
    }
}

fn handle_completion_command(shell: Shell) -> Result<i32> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "chainnet-dev", &mut io::stdout());
    Ok(0)
}

fn handle_version_command() -> Result<i32> {
    println!("chainnet-dev {}", env!("CARGO_PKG_VERSION"));
    println!("Development CLI for the chainnet blockchain test network");
    Ok(0)
}
