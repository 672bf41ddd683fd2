//! Hoist - artifact installer and service lifecycle manager
//!
//! Usage:
//!   hoist install <id>      # Fetch and unpack the configured artifact
//!   hoist launch <id>       # Register services, then run the enable hook
//!   hoist halt <id>         # Run the disable hook, then stop services
//!   hoist executables <id>  # List discovered executables

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hoist_core::context::AppContext;
use hoist_core::launchable::{Launchable, ServiceLifecycle, StopPolicy};

#[derive(Parser)]
#[command(name = "hoist")]
#[command(about = "Artifact installer and service lifecycle manager", long_about = None)]
struct Cli {
    /// Configuration file (defaults to $CONFIG_PATH, then ~/.config/hoist/hoist.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and unpack the launchable's artifact
    Install {
        /// Launchable id from the configuration
        id: String,
    },

    /// Write service definitions and ask the supervisor to reconcile
    Start {
        /// Launchable id from the configuration
        id: String,
    },

    /// Stop every service of the launchable
    Stop {
        /// Launchable id from the configuration
        id: String,
        /// Override the configured stop policy
        #[arg(long)]
        policy: Option<PolicyArg>,
    },

    /// Run the launchable's enable hook
    Enable {
        /// Launchable id from the configuration
        id: String,
    },

    /// Run the launchable's disable hook
    Disable {
        /// Launchable id from the configuration
        id: String,
    },

    /// Start, then enable
    Launch {
        /// Launchable id from the configuration
        id: String,
        /// Install the artifact first if it is missing
        #[arg(long)]
        install: bool,
    },

    /// Disable, then stop
    Halt {
        /// Launchable id from the configuration
        id: String,
        /// Override the configured stop policy
        #[arg(long)]
        policy: Option<PolicyArg>,
    },

    /// List the executables discovered in the installed artifact
    Executables {
        /// Launchable id from the configuration
        id: String,
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show where a launchable lives and whether it is installed
    Info {
        /// Launchable id from the configuration
        id: String,
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Return at the first failing service
    Abort,
    /// Attempt every service, then report the first failure
    Continue,
}

impl From<PolicyArg> for StopPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Abort => StopPolicy::Abort,
            PolicyArg::Continue => StopPolicy::Continue,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hoist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::load(cli.config)?;
    tracing::debug!(config = %ctx.config_path().display(), "Loaded configuration");

    run(&ctx, cli.command)
}

fn run(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Install { id } => {
            let launchable = ctx.launchable(&id)?;
            install(ctx, &launchable)?;
            println!("✓ Installed {} ({})", launchable.id, launchable.version());
        }
        Commands::Start { id } => {
            let launchable = ctx.launchable(&id)?;
            lifecycle(ctx, &launchable, None).start()?;
            println!("✓ Registered services for {}", launchable.id);
        }
        Commands::Stop { id, policy } => {
            let launchable = ctx.launchable(&id)?;
            let result = lifecycle(ctx, &launchable, policy).stop();
            print_outputs(stop_outputs(&result));
            result?;
            println!("✓ Stopped {}", launchable.id);
        }
        Commands::Enable { id } => {
            let launchable = ctx.launchable(&id)?;
            print!("{}", launchable.enable()?);
            println!("✓ Enabled {}", launchable.id);
        }
        Commands::Disable { id } => {
            let launchable = ctx.launchable(&id)?;
            print!("{}", launchable.disable()?);
            println!("✓ Disabled {}", launchable.id);
        }
        Commands::Launch { id, install: fetch } => {
            let launchable = ctx.launchable(&id)?;
            if fetch {
                install(ctx, &launchable)?;
            }
            lifecycle(ctx, &launchable, None).launch()?;
            println!("✓ Launched {} ({})", launchable.id, launchable.version());
        }
        Commands::Halt { id, policy } => {
            let launchable = ctx.launchable(&id)?;
            let result = lifecycle(ctx, &launchable, policy).halt();
            if let Err(err) = &result {
                print_outputs(err.stop_outputs().unwrap_or_default());
            }
            result?;
            println!("✓ Halted {}", launchable.id);
        }
        Commands::Executables { id, format } => {
            let launchable = ctx.launchable(&id)?;
            run_executables(ctx, &launchable, format)?;
        }
        Commands::Info { id, format } => {
            let launchable = ctx.launchable(&id)?;
            run_info(&launchable, format)?;
        }
    }
    Ok(())
}

fn lifecycle<'a>(
    ctx: &'a AppContext,
    launchable: &'a Launchable,
    policy: Option<PolicyArg>,
) -> ServiceLifecycle<'a> {
    let stop_policy = policy.map(StopPolicy::from).unwrap_or(ctx.stop_policy());
    ServiceLifecycle::new(launchable, ctx.supervisor()).with_stop_policy(stop_policy)
}

fn install(ctx: &AppContext, launchable: &Launchable) -> Result<()> {
    let fetcher = ctx.fetcher()?;
    launchable
        .install(&fetcher)
        .with_context(|| format!("Failed to install {}", launchable.id))
}

/// Per-service stop output, including what was collected before a failure.
fn stop_outputs(result: &hoist_core::Result<Vec<String>>) -> &[String] {
    match result {
        Ok(outputs) => outputs,
        Err(err) => err.stop_outputs().unwrap_or_default(),
    }
}

fn print_outputs(outputs: &[String]) {
    for output in outputs.iter().filter(|o| !o.is_empty()) {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }
}

fn run_executables(ctx: &AppContext, launchable: &Launchable, format: OutputFormat) -> Result<()> {
    let executables = lifecycle(ctx, launchable, None)
        .executables()
        .with_context(|| format!("{} has no executables; is it installed?", launchable.id))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&executables)?);
        }
        OutputFormat::Table => {
            let width = executables
                .iter()
                .map(|e| e.name().len())
                .max()
                .unwrap_or(0)
                .max("SERVICE".len());
            println!("{:<width$}  EXECUTABLE", "SERVICE");
            for executable in &executables {
                println!(
                    "{:<width$}  {}",
                    executable.name(),
                    executable.exec_path.display()
                );
            }
        }
    }
    Ok(())
}

fn run_info(launchable: &Launchable, format: OutputFormat) -> Result<()> {
    let install_dir = launchable.install_dir();
    let installed = install_dir.is_dir();

    match format {
        OutputFormat::Json => {
            let info = serde_json::json!({
                "id": launchable.id,
                "location": launchable.location,
                "version": launchable.version(),
                "run_as": launchable.run_as,
                "config_dir": launchable.config_dir,
                "root_dir": launchable.root_dir,
                "install_dir": install_dir,
                "installed": installed,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Table => {
            println!("Launchable:  {}", launchable.id);
            println!("Location:    {}", launchable.location);
            println!("Version:     {}", launchable.version());
            println!("Run as:      {}", launchable.run_as);
            println!("Config dir:  {}", launchable.config_dir.display());
            println!("Install dir: {}", install_dir.display());
            println!(
                "Installed:   {}",
                if installed { "yes" } else { "no" }
            );
        }
    }
    Ok(())
}
