use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use birthday_sync::config::BirthdaySyncConfig;
use birthday_sync::model::SyncOutcome;
use birthday_sync::BirthdaySync;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "birthday_sync";

/// `EX_TEMPFAIL`: the scheduler should try again later.
const EXIT_RETRY: u8 = 75;

/// Birthday Sync - keeps an upcoming-birthdays snapshot in step with your contacts
#[derive(Parser)]
#[command(name = "birthday-sync")]
#[command(about = "Birthday Sync - keeps an upcoming-birthdays snapshot in step with your contacts")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync cycle now (default)
    Sync,
    /// Print the stored snapshot as JSON
    Show,
    /// Drop cached photos and reset the snapshot
    SignOut,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!(home_dir = %config.home_dir().display(), "Birthday Sync starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let module_cfg: BirthdaySyncConfig = config.module_config(MODULE_NAME)?;

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Check => check_config(&config, &module_cfg),
        command => {
            let module = Arc::new(
                BirthdaySync::init(&module_cfg, &config.home_dir())
                    .context("Failed to initialize birthday_sync")?,
            );
            match command {
                Commands::Show => show(&module).await,
                Commands::SignOut => sign_out(&module).await,
                _ => Ok(sync(&module).await),
            }
        }
    }
}

async fn sync(module: &Arc<BirthdaySync>) -> ExitCode {
    let outcome = module.client().sync_now().await;
    let snapshot = module.snapshot().await;
    tracing::info!(
        entries = snapshot.entries.len(),
        outcome = ?outcome,
        "sync finished"
    );

    match outcome {
        SyncOutcome::Success => {
            match snapshot.error_message.as_deref() {
                Some(message) => eprintln!("{message}"),
                None => println!("{} upcoming birthday(s)", snapshot.entries.len()),
            }
            ExitCode::SUCCESS
        }
        SyncOutcome::Retry { message } => {
            eprintln!("{message}");
            ExitCode::from(EXIT_RETRY)
        }
        SyncOutcome::Failure { message } => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn show(module: &Arc<BirthdaySync>) -> Result<ExitCode> {
    let snapshot = module.client().snapshot().await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(ExitCode::SUCCESS)
}

async fn sign_out(module: &Arc<BirthdaySync>) -> Result<ExitCode> {
    module
        .client()
        .sign_out()
        .await
        .context("Sign-out failed")?;
    println!("Signed out");
    Ok(ExitCode::SUCCESS)
}

fn check_config(config: &AppConfig, module_cfg: &BirthdaySyncConfig) -> Result<ExitCode> {
    tracing::info!("Checking configuration...");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    println!(
        "birthday_sync: window_days={} page_size={} account={}",
        module_cfg.window_days,
        module_cfg.page_size,
        module_cfg
            .account
            .as_ref()
            .map(|a| a.email.as_str())
            .unwrap_or("<none>")
    );
    Ok(ExitCode::SUCCESS)
}
