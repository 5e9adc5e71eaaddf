use billing::RestBillingClient;
use clap::{Parser, Subcommand};
use gateway::directory::RestDirectory;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod envcheck;
mod scan;
mod sync;
mod telemetry;

#[derive(Parser)]
#[command(name = "mesa", about = "Mesa tenant gateway and operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the tenant gateway
    Serve {
        #[arg(long, default_value = "mesa.yaml")]
        config: PathBuf,
    },
    /// List user accounts via the directory admin API
    Users {
        #[arg(long, default_value = "mesa.yaml")]
        config: PathBuf,
    },
    /// Reconcile billing subscriptions against tenant accounts
    Sync {
        #[arg(long, default_value = "mesa.yaml")]
        config: PathBuf,
    },
    /// Print this machine's device fingerprint
    Fingerprint,
    /// Validate an environment file and repair known corruption
    CheckEnv {
        #[arg(long, default_value = ".env.local")]
        path: PathBuf,
        /// Rewrite the file when corruption is found
        #[arg(long)]
        fix: bool,
    },
    /// Scan source files for stray unwanted fragments
    Scan {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("config is missing the `{0}` section")]
    MissingSection(&'static str),

    #[error("invalid gateway config: {0}")]
    GatewayConfig(#[from] gateway::config::ValidationError),

    #[error("invalid billing config: {0}")]
    BillingConfig(#[from] billing::config::ValidationError),

    #[error("gateway failed: {0}")]
    Run(#[from] gateway::RunError),

    #[error(transparent)]
    Sync(#[from] sync::SyncError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve { config } => serve(config).await,
        Command::Users { config } => users(config).await,
        Command::Sync { config } => sync_report(config).await,
        Command::Fingerprint => fingerprint().await,
        Command::CheckEnv { path, fix } => envcheck::run(&path, fix).map_err(CliError::from),
        Command::Scan { root } => scan::run(&root).map_err(CliError::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &std::path::Path) -> Result<config::Config, CliError> {
    let mut loaded = config::Config::from_file(path)?;
    loaded.apply_env_overrides();
    Ok(loaded)
}

async fn serve(path: PathBuf) -> Result<(), CliError> {
    let loaded = load_config(&path)?;
    let _telemetry = telemetry::init(&loaded.common);

    let gateway_config = loaded.gateway.ok_or(CliError::MissingSection("gateway"))?;
    gateway_config.validate()?;
    let billing_config = loaded.billing.ok_or(CliError::MissingSection("billing"))?;
    billing_config.validate()?;

    let billing_client = Arc::new(RestBillingClient::new(&billing_config));
    gateway::run(gateway_config, billing_client).await?;
    Ok(())
}

async fn users(path: PathBuf) -> Result<(), CliError> {
    let loaded = load_config(&path)?;
    let gateway_config = loaded.gateway.ok_or(CliError::MissingSection("gateway"))?;
    gateway_config.validate()?;

    let directory = RestDirectory::new(&gateway_config.directory);
    // Failures are swallowed into an empty listing here, same as the admin
    // page this replaces; the log carries the real error.
    let accounts = gateway::actions::list_all_users(&directory).await;

    println!("{} account(s)", accounts.len());
    for account in accounts {
        println!(
            "{}  {}  {}",
            account.id,
            account.email.as_deref().unwrap_or("-"),
            account.created_at.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn sync_report(path: PathBuf) -> Result<(), CliError> {
    let loaded = load_config(&path)?;
    let gateway_config = loaded.gateway.ok_or(CliError::MissingSection("gateway"))?;
    let billing_config = loaded.billing.ok_or(CliError::MissingSection("billing"))?;
    billing_config.validate()?;

    let billing_client = RestBillingClient::new(&billing_config);
    let directory = RestDirectory::new(&gateway_config.directory);

    let report = sync::run(&billing_client, &directory).await?;

    println!("subscriptions: {}", report.subscriptions);
    println!("matched:       {}", report.matched);
    println!("unmatched:     {}", report.unmatched);
    if report.duplicate_tenants.is_empty() {
        println!("no duplicate billing customers");
    } else {
        println!("duplicate billing customers for:");
        for tenant in &report.duplicate_tenants {
            println!("  {tenant}");
        }
    }
    Ok(())
}

async fn fingerprint() -> Result<(), CliError> {
    let collector = station::FingerprintCollector::new();
    let fingerprint = collector.refresh().await;

    println!("fingerprint: {}", fingerprint.value);
    if let Some(signals) = fingerprint.raw {
        println!("hostname:    {}", signals.hostname);
        println!("os/arch:     {}/{}", signals.os, signals.arch);
        println!("locale:      {}", signals.locale);
        println!("timezone:    {}", signals.timezone);
        println!("cpus:        {}", signals.cpu_count);
    }
    Ok(())
}
