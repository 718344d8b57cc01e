mod commands;
mod error;
mod http;
mod messages;
mod registry;
mod shared;
mod sink;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use crate::commands::{errors, phones, serve, Context};
use crate::error::{exit_code_for, report_error};
use crate::registry::Registry;
use crate::shared::SharedStore;
use phonebook_config as config;
use phonebook_store::Store;

#[derive(Debug, Parser)]
#[command(name = "phonebook", version, about = "Phone-number registry")]
struct Cli {
    /// Database url; overrides DATABASE_URL and the config file
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve(serve::ServeArgs),
    /// Print every stored phone number
    List(phones::ListArgs),
    /// Validate and store one entry
    Add(phones::AddArgs),
    /// Store every entry of a JSON batch
    Import(phones::ImportArgs),
    /// Show recently recorded failures
    Errors(errors::ErrorsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose, matches!(cli.command, Command::Serve(_)));
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        database_url,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    let mut app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
            Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
            Err(err) => debug!(error = %err, "config unavailable"),
        }
    }
    if let Some(url) = database_url {
        app_config.database_url = Some(url);
    }

    let database_url = app_config.require_database_url()?;
    let store =
        Store::connect(database_url).with_context(|| format!("open database {database_url}"))?;
    store.migrate().with_context(|| "run migrations")?;
    if verbose {
        debug!(version = store.schema_version()?, "database ready");
    }

    let store = SharedStore::new(store);
    let sink = sink::build_sink(&app_config.error_sink, &store);
    let registry = Arc::new(Registry::new(Arc::new(store.clone()), sink));
    let ctx = Context {
        registry: &registry,
        store: &store,
        json,
        config: &app_config,
    };

    let result = match command {
        Command::Serve(args) => serve::serve(&ctx, args).await,
        Command::List(args) => phones::list(&ctx, args).await,
        Command::Add(args) => phones::add(&ctx, args).await,
        Command::Import(args) => phones::import(&ctx, args).await,
        Command::Errors(args) => errors::list_errors(&ctx, args),
    };
    registry.flush_errors().await;
    result
}

fn init_logging(verbose: bool, serving: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if serving {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };
}
