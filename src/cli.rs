use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::{
    collect_logs, config_interpreter, db_interpreter, instrumented_db_interpreter,
    logging_interpreter, Store, TracingSink,
};
use crate::programs::{handle_request, handle_request_without_db, multiplier, Request};
use crate::runtime::{call_cc_interpreter, compose, val_to_json, Interpreter, Stack, Val};

#[derive(Parser)]
#[command(name = "effectkit")]
#[command(about = "Effectkit - run computations through swappable interpreters", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Handle a request: log, check the cookie, load a record
    Request {
        /// Cookie to check against the configured secret
        #[arg(long)]
        cookie: String,

        /// Id of the record to load
        #[arg(long)]
        id: String,

        /// Request id (generated if omitted)
        #[arg(long)]
        request_id: Option<String>,

        /// Log every store call and its result
        #[arg(long)]
        instrument: bool,
    },

    /// Multiply numbers, exiting early on zero
    Multiply {
        /// Numbers to multiply
        #[arg(required = true, allow_negative_numbers = true)]
        numbers: Vec<f64>,
    },

    /// Handle a request with the collecting logger and print the logs
    Collect {
        /// Cookie to check against the configured secret
        #[arg(long)]
        cookie: String,
    },
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

/// Run the CLI with provided arguments
pub async fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli).await
}

/// Apply the `--config` override and load configuration
pub fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        std::env::set_var("EFFECTKIT_CONFIG_PATH", config_path);
    }
    Config::load()
}

/// Install the stderr subscriber; `RUST_LOG` wins over the configured filter
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    init_tracing(&config.log_filter);
    let output = execute(&config, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&val_to_json(&output))?);
    Ok(())
}

/// Run one command against `config` and return its result
pub async fn execute(config: &Config, command: Commands) -> Result<Val> {
    match command {
        Commands::Request {
            cookie,
            id,
            request_id,
            instrument,
        } => {
            let mut req = Request::new(cookie, id);
            if let Some(request_id) = request_id {
                req.id = request_id;
            }

            let store: Arc<dyn Store> = Arc::new(config.store());
            let db: Arc<dyn Interpreter> = if instrument {
                Arc::new(instrumented_db_interpreter(store))
            } else {
                Arc::new(db_interpreter(store))
            };
            let stack = compose(vec![
                Arc::new(logging_interpreter(Arc::new(TracingSink))) as Arc<dyn Interpreter>,
                Arc::new(config_interpreter(config.record())),
                db,
            ]);

            stack
                .run_async(handle_request(req))
                .await
                .context("Request computation failed")
        }

        Commands::Multiply { numbers } => Stack::new()
            .layer(call_cc_interpreter())
            .run(multiplier(numbers))
            .context("Multiplier computation failed"),

        Commands::Collect { cookie } => {
            let stack = Stack::new()
                .layer(config_interpreter(config.record()))
                .layer(collect_logs());
            stack
                .run(handle_request_without_db(Request::new(cookie, "")))
                .context("Collect computation failed")
        }
    }
}
