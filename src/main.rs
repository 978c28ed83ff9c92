// src/main.rs
use std::path::PathBuf;

use clap::Parser;

use evalrun::banner;
use evalrun::client::ApiClient;
use evalrun::config::{self, AppConfig, EvalJobConfig};
use evalrun::errors::Result;
use evalrun::runner;

#[derive(Parser)]
#[command(
    name = "evalrun",
    version,
    about = "Submit a batch evaluation job and collect its results"
)]
struct Cli {
    /// Path to the eval job description (JSON)
    #[arg(default_value = "eval_config.json")]
    config: PathBuf,

    /// Path the markdown report is written to
    #[arg(default_value = "eval_report.md")]
    output: PathBuf,
}

#[tokio::main]
async fn main() {
    // .env is optional for local runs
    let _ = dotenvy::dotenv();

    let default_filter = if config::debug_requested() { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    banner::print_banner();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("❌ {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("   caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Credential check comes first; nothing touches the network without it.
    let app_config = AppConfig::from_env()?;
    let job = EvalJobConfig::load(&cli.config)?;

    banner::print_run_info(&app_config, &job, &cli.config, &cli.output);

    let api = ApiClient::new(reqwest::Client::new(), app_config.clone());
    runner::run_job(&api, &app_config, &job, &cli.output).await
}
