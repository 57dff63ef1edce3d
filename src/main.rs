use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use devpulse::cache::AnalysisCache;
use devpulse::cli::{CacheCommands, Cli, Commands};
use devpulse::client::JiraClient;
use devpulse::commands;
use devpulse::config::Config;
use devpulse::engine::{AnalyzeOpts, Engine};
use devpulse::error::Result;
use devpulse::output;
use devpulse::store::FileStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "devpulse=debug" } else { "devpulse=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(io::stderr)
        .init();

    output::set_json_output(cli.json);

    match cli.command {
        // Commands that don't require config or a tracker client
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "devpulse", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run().await?;
        }
        // Commands that require config and the engine
        command => {
            let config = Config::load()?;
            let client = JiraClient::new(
                config.base_url()?,
                config.email.clone().unwrap_or_default(),
                config.api_token()?,
            );
            let cache = AnalysisCache::new(Box::new(FileStore::new(Config::cache_dir()?)));
            let engine = Engine::new(
                Arc::new(client),
                cache,
                config.analysis.clone(),
                config.projects.clone(),
            );

            let subject = config.resolve_user(cli.user.as_deref())?;
            let opts = AnalyzeOpts {
                since_days: cli.since_days,
                bypass_cache: cli.no_cache,
                budget: cli.timeout_secs.map(Duration::from_secs),
            };

            match command {
                Commands::Timing => {
                    commands::timing::run(&engine, &subject, &opts).await?;
                }
                Commands::Load => {
                    commands::load::run(&engine, &subject, &opts).await?;
                }
                Commands::Strengths => {
                    commands::strengths::run(&engine, &subject, &opts).await?;
                }
                Commands::Trends => {
                    commands::trends::run(&engine, &subject, &opts).await?;
                }
                Commands::Burnout => {
                    commands::burnout::run(&engine, &subject, &opts).await?;
                }
                Commands::Chemistry => {
                    commands::chemistry::run(&engine, &subject, &opts).await?;
                }
                Commands::Predict(args) => {
                    commands::predict::run(&engine, &subject, &args, &opts).await?;
                }
                Commands::Recommend { context } => {
                    commands::recommend::run(&engine, &subject, &context, &opts).await?;
                }
                Commands::Cache { action } => match action {
                    CacheCommands::Clear => {
                        commands::cache::clear(&engine, &subject)?;
                    }
                },
                Commands::Completions { .. } | Commands::Init => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
