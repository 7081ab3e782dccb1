use std::process::ExitCode;

use agrisense::cli::*;
use agrisense::config::AppConfig;
use agrisense::logging;
use agrisense::rag::GenerationMode;
use anyhow::Context;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            payload,
            message,
            language,
            mode,
        } => ask(cli.verbose, payload, message, &language, mode).await,
        command => match run(command, cli.verbose).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                print_error(&format!("{e:#}"));
                ExitCode::FAILURE
            }
        },
    }
}

/// `ask` keeps stdout for the answer and reports failures as JSON on stderr
async fn ask(
    verbose: bool,
    payload: Option<String>,
    message: Option<String>,
    language: &str,
    mode: Option<GenerationMode>,
) -> ExitCode {
    let _ = logging::init_simple_logging(if verbose { "debug" } else { "warn" });

    let outcome = async {
        let config = AppConfig::load()?;
        let request = parse_ask_request(payload.as_deref(), message.as_deref(), language)?;
        handle_ask(&config, request, mode).await
    }
    .await;

    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::json!({ "error": e.user_message() }));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, verbose: bool) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    if matches!(command, Commands::Serve { .. }) {
        let mut logging_config = config.logging.clone();
        if verbose {
            logging_config.level = "debug".to_string();
        }
        logging::init_logging_with_config(&logging_config)?;
    } else {
        logging::init_simple_logging(if verbose { "debug" } else { "info" })?;
    }
    info!("Configuration loaded successfully");

    match command {
        Commands::Serve {
            host,
            port,
            no_cors,
        } => {
            handle_serve_api(&config, host, port, no_cors).await?;
        }
        Commands::Populate { file } => {
            handle_populate_command(&config, &file)
                .await
                .with_context(|| format!("Failed to populate from {file}"))?;
        }
        Commands::Remember {
            question,
            answer,
            farmer_id,
            location,
        } => {
            handle_remember_command(&config, &question, &answer, farmer_id, location).await?;
        }
        Commands::Stats { json } => {
            handle_stats_command(&config, json).await?;
        }
        Commands::Config => {
            handle_config_command(&config);
        }
        Commands::Ask { .. } => {}
    }

    Ok(())
}
