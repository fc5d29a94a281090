use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use decision_lab::config::Config;
use decision_lab::http::{HttpState, start_http_server};
use decision_lab::orchestrator::{build_analyzer, input_is_long_enough};
use decision_lab::schemas::AnalysisResponse;

#[derive(Parser)]
#[command(name = "decision-lab")]
#[command(about = "Structural analysis of decision anxiety")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address, overrides DECISION_LAB_HTTP_BIND
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Analyze one narrative and print the JSON response
    Analyze {
        /// Read the narrative from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.runtime.log_level)
        .unwrap_or_else(|_| EnvFilter::new("decision_lab=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.runtime.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    init_tracing(&config);

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.runtime.http_bind = bind;
            }
            info!(
                model = %config.llm.model,
                max_attempts = config.analysis.max_attempts,
                "Starting decision-lab"
            );
            let state = HttpState::from_config(config)?;
            start_http_server(state).await?;
        }
        Commands::Analyze { file } => {
            let text = read_input(file)?;
            let text = text.trim();
            if !input_is_long_enough(text, config.analysis.min_input_chars) {
                bail!(
                    "input must be at least {} characters",
                    config.analysis.min_input_chars
                );
            }
            let Some(analyzer) = build_analyzer(&config)? else {
                bail!("OPENAI_API_KEY is not set");
            };
            let result = analyzer.analyze(text).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&AnalysisResponse::ok(result))?
            );
        }
    }

    Ok(())
}
