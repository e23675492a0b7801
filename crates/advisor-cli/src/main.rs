//! Stock advisor command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Model-backed console loop (needs ANTHROPIC_API_KEY or a .secrets file)
//! stock-advisor
//!
//! # Rule-based, no API key; write a PDF per analysis
//! stock-advisor demo --report-dir reports
//!
//! # Web dashboard on http://localhost:8501
//! stock-advisor serve
//! ```

use advisor_llm::LanguageModelClient;
use advisor_llm::providers::AnthropicClient;
use advisor_stock::api::{MarketDataProvider, YahooFinanceClient};
use advisor_stock::platforms::{self, AppState, ConsoleOptions};
use advisor_stock::report::DashboardRenderer;
use advisor_stock::{Advisor, StockConfig};
use advisor_utils::SecretsStore;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_LOG_FILTER: &str = "warn,advisor_stock=info";
const DEFAULT_PORT: u16 = 8501;

#[derive(Parser, Debug)]
#[command(name = "stock-advisor", version)]
#[command(about = "BUY/HOLD/SELL recommendations from live prices and analyst targets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive console loop backed by the language model (default)
    Ask {
        /// Write a PDF report per analysis into this directory
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Console loop with the rule-based strategy; no API key needed
    Demo {
        /// Write a PDF report per analysis into this directory
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Serve the web dashboard
    Serve {
        /// Listen port [default: $PORT, else 8501]
        #[arg(long)]
        port: Option<u16>,
        /// Use the rule-based strategy
        #[arg(long)]
        demo: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    advisor_utils::init_tracing(DEFAULT_LOG_FILTER);

    let cli = Cli::parse();
    let config = StockConfig::builder()
        .with_env_overrides()
        .build()
        .context("invalid configuration")?;

    match cli.command.unwrap_or(Command::Ask { report_dir: None }) {
        Command::Ask { report_dir } => {
            let advisor = build_advisor(&config, false)?;
            run_console(&advisor, report_dir).await
        }
        Command::Demo { report_dir } => {
            println!("Demo mode: rule-based recommendations, no language model.\n");
            let advisor = build_advisor(&config, true)?;
            run_console(&advisor, report_dir).await
        }
        Command::Serve { port, demo } => {
            let port = port
                .or_else(|| std::env::var("PORT").ok().and_then(|v| v.parse().ok()))
                .unwrap_or(DEFAULT_PORT);
            let advisor = build_advisor(&config, demo)?;
            let state = AppState::new(advisor, DashboardRenderer::new()?);
            platforms::serve(state, port).await?;
            Ok(())
        }
    }
}

/// Wire the advisor; the API key is checked before any request is made
fn build_advisor(config: &StockConfig, demo: bool) -> anyhow::Result<Advisor> {
    let provider: Arc<dyn MarketDataProvider> = Arc::new(
        YahooFinanceClient::new(config.request_timeout)
            .context("failed to create the market-data client")?,
    );

    if demo {
        return Ok(Advisor::demo(provider, config));
    }

    let store = SecretsStore::from_env();
    let api_key = StockConfig::resolve_api_key(&store)?;
    let llm: Arc<dyn LanguageModelClient> =
        Arc::new(AnthropicClient::with_config(config.anthropic_config(api_key))?);

    info!(model = %config.model, "using model-backed recommendations");
    Ok(Advisor::model_backed(llm, provider, config))
}

async fn run_console(advisor: &Advisor, report_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let options = ConsoleOptions { report_dir };
    let completed =
        platforms::run_console(advisor, &options, io::stdin().lock(), io::stdout()).await?;
    info!(completed, "console session ended");
    Ok(())
}
