use anyhow::{Context, Result};
use clap::Parser;
use market_mind::config::{Config, RuntimeConfig};
use market_mind::{AnalysisInput, AnalysisOrchestrator};
use serde_json::{Map, Value};
use tracing::info;

#[derive(Parser)]
#[command(name = "market-mind")]
#[command(about = "Structured marketing analysis with heuristic fallback", long_about = None)]
struct Cli {
    /// brand_evaluation, product_profile, prospect_messaging or strategic_synthesis
    #[arg(long)]
    task: String,

    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Extra input field, repeatable (e.g. --field audience=nurses)
    #[arg(long = "field", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Language tag for generated text (defaults to the configured language)
    #[arg(long, default_value = "")]
    language: String,

    /// Skip the remote model and use heuristics only
    #[arg(long)]
    offline: bool,
}

fn parse_field(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(RuntimeConfig::load_from_env().log_level.as_str())
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load().context("loading configuration")?;
    if cli.offline {
        config.remote.enabled = false;
    }

    info!(
        "market-mind {} starting (remote: {})",
        env!("CARGO_PKG_VERSION"),
        if config.remote.enabled { config.remote.endpoint.as_str() } else { "disabled" }
    );

    let mut fields = Map::new();
    for (key, value) in cli.fields {
        fields.insert(key, Value::String(value));
    }
    fields.insert("name".to_string(), Value::String(cli.name));
    fields.insert("description".to_string(), Value::String(cli.description));

    let orchestrator = AnalysisOrchestrator::from_config(&config);
    let input = AnalysisInput::new(cli.task, fields, cli.language);
    let result = orchestrator.analyze_input(&input).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
