use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tech_article_generator::config::MODEL_ENV;
use tech_article_generator::{resolve_config_dir, CrewConfig, GenaiClient, Inputs, ToolRegistry, TopicCrew};

/// Tech Article Generator - pick the next tech article topic with an LLM crew
#[derive(Parser, Debug)]
#[command(name = "tech-article-generator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing agents.toml, tasks.toml and crew.toml
    #[arg(short, long, default_value = "config")]
    config_dir: PathBuf,

    /// Extra template input as key=value (repeatable)
    #[arg(short, long = "input", value_name = "KEY=VALUE")]
    inputs: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the research tools and exit
    #[arg(long)]
    list_tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the result
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load .env files (local first, then home directory)
    // Errors are ignored - files are optional
    let _ = dotenvy::from_filename(".env");
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".env"));
    }

    if args.list_tools {
        let specs = ToolRegistry::topic_research().specs();
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    let mut inputs = Inputs::with_defaults();
    for raw in &args.inputs {
        let (key, value) = Inputs::parse_pair(raw)?;
        inputs.insert(key, value);
    }

    let config_dir = resolve_config_dir(&args.config_dir);
    let config = CrewConfig::load(&config_dir)
        .with_context(|| format!("loading crew from {}", config_dir.display()))?;
    let llm_config = config.llm.resolve(std::env::var(MODEL_ENV).ok())?;
    info!(model = %llm_config.model, config_dir = %config_dir.display(), "Configured crew");

    let llm = Arc::new(GenaiClient::new(&llm_config));
    let crew = TopicCrew::new(config, &llm_config, llm, inputs)?;
    let output = crew.kickoff().await?;

    info!(run_id = %output.run_id, duration_ms = output.duration_ms, "Crew finished");
    println!("{}", output.raw);
    Ok(())
}
