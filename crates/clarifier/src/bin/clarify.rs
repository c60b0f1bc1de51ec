use anyhow::Context;
use clap::{Parser, Subcommand};
use clarifier::{OllamaRuleClarifier, OllamaSettings, PromptTemplate, RuleClarifier};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "silat-clarify")]
#[command(about = "Explain which Pencak Silat rule a foul falls under", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    ollama_url: String,

    #[arg(long, env = "OLLAMA_MODEL", default_value = "qwen2.5:7b")]
    model: String,

    /// Prompt template file (system prompt, `---`, user prompt)
    #[arg(long, env = "CLARIFIER_PROMPT_PATH")]
    prompt: Option<PathBuf>,

    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clarify a foul description
    Clarify { description: String },
    /// Check that Ollama is reachable and the model is installed
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("silat_clarify={},clarifier={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let template = match &cli.prompt {
        Some(path) => PromptTemplate::from_file(path).context("Failed to load prompt template")?,
        None => PromptTemplate::default(),
    };

    let settings = OllamaSettings {
        base_url: cli.ollama_url.clone(),
        model: cli.model.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    let clarifier =
        OllamaRuleClarifier::new(settings, template).context("Failed to build rule clarifier")?;

    match cli.command {
        Commands::Clarify { description } => {
            let clarification = clarifier
                .clarify(&description)
                .await
                .context("Rule clarification failed")?;
            println!("{}", serde_json::to_string_pretty(&clarification)?);
        }
        Commands::Health => {
            if clarifier.health_check().await? {
                tracing::info!("Ollama is up and model '{}' is available", cli.model);
            } else {
                anyhow::bail!("Ollama is unreachable or model '{}' is missing", cli.model);
            }
        }
    }

    Ok(())
}
