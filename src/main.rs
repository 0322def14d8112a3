//! llmagent CLI - relay streamed LLM responses to console, HTTP, and
//! interactive consumers

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;

use llmagent::config::Config;
use llmagent::llm::{
    Aggregate, DrainState, Fragment, LlmProvider, MockProvider, OpenRouterConfig,
    OpenRouterProvider,
};
use llmagent::server;
use llmagent::tui::InteractiveShell;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "llmagent")]
#[command(about = "Relay streamed LLM responses to console, HTTP, and interactive consumers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single problem and stream the answer to stdout
    Ask {
        /// The problem for the LLM to solve
        #[arg(short, long)]
        problem: String,
    },

    /// Interactive chat shell
    Chat,

    /// Start the MCP HTTP server
    Serve {
        /// Listen port (overrides config and environment)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load()?;

    match cli.command {
        Commands::Ask { problem } => {
            config.validate()?;
            let provider = build_provider(&config)?;
            run_problem(provider.as_ref(), &problem).await?;
        }
        Commands::Chat => {
            config.validate()?;
            let mut shell = InteractiveShell::new(config)?;
            shell.run().await?;
        }
        Commands::Serve { port } => {
            config.validate()?;
            let provider = build_provider(&config)?;
            let port = port.unwrap_or(config.server.port);
            server::serve(provider, port).await?;
        }
        Commands::Config(cmd) => {
            run_config_command(cmd, config)?;
        }
    }

    Ok(())
}

/// Construct the configured provider. A missing credential is fatal here,
/// before any request exists.
fn build_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    match config.provider.as_str() {
        "openrouter" => {
            let api_key = config.openrouter_api_key().context(
                "LLM provider type is 'openrouter' but LLMAGENT_OPENROUTER_API_KEY is not set",
            )?;
            let provider = OpenRouterProvider::new(OpenRouterConfig {
                api_key,
                model: config.openrouter.model.clone(),
                base_url: None,
            })?;
            info!("using OpenRouter provider (model: {})", config.openrouter.model);
            Ok(Arc::new(provider))
        }
        "mock" => {
            info!("using mock provider");
            Ok(Arc::new(MockProvider::new()))
        }
        other => bail!(
            "unknown LLM provider type '{other}'; supported types are 'mock' and 'openrouter'"
        ),
    }
}

/// Console consumer: echo fragments as they arrive, then print the
/// aggregated response. A failure keeps whatever partial content arrived.
async fn run_problem(provider: &dyn LlmProvider, problem: &str) -> Result<()> {
    if problem.is_empty() {
        bail!("problem description cannot be empty");
    }

    println!("Processing problem: {problem}");

    let mut rx = provider.stream(problem).await?;
    let mut aggregate = Aggregate::new();

    while aggregate.state() == DrainState::Draining {
        let message = rx.recv().await;
        if let Some(Fragment::Content(text)) = &message {
            print!("{text}");
            std::io::stdout().flush()?;
        }
        aggregate.observe(message);
    }
    println!();

    match aggregate.state() {
        DrainState::Failed => {
            eprintln!(
                "Error getting response from LLM: {}",
                aggregate.error().unwrap_or("unknown")
            );
            if !aggregate.content().is_empty() {
                println!("\nPartial response before the error:");
                println!("{}", aggregate.content());
            }
        }
        _ => {
            if aggregate.content().is_empty() {
                println!("\nLLM response was empty.");
            } else {
                println!("\nLLM Response (fully aggregated):");
                println!("{}", aggregate.content());
            }
        }
    }

    Ok(())
}

fn run_config_command(cmd: ConfigCommands, config: Config) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            Config::default().save()?;

            println!("Configuration file created at: {}", path.display());
            println!();
            println!("Configuration (via environment variables):");
            println!("  LLMAGENT_LLM_PROVIDER_TYPE  ('mock' or 'openrouter')");
            println!("  LLMAGENT_OPENROUTER_API_KEY (required if provider is 'openrouter')");
            println!("  LLMAGENT_OPENROUTER_MODEL");
            println!("  LLMAGENT_MCP_SERVER_PORT");
        }
        ConfigCommands::Show => {
            // Mask the API key in display
            let mut display_config = config;
            if display_config.openrouter.api_key.is_some() {
                display_config.openrouter.api_key = Some("***".to_string());
            }
            println!("{}", toml::to_string_pretty(&display_config)?);

            println!("--- Environment Variables ---");
            for var in [
                "LLMAGENT_LLM_PROVIDER_TYPE",
                "LLMAGENT_OPENROUTER_API_KEY",
                "LLMAGENT_OPENROUTER_MODEL",
                "LLMAGENT_MCP_SERVER_PORT",
            ] {
                let status = if std::env::var(var).is_ok() { "set" } else { "not set" };
                println!("{var}: {status}");
            }
        }
        ConfigCommands::Path => {
            let path = Config::default_path();
            println!("{}", path.display());
            if path.exists() {
                println!("(file exists)");
            } else {
                println!("(file does not exist - run 'config init' to create)");
            }
        }
        ConfigCommands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid!");
                println!();
                match config.provider.as_str() {
                    "openrouter" => println!(
                        "Provider: openrouter (model: {})",
                        config.openrouter.model
                    ),
                    _ => println!("Provider: {}", config.provider),
                }
                println!("MCP server port: {}", config.server.port);
            }
            Err(e) => {
                println!("Configuration validation failed:");
                println!("  {e}");
                println!();
                println!("To fix, either edit the config file or set environment variables:");
                println!("  export LLMAGENT_LLM_PROVIDER_TYPE=mock");
                println!("  export LLMAGENT_OPENROUTER_API_KEY=your_key");
            }
        },
    }
    Ok(())
}
