//! CLI entrypoint for Agent Desk
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::Result;
use clap::{Parser, Subcommand};
use desk_application::{
    AgentGateway, InMemoryCredentialStore, LoginInput, LoginUseCase, StreamQueryInput,
    StreamQueryUseCase,
};
use desk_application::{CredentialStore, CredentialsProvider};
use desk_domain::{Credential, Query};
use desk_infrastructure::{ConfigLoader, FileConfig, SupportGateway};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments for agent-desk
#[derive(Parser, Debug)]
#[command(name = "agent-desk")]
#[command(author, version, about = "Terminal client for the support agent service")]
#[command(long_about = r#"
Agent Desk talks to a remote support agent service: one-off questions stream
back token by token, and a chat mode keeps the conversation going.

Configuration files are loaded from (in priority order):
1. AGENT_DESK_* environment variables
2. --config <path>      Explicit config file
3. ./agent-desk.toml    Project-level config
4. ~/.config/agent-desk/config.toml   Global config

Example:
  agent-desk health
  agent-desk ask "How do I rotate my access keys?"
  agent-desk ask --sources --no-stream "What does the audit log cover?"
  agent-desk chat
"#)]
struct Cli {
    /// Base URL of the agent service (overrides configuration)
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// API key for the agent service (overrides environment and configuration)
    #[arg(long, value_name = "KEY", global = true)]
    api_key: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify an API key against the service and use it for this run
    Login {
        /// The key to verify (prompted for when omitted)
        #[arg(value_name = "API_KEY")]
        key: Option<String>,
    },

    /// Check that the service is up
    Health,

    /// Initialize the remote agent
    Init {
        /// Rebuild the agent even if it is already initialized
        #[arg(long)]
        force: bool,
    },

    /// Show the remote agent's runtime state
    Status,

    /// Show the model configuration the agent is running with
    Config,

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// Ask for source documents along with the answer
        #[arg(short, long)]
        sources: bool,

        /// Wait for the complete answer instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },

    /// Interactive chat with the agent
    Chat {
        /// Ask for source documents along with each answer
        #[arg(short, long)]
        sources: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Agent Desk");

    let config = ConfigLoader::load(cli.config.as_ref())?;
    config.validate()?;

    let base_url = cli
        .base_url
        .clone()
        .unwrap_or_else(|| config.server.base_url.clone());
    let resolved_key = resolve_api_key(&cli, &config);

    // === Dependency Injection ===
    // The store starts with whatever key the flags, environment, or file
    // provided; a successful login replaces it for the rest of the run.
    let credentials = Arc::new(InMemoryCredentialStore::new());
    if let Some(key) = &resolved_key {
        credentials.store(Credential::new(key.clone()));
    }

    let gateway: Arc<dyn AgentGateway> =
        Arc::new(SupportGateway::new(&base_url, credentials.clone()));

    match cli.command {
        Commands::Login { key } => run_login(gateway, credentials, key.or(resolved_key)).await,
        Commands::Health => run_health(gateway).await,
        Commands::Init { force } => run_init(gateway, force).await,
        Commands::Status => run_status(gateway).await,
        Commands::Config => run_config(gateway).await,
        Commands::Ask {
            question,
            sources,
            no_stream,
        } => run_ask(gateway, question, sources, no_stream).await,
        Commands::Chat { sources } => run_chat(gateway, credentials, sources).await,
    }
}

/// Resolve the API key: explicit flag first, then the environment variable
/// named by the configuration, then the key written in the file itself.
fn resolve_api_key(cli: &Cli, config: &FileConfig) -> Option<String> {
    if let Some(key) = &cli.api_key {
        return Some(key.clone());
    }
    if let Ok(key) = std::env::var(&config.auth.api_key_env) {
        if !key.is_empty() {
            return Some(key);
        }
    }
    config.auth.api_key.clone()
}

async fn run_login(
    gateway: Arc<dyn AgentGateway>,
    credentials: Arc<InMemoryCredentialStore>,
    resolved_key: Option<String>,
) -> Result<()> {
    let api_key = match resolved_key {
        Some(key) => key,
        None => prompt_line("API key")?,
    };

    let use_case = LoginUseCase::new(gateway, credentials);
    let receipt = use_case.execute(LoginInput::new(api_key)).await?;

    println!("Logged in as {}", receipt.username);
    Ok(())
}

async fn run_health(gateway: Arc<dyn AgentGateway>) -> Result<()> {
    let health = gateway.health().await?;
    println!("Service is {} (version {})", health.status, health.version);
    Ok(())
}

async fn run_init(gateway: Arc<dyn AgentGateway>, force: bool) -> Result<()> {
    let receipt = gateway.initialize(force).await?;
    println!("{}: {}", receipt.status, receipt.message);
    Ok(())
}

async fn run_status(gateway: Arc<dyn AgentGateway>) -> Result<()> {
    let status = gateway.status().await?;

    if status.initialized {
        println!("Agent is initialized");
    } else {
        println!("Agent is not initialized (run 'agent-desk init')");
    }
    println!("  Backend: {} ({})", status.llm_type, status.model_name);
    println!("  Queries answered: {}", status.total_queries);
    Ok(())
}

async fn run_config(gateway: Arc<dyn AgentGateway>) -> Result<()> {
    let settings = gateway.settings().await?;

    println!("Backend:     {}", settings.llm_type);
    println!("Model:       {}", settings.model_name);
    println!("Temperature: {}", settings.temperature);
    println!("Max tokens:  {}", settings.max_tokens);
    Ok(())
}

async fn run_ask(
    gateway: Arc<dyn AgentGateway>,
    question: String,
    sources: bool,
    no_stream: bool,
) -> Result<()> {
    if no_stream {
        let query = Query::new(question)?.with_sources(sources);
        let answer = gateway.ask(&query).await?;

        println!("{}", answer.response);
        if sources {
            print_source_list(answer.sources.as_deref());
        }
        return Ok(());
    }

    stream_question(&gateway, question, sources).await
}

async fn run_chat(
    gateway: Arc<dyn AgentGateway>,
    credentials: Arc<InMemoryCredentialStore>,
    sources: bool,
) -> Result<()> {
    // Chat needs a working credential up front; prompt and verify if none
    // was provided.
    if credentials.current().is_none() {
        let api_key = prompt_line("API key")?;
        let login = LoginUseCase::new(gateway.clone(), credentials.clone());
        let receipt = login.execute(LoginInput::new(api_key)).await?;
        println!("Logged in as {}", receipt.username);
    }

    println!("Chat with the support agent. Type 'exit' to leave.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        if let Err(e) = stream_question(&gateway, question.to_string(), sources).await {
            eprintln!("Error: {}", e);
        }
        println!();
    }

    println!("Bye");
    Ok(())
}

/// Stream one question to the terminal, cancelling on ctrl-c.
async fn stream_question(
    gateway: &Arc<dyn AgentGateway>,
    question: String,
    sources: bool,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let use_case = StreamQueryUseCase::new(gateway.clone());
    let input = StreamQueryInput::new(question).with_sources(sources);

    let result = use_case
        .execute_with_cancellation(
            input,
            |chunk| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            },
            cancel,
        )
        .await;
    signal_task.abort();

    match result {
        Ok(payload) => {
            println!();
            if sources {
                let listed: Option<Vec<String>> = payload
                    .get("sources")
                    .and_then(|s| serde_json::from_value(s.clone()).ok());
                print_source_list(listed.as_deref());
            }
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            println!();
            eprintln!("Cancelled");
            Ok(())
        }
        Err(e) => {
            println!();
            Err(e.into())
        }
    }
}

fn print_source_list(sources: Option<&[String]>) {
    let Some(sources) = sources else {
        return;
    };
    if sources.is_empty() {
        return;
    }

    println!();
    println!("Sources:");
    for source in sources {
        println!("  - {}", source);
    }
}

fn prompt_line(label: &str) -> Result<String> {
    prompt_line_from(label, &mut std::io::stdin().lock(), &mut std::io::stdout())
}

fn prompt_line_from(
    label: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<String> {
    write!(writer, "{}: ", label)?;
    writer.flush()?;

    let mut input = String::new();
    reader.read_line(&mut input)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{} must not be empty", label);
    }
    Ok(trimmed.to_string())
}
