//! ember: the main entry point.
//!
//! Parses flags, loads configuration, constructs the transport client,
//! tool dispatcher, and conversation orchestrator once, then drives
//! `chat()` per line of input. This file is deliberately thin glue; all
//! behavior lives in the library crates.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ember_client::{ChatClient, ClientConfig};
use ember_config::AppConfig;
use ember_security::approval::InteractivePrompt;
use ember_security::audit::JsonlSink;
use ember_session::{ChatOptions, ConversationOrchestrator, OrchestratorConfig, SessionStore, TurnOutcome};
use ember_tools::{DispatcherConfig, ToolDispatcher};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "ember", about = "ember: a terminal coding assistant", version)]
struct Cli {
    /// Model identifier (overrides config)
    #[arg(long)]
    model: Option<String>,

    /// Endpoint base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Config file path (defaults to ~/.ember/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load and save the conversation at this path
    #[arg(long)]
    session: Option<PathBuf>,

    /// Report every tool call without executing anything
    #[arg(long)]
    dry_run: bool,

    /// Run shell commands without prompting (subject to the allowlist)
    #[arg(short = 'y', long = "yes")]
    auto_approve: bool,

    /// Disable streamed output
    #[arg(long)]
    no_stream: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if cli.dry_run {
        config.tools.dry_run = true;
    }
    if cli.auto_approve {
        config.tools.auto_approve = true;
    }

    if config.api_key.is_none() {
        eprintln!("No API key configured.");
        eprintln!("Set EMBER_API_KEY (or OPENAI_API_KEY), or add api_key to {}.", AppConfig::default_path().display());
        return Err("no API key".into());
    }

    let client = Arc::new(ChatClient::new(ClientConfig {
        base_url: config.base_url.clone(),
        api_key: config.api_key.clone(),
        model: config.model.clone(),
        max_retries: config.client.max_retries,
        timeout: Duration::from_millis(config.client.timeout_ms),
    })?);

    let mut dispatcher = ToolDispatcher::new(
        DispatcherConfig {
            dry_run: config.tools.dry_run,
            auto_approve: config.tools.auto_approve,
            allowlist: config.tools.allowlist.clone(),
        },
        Arc::new(InteractivePrompt),
    );
    if let Some(path) = &config.tools.audit_log {
        dispatcher = dispatcher.with_audit(Arc::new(JsonlSink::new(path.clone())));
    }

    let mut orchestrator = ConversationOrchestrator::new(
        client,
        Arc::new(dispatcher),
        OrchestratorConfig {
            max_steps: config.session.max_steps,
            system_prompt: config.session.system_prompt.clone(),
        },
    );

    let store = cli.session.map(SessionStore::new);
    if let Some(store) = &store
        && store.exists()
    {
        orchestrator.replace_history(store.load()?);
        println!("Restored session from {}", store.path().display());
    }

    println!("ember | model: {} | type 'exit' to quit", config.model);
    if config.tools.dry_run {
        println!("(dry-run: tool calls are reported, never executed)");
    }

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    print!("> ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            print!("> ");
            std::io::stdout().flush()?;
            continue;
        }
        if matches!(line.as_str(), "exit" | "quit") {
            break;
        }

        let outcome = if cli.no_stream {
            orchestrator.chat(&line, ChatOptions::buffered()).await
        } else {
            let mut print_chunk = |chunk: &str| {
                print!("{chunk}");
                let _ = std::io::stdout().flush();
            };
            orchestrator
                .chat(&line, ChatOptions::streamed(&mut print_chunk))
                .await
        };

        match outcome {
            Ok(TurnOutcome::Completed(text)) => {
                if cli.no_stream {
                    println!("{text}");
                } else {
                    // Streamed fragments are already on screen
                    println!();
                }
            }
            Ok(TurnOutcome::StepLimitReached) => {
                println!("[step limit reached; send another message to continue]");
            }
            Err(e) => {
                eprintln!("[error] {e}");
            }
        }

        if let Some(store) = &store
            && let Err(e) = store.save(orchestrator.history())
        {
            eprintln!("[warning] failed to save session: {e}");
        }

        print!("> ");
        std::io::stdout().flush()?;
    }

    Ok(())
}
