use anyhow::Result;
use clap::Parser;
use datacrew_core::constants::{defaults, env};
use datacrew_core::{CrewEvent, DataScienceCrew, Settings};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "datacrew")]
#[command(about = "Research a topic with a researcher, data engineer and report builder crew")]
#[command(version)]
struct Cli {
    /// Topic to analyze
    #[arg(default_value = defaults::TOPIC)]
    topic: String,

    /// LLM model to use for every agent
    #[arg(short, long)]
    model: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only print the final result
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values in .env win over the inherited environment.
    let env_file = dotenvy::dotenv_override();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(default_log_filter(cli.quiet))
            }),
        )
        .with_target(false)
        .init();

    if let Some(e) = env_file_problem(env_file) {
        tracing::warn!("ignoring .env: {e}");
    }

    let mut settings = match cli.config {
        Some(ref path) => Settings::load_from(path),
        None => Settings::load(),
    };
    if let Some(model) = cli.model {
        settings.llm.model = model;
    }
    if cli.quiet {
        settings.crew.verbose = false;
    }

    // Fail fast: nothing runs without a credential.
    let api_key = settings.require_api_key()?;
    println!("Loaded API key starts with: {}...", key_preview(&api_key));

    let crew = DataScienceCrew::from_settings(&settings)?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<CrewEvent>();

    let run = tokio::spawn({
        let topic = cli.topic.clone();
        async move { crew.analyze_topic_with_events(&topic, Some(event_tx)).await }
    });

    while let Some(event) = event_rx.recv().await {
        if !cli.quiet {
            print_event(&event);
        }
    }

    let result = run.await.inspect_err(|e| tracing::error!("crew task aborted: {e}"))?;
    println!("\nFinal Result: {result}");
    Ok(())
}

/// Crew progress is logged at info; `--quiet` keeps only warnings.
/// `RUST_LOG` overrides either choice.
fn default_log_filter(quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else {
        "info"
    }
}

/// A missing .env is normal; anything else (bad syntax, unreadable) is worth a warning.
fn env_file_problem<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

fn print_event(event: &CrewEvent) {
    match event {
        CrewEvent::TaskStarted { task, agent } => eprintln!("\n[task {task}] {agent} working..."),
        CrewEvent::ToolStart { name, .. } => eprintln!("[tool: {name}]"),
        CrewEvent::ToolResult {
            name,
            success,
            summary,
            ..
        } => {
            let icon = if *success { "ok" } else { "err" };
            eprintln!("[{name}: {icon}] {summary}");
        }
        CrewEvent::TaskCompleted { task, output } => {
            eprintln!("[task {task}] {} finished ({} chars)", output.agent, output.raw.len())
        }
        CrewEvent::Complete { tasks } => eprintln!("\nCrew finished {tasks} tasks"),
        CrewEvent::Error(e) => eprintln!("\nError: {e}"),
    }
}

fn key_preview(key: &str) -> String {
    key.chars().take(env::KEY_PREVIEW_CHARS).collect()
}
