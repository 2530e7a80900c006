use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::parser::parse_script;
use crate::runtime::ExecutionSupervisor;
use crate::types::SessionStatus;

/// Script run when `quill run` gets neither a file nor `--code`
pub const GREETING_SCRIPT: &str = r#"print("morning"); sleep(1); print("goodnight")"#;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill - run scripts beside a frame loop and overlay their output", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script in a headless frame loop
    Run {
        /// Script file to run
        file: Option<PathBuf>,

        /// Script source given inline
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,

        /// Frames per second of the polling loop
        #[arg(long)]
        fps: Option<u32>,

        /// How long a message stays on screen, in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Parse a script and report syntax errors
    Check {
        /// Script file to check
        file: PathBuf,

        /// Print the parsed AST as JSON
        #[arg(long)]
        ast: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    let (fps, timeout_ms) = match &cli.command {
        Commands::Run {
            fps, timeout_ms, ..
        } => (*fps, *timeout_ms),
        _ => (None, None),
    };

    // Load and validate configuration before any command output
    let config = Config::builder()
        .config_path(cli.config.clone())
        .fps(fps)
        .message_timeout_ms(timeout_ms)
        .build()
        .context("Failed to load configuration")?;

    init_tracing(&config.logging.filter);

    match cli.command {
        Commands::Run { file, code, .. } => {
            let source = resolve_source(file.as_deref(), code)?;
            run_frame_loop(source, &config).await
        }
        Commands::Check { file, ast } => check_script(&file, ast),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Install the stderr `fmt` subscriber; `RUST_LOG` wins over the configured filter
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_source(file: Option<&Path>, code: Option<String>) -> Result<String> {
    match (file, code) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display())),
        (None, Some(code)) => Ok(code),
        (None, None) => Ok(GREETING_SCRIPT.to_string()),
    }
}

/* ===================== Frame Loop ===================== */

/// Forward stdin lines to the frame loop from a plain thread
///
/// A blocking read cannot be cancelled, so it stays off the async runtime.
fn spawn_stdin_reader() -> Result<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("quill-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("Failed to spawn stdin reader")?;
    Ok(rx)
}

/// Stand-in for the game's render loop: poll once per frame, print new
/// messages, and hand stdin lines to open prompts
async fn run_frame_loop(source: String, config: &Config) -> Result<()> {
    let mut supervisor = ExecutionSupervisor::new(config.runtime.clone());
    let session = supervisor.start(source).context("Failed to start session")?;
    let mut answers = spawn_stdin_reader()?;

    let mut ticker = tokio::time::interval(config.frame.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_seq: Option<u64> = None;
    let mut prompt_shown = false;
    let mut stdout = std::io::stdout();

    loop {
        ticker.tick().await;
        let frame = supervisor.poll(Instant::now());

        for message in &frame.messages {
            if last_seq.map_or(true, |seq| message.seq > seq) {
                writeln!(stdout, "{}", message.text)?;
                last_seq = Some(message.seq);
            }
        }

        if frame.waiting_for_input {
            if !prompt_shown {
                write!(stdout, "{} ", frame.prompt.unwrap_or_default())?;
                stdout.flush()?;
                prompt_shown = true;
            }
            match answers.try_recv() {
                Ok(line) => {
                    supervisor.submit_answer(line);
                    prompt_shown = false;
                }
                Err(mpsc::error::TryRecvError::Empty) => {}
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    warn!("stdin closed while a prompt was open");
                    supervisor.shutdown();
                    break;
                }
            }
        }

        if supervisor.is_idle() {
            break;
        }
    }

    match supervisor.session_status(session) {
        Some(SessionStatus::Failed { failure }) => info!(error = %failure, "script failed"),
        Some(status) => info!(status = status.label(), "script finished"),
        None => {}
    }
    Ok(())
}

/* ===================== Check ===================== */

fn check_script(file: &Path, ast: bool) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read script {}", file.display()))?;

    match parse_script(&source) {
        Ok(script) => {
            if ast {
                println!("{}", serde_json::to_string_pretty(&script)?);
            } else {
                println!("{}: ok", file.display());
            }
            Ok(())
        }
        Err(err) => match err.span() {
            Some(span) => bail!(
                "{}:{}:{}: {}",
                file.display(),
                span.start_line + 1,
                span.start_col + 1,
                err.message()
            ),
            None => bail!("{}: {}", file.display(), err.message()),
        },
    }
}
