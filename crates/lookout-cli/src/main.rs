mod cmd_config;
mod cmd_inspect;
mod cmd_replay;
mod cmd_select;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lookout",
    version,
    about = "Find the deliverable in an agent's tool-invocation stream"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify and score every invocation in a JSONL stream
    Inspect {
        /// JSONL file, one invocation per line
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Skip malformed lines instead of failing
        #[arg(long)]
        lenient: bool,
    },
    /// Print the raw index of the main deliverable (-1 when none)
    Select {
        /// JSONL file, one invocation per line
        file: PathBuf,
        /// Include the winning score breakdown as JSON
        #[arg(long)]
        json: bool,
        /// Skip malformed lines instead of failing
        #[arg(long)]
        lenient: bool,
    },
    /// Replay a stream invocation by invocation and show the live cursor
    Replay {
        /// JSONL file, one invocation per line
        file: PathBuf,
        /// Step through the finished stream afterwards, skipping technical steps
        #[arg(long)]
        skip_technical: bool,
        /// Output one JSON object per refresh
        #[arg(long)]
        json: bool,
        /// Skip malformed lines instead of failing
        #[arg(long)]
        lenient: bool,
    },
    /// Show detection configuration
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

/// Logs go to stderr so JSON output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOOKOUT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config = lookout_core::DetectionConfig::discover(&cwd);

    match cli.cmd {
        Command::Inspect {
            file,
            json,
            lenient,
        } => cmd_inspect::execute(&file, &config, json, lenient),
        Command::Select {
            file,
            json,
            lenient,
        } => cmd_select::execute(&file, &config, json, lenient),
        Command::Replay {
            file,
            skip_technical,
            json,
            lenient,
        } => cmd_replay::execute(&cmd_replay::ReplayParams {
            file: &file,
            config: &config,
            skip_technical,
            json,
            lenient,
        }),
        Command::Config { cmd } => cmd_config::run(cmd, &cwd, &config),
    }
}

/// Shared loader for the stream-reading subcommands.
pub(crate) fn load_stream(
    file: &std::path::Path,
    lenient: bool,
) -> anyhow::Result<Vec<lookout_core::ToolInvocation>> {
    let mode = if lenient {
        lookout_core::stream::LoadMode::SkipInvalid
    } else {
        lookout_core::stream::LoadMode::Strict
    };
    Ok(lookout_core::stream::load_invocations(file, mode)?)
}
