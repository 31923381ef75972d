use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use workdesk_cli::{Agent, Shell};
use workdesk_core::tracing_setup::init_tracing;
use workdesk_core::AgentConfig;

#[derive(Parser)]
#[command(name = "workdesk")]
#[command(about = "Natural-language assistant for files, drafts and mail")]
struct Cli {
    /// Path to JSON config file (dataDir, provider, model, mail, ...)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Classify commands with the built-in rules only
    #[arg(long)]
    offline: bool,

    /// Session id (a fresh one per run by default)
    #[arg(long)]
    session: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the action record an utterance is interpreted as
    Parse {
        /// The utterance, e.g. "send report.pdf to bob@example.com"
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long, short)]
        pretty: bool,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let config = AgentConfig::resolve(cli.config.as_deref())?;
    let agent = Agent::from_config(&config, cli.offline)?;

    match cli.command {
        Some(Commands::Parse { utterance, pretty }) => {
            let action = agent.interpret(&utterance.join(" ")).await;
            let json = action.to_json();
            let out = if pretty { serde_json::to_string_pretty(&json)? } else { serde_json::to_string(&json)? };
            println!("{}", out);
            Ok(())
        }
        None => {
            let session_id = cli.session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            Shell::new(agent, session_id).run().await
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
