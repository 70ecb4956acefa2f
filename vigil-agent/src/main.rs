use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vigil_core::commands::{Commands, ensure_initialized, vigil_root};
use vigil_core::records::Urgency;
use vigil_core::services::{BriefingMode, HttpReasoner};

#[derive(Parser, Debug)]
#[command(
    name = "vigil-agent",
    about = "Feed briefings and the idea-to-proposal pipeline for an agent workspace"
)]
struct Cli {
    /// Workspace root (defaults to $VIGIL_ROOT, then ./.vigil)
    #[arg(long)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the workspace tree, config and logbook (idempotent)
    Init,
    /// Run one match-and-synthesize pipeline pass
    Run,
    /// Compose the session briefing from all feeds
    Briefing {
        /// Top entries only (half the usual entry counts)
        #[arg(long)]
        short: bool,
    },
    /// Ranked market signals
    Signals {
        #[arg(long, default_value_t = 3)]
        days: i64,
        #[arg(long, default_value_t = 15)]
        limit: usize,
    },
    /// Ranked agent ideas
    Ideas {
        #[arg(long, default_value_t = 7)]
        days: i64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Project signals, optionally filtered by urgency (now | week | month)
    Project {
        #[arg(long, default_value_t = 7)]
        days: i64,
        #[arg(long)]
        urgency: Option<String>,
    },
    /// Latest weekly digest of a feed
    Digest {
        #[arg(default_value = "project-intel")]
        feed: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let root = cli.root.unwrap_or_else(vigil_root);

    match cli.command {
        Command::Init => {
            let report = ensure_initialized(&root)?;
            println!("Workspace root: {}", report.root.display());
            for c in &report.created {
                println!("  created: {c}");
            }
            if report.created.is_empty() {
                println!("  already initialized.");
            }
        }
        Command::Run => {
            let commands = Commands::open(root)?;
            let reasoner = HttpReasoner::from_config(&commands.config().reasoner);
            let report = commands.run_pipeline(&reasoner)?;
            if report.written > 0 {
                println!(
                    "✅ {} proposals written ({} ideas examined since {})",
                    report.written,
                    report.examined,
                    report.since.format("%Y-%m-%d %H:%M")
                );
            } else if report.examined == 0 {
                println!("No new ideas since the last run — skipping.");
            } else {
                println!("No matches among {} new ideas.", report.examined);
            }
        }
        Command::Briefing { short } => {
            let commands = Commands::open(root)?;
            let mode = if short {
                BriefingMode::Short
            } else {
                BriefingMode::Full
            };
            println!("{}", commands.briefing(mode));
        }
        Command::Signals { days, limit } => {
            let commands = Commands::open(root)?;
            println!("{}", commands.market_signals(days, limit));
        }
        Command::Ideas { days, limit } => {
            let commands = Commands::open(root)?;
            println!("{}", commands.idea_report(days, limit));
        }
        Command::Project { days, urgency } => {
            let commands = Commands::open(root)?;
            let filter = urgency.as_deref().and_then(Urgency::parse);
            println!("{}", commands.project_signals(days, filter));
        }
        Command::Digest { feed } => {
            let commands = Commands::open(root)?;
            println!("{}", commands.weekly_digest(&feed));
        }
    }
    Ok(())
}
