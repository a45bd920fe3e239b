mod commands;
mod render;
mod utils;

use anyhow::Result;
use calnote_core::{CalNoteConfig, Priority};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "calnote")]
#[command(about = "Keep events and notes locally and mirror events to your calendar")]
struct Cli {
    /// Enable verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to Google Calendar
    Auth,
    /// Create an event (or a note with --note)
    New {
        title: String,

        /// Start date or date/time (e.g. "2025-03-20" or "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End date or date/time; defaults to the same day or one hour later
        #[arg(short, long, conflicts_with = "note")]
        end: Option<String>,

        /// Create a local-only note instead of an event
        #[arg(long)]
        note: bool,

        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short, long)]
        content: Option<String>,
    },
    /// Change an existing event or note
    Edit {
        /// Item id (or a unique prefix of it)
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short, long, conflicts_with = "clear_content")]
        content: Option<String>,

        /// Remove the item's content
        #[arg(long)]
        clear_content: bool,
    },
    /// Delete an event or note
    Delete {
        /// Item id (or a unique prefix of it)
        id: String,
    },
    /// Show events and notes
    List {
        /// Show items from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Show items until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Push pending events and import events created elsewhere
    Sync {
        /// Sync events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Sync events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show configuration, sign-in and sync state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into()),
        1 => tracing_subscriber::EnvFilter::new("calnote_core=debug,calnote_provider_google=debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CalNoteConfig::load()?;
    tracing::debug!(data_dir = %config.data_path().display(), "loaded config");

    match cli.command {
        Commands::Auth => commands::auth::run(config).await,
        Commands::New {
            title,
            start,
            end,
            note,
            priority,
            content,
        } => {
            let args = commands::new::NewArgs {
                title,
                start,
                end,
                note,
                priority,
                content,
            };
            commands::new::run(&config, args).await
        }
        Commands::Edit {
            id,
            title,
            start,
            end,
            priority,
            content,
            clear_content,
        } => {
            let args = commands::edit::EditArgs {
                title,
                start,
                end,
                priority,
                content,
                clear_content,
            };
            commands::edit::run(&config, &id, args).await
        }
        Commands::Delete { id } => commands::delete::run(&config, &id).await,
        Commands::List { from, to } => {
            commands::list::run(&config, from.as_deref(), to.as_deref()).await
        }
        Commands::Sync { from, to } => {
            commands::sync::run(&config, from.as_deref(), to.as_deref()).await
        }
        Commands::Status => commands::status::run(&config).await,
    }
}
