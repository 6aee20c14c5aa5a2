mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use pulse_core::models::EventKind;
use pulse_core::notify::StaticDirectory;
use pulse_core::push::PushChange;
use pulse_core::store::{decode_batch, InMemoryStore};
use pulse_core::{
    Anchor, FeedConfig, FeedEvent, FeedRuntime, FeedStore, JsonDataStore, UserEntry,
};

use render::{render_conversation, render_feed};

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Unified client timeline over exported event batches")]
struct Cli {
    /// Subject (client) identifier the feed belongs to
    #[arg(long, short, default_value = "client")]
    subject: String,

    /// Show only these kinds (comma-separated, e.g. "comment,risk")
    #[arg(long, value_delimiter = ',')]
    filter: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the merged feed
    Show {
        /// JSON file with one batch (array) or several batches (array of arrays)
        events: PathBuf,

        /// Reveal older entries past the initial window
        #[arg(long)]
        all: bool,

        /// Conversation view: grouped by day, oldest first within each day
        #[arg(long)]
        conversation: bool,
    },

    /// Apply live updates from stdin: one JSON push change per line, or
    /// "anchor <url>" to deep-link into the feed
    Watch {
        events: PathBuf,

        /// Acting user id (advisories are suppressed for own comments)
        #[arg(long = "as", default_value = "viewer")]
        viewer: String,
    },

    /// Submit a comment, routing @mentions to notifications
    Comment {
        events: PathBuf,

        /// Comment text
        text: String,

        /// Acting user id (must exist in the directory)
        #[arg(long = "as")]
        author: String,

        /// JSON array of {id, display_name} directory entries
        #[arg(long)]
        directory: PathBuf,

        /// Directory for comments.json / notifications.json
        #[arg(long, default_value = ".pulse")]
        data_dir: PathBuf,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

/// Accepts either a flat array of events or an array of batches.
fn load_batches(path: &PathBuf) -> Result<Vec<Vec<pulse_core::TimelineEvent>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;

    let batches: Vec<Vec<serde_json::Value>> = match value {
        serde_json::Value::Array(items) if items.iter().all(|i| i.is_array()) => items
            .into_iter()
            .map(|batch| batch.as_array().cloned().unwrap_or_default())
            .collect(),
        serde_json::Value::Array(items) => vec![items],
        _ => anyhow::bail!("{} must contain a JSON array", path.display()),
    };

    Ok(batches.iter().map(|b| decode_batch(b)).collect())
}

fn parse_filters(labels: &[String]) -> Result<Vec<EventKind>> {
    labels
        .iter()
        .map(|label| {
            EventKind::from_label(label)
                .with_context(|| format!("unknown event kind filter: {label}"))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let kinds = parse_filters(&cli.filter)?;

    match cli.command {
        Commands::Show {
            events,
            all,
            conversation,
        } => {
            let mut store = FeedStore::new(cli.subject.as_str(), &FeedConfig::default());
            store.load_batches(load_batches(&events)?);
            for kind in kinds {
                store.toggle_filter(kind);
            }
            if all {
                store.reveal_older();
            }
            if conversation {
                println!("{}", render_conversation(&store));
            } else {
                println!("{}", render_feed(&store));
            }
        }

        Commands::Watch { events, viewer } => {
            let persist = Arc::new(InMemoryStore::new());
            let (runtime, handle, mut feed_events) = FeedRuntime::new(
                cli.subject.as_str(),
                UserEntry::new(viewer.clone(), viewer),
                FeedConfig::default(),
                persist.clone(),
                persist,
                Arc::new(StaticDirectory::default()),
            );
            runtime.load_batches(load_batches(&events)?);
            {
                let store = runtime.store();
                let mut store = store.write();
                for kind in kinds {
                    store.toggle_filter(kind);
                }
            }

            let store = runtime.store();
            tokio::spawn(async move {
                while let Some(event) = feed_events.recv().await {
                    match event {
                        FeedEvent::FeedChanged => {
                            println!("{}\n", render_feed(&store.read()));
                        }
                        FeedEvent::ScrollTo { event_id } => {
                            println!(">> scrolling to {event_id}");
                        }
                        FeedEvent::HighlightChanged { target, phase } => {
                            println!(">> highlight {:?} target={:?}", phase, target);
                        }
                        FeedEvent::Advisory(advisory) => {
                            println!(
                                ">> heads up: {} commented \"{}\"",
                                advisory.author_name, advisory.title
                            );
                        }
                    }
                }
            });
            tokio::spawn(runtime.run());

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Some(url) = line.strip_prefix("anchor ") {
                    match Anchor::parse(url.trim()) {
                        Some(anchor) => {
                            let _ = handle.anchor(anchor);
                        }
                        None => eprintln!("not a comment anchor: {url}"),
                    }
                    continue;
                }
                match serde_json::from_str::<PushChange>(line) {
                    Ok(change) => {
                        let _ = handle.push(change);
                    }
                    Err(err) => eprintln!("skipping undecodable change: {err}"),
                }
            }
            // Give in-flight updates a moment to drain before exit.
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        Commands::Comment {
            events,
            text,
            author,
            directory,
            data_dir,
        } => {
            let directory = StaticDirectory::from_json_file(&directory)?;
            let viewer = directory
                .entries()
                .iter()
                .find(|e| e.id == author)
                .cloned()
                .with_context(|| format!("author {author} not in directory"))?;

            let persist = Arc::new(JsonDataStore::new(data_dir)?);
            let (runtime, _handle, _feed_events) = FeedRuntime::new(
                cli.subject.as_str(),
                viewer,
                FeedConfig::default(),
                persist.clone(),
                persist,
                Arc::new(directory),
            );
            runtime.load_batches(load_batches(&events)?);

            let receipt = runtime.composer().submit_comment(&text)?;
            println!("created {}", receipt.comment.id);
            match receipt.dispatch_error {
                Some(err) => println!("routed {} notification(s), dispatch failed: {err}", receipt.routed),
                None => println!("routed {} notification(s)", receipt.routed),
            }
        }
    }

    Ok(())
}
