//! Carelink line-oriented driver.
//!
//! Usage:
//!   carelink
//!   carelink --config carelink.toml
//!   carelink --keyword --no-delay
//!
//! Reads one request per line from stdin and prints what the turn produced.
//!
//! # Commands
//!
//! - `/log` - print the whole conversation
//! - `/status` - print the current turn status
//! - `/quit` - exit
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - log filter (logs go to stderr)
//! - `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` - used by the LLM resolver when
//!   the config file holds no key

use carelink_common::{ConversationEntry, EntryBody, Speaker};
use carelink_coordinator::{Coordinator, CoordinatorConfig, ResolverKind};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,carelink_coordinator=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut force_keyword = false;
    let mut no_delay = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    anyhow::bail!("--config needs a file path");
                }
            }
            "--keyword" | "-k" => force_keyword = true,
            "--no-delay" => no_delay = true,
            "--help" | "-h" => {
                println!("Carelink hospital desk coordinator");
                println!();
                println!("Usage: carelink [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>  Load configuration from a TOML file");
                println!("  -k, --keyword        Use the offline keyword resolver");
                println!("      --no-delay       Skip the simulated sub-agent delay");
                println!("  -h, --help           Show this help message");
                println!();
                println!("Commands: /log, /status, /quit");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            info!(path = %path, "Loading configuration");
            CoordinatorConfig::from_file(&path)?
        }
        None => CoordinatorConfig::default(),
    };
    if force_keyword {
        config.resolver.kind = ResolverKind::Keyword;
    }
    if no_delay {
        config.handler_delay_ms = 0;
    }

    let coordinator = Coordinator::from_config(config);
    for entry in coordinator.conversation() {
        print_entry(&entry);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/log" => {
                for entry in coordinator.conversation() {
                    print_entry(&entry);
                }
            }
            "/status" => {
                let status = coordinator.status();
                println!(
                    "in_progress={} active_handler={} phase={:?} note={:?}",
                    status.in_progress,
                    status.active_handler.as_deref().unwrap_or("-"),
                    coordinator.phase(),
                    status.note
                );
            }
            text => match coordinator.submit_user_input(text).await {
                Ok(outcome) => {
                    for entry in outcome.entries.iter().filter(|e| e.speaker != Speaker::User) {
                        print_entry(entry);
                    }
                }
                Err(e) => println!("[Coordinator] {e}"),
            },
        }
    }

    info!(entries = coordinator.conversation_len(), "Session ended");
    Ok(())
}

fn print_entry(entry: &ConversationEntry) {
    match (&entry.speaker, &entry.body) {
        (Speaker::User, body) => println!("[You] {}", body.as_text().unwrap_or_default()),
        (Speaker::Coordinator, body) => {
            println!("[Coordinator] {}", body.as_text().unwrap_or_default())
        }
        (Speaker::Handler, EntryBody::Report(report)) => {
            let name = entry.produced_by.as_deref().unwrap_or("Unknown sub-agent");
            println!("[{name}] {}", report.outcome);
            println!("{}", report.message);
        }
        (Speaker::Handler, EntryBody::Text(text)) => println!("[Handler] {text}"),
    }
}
