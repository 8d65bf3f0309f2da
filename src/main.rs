//! multi-translate - translate text into every configured language at once
//!
//! Usage:
//!   multi-translate hello world          # Translate the arguments once
//!   multi-translate "bonjour>fr"         # Pin the source language with >xx, :xx or /xx
//!   echo "hola" | multi-translate        # With GET_SYSTEM_SELECTION=true, piped text is the selection
//!   multi-translate                      # Interactive: one query per line, debounced
//!   multi-translate --json hello         # Print results as JSON
//!
//! Configuration is read from the environment (and `.env`), see `Config::from_env`.

use anyhow::{Context, Result};
use multi_translate::config::Config;
use multi_translate::debounce::Debouncer;
use multi_translate::i18n::format_language_pair;
use multi_translate::session::{Session, View};
use std::io::{IsTerminal, Read};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging on stderr so stdout stays clean for results
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("multi_translate=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let text = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    let config = Config::from_env()?;
    let client = reqwest::Client::builder()
        .user_agent(concat!("multi-translate/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let session = Session::from_config(client, &config).context("Could not set up translator")?;
    info!(
        "Translating into {}",
        session
            .targets()
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let stdin_is_piped = !std::io::stdin().is_terminal();

    if !text.trim().is_empty() {
        return run_once(session, &text, json).await;
    }

    if config.use_system_selection && stdin_is_piped {
        let mut selection = String::new();
        std::io::stdin()
            .read_to_string(&mut selection)
            .context("Failed to read selection from stdin")?;
        let session = session.with_selection(Some(selection));
        return run_once(session, "", json).await;
    }

    run_interactive(session, json).await
}

/// Translate a single input right away.
async fn run_once(session: Session, input: &str, json: bool) -> Result<()> {
    let session = session.with_debouncer(Debouncer::new(Duration::ZERO));

    match session.submit(input).await {
        Ok(Some(view)) => print_view(&view, json),
        Ok(None) => Ok(()),
        Err(e) => {
            error!("Could not translate: {}", e.title());
            Err(e).context("Could not translate")
        }
    }
}

/// One query per stdin line. Lines arriving faster than the debounce delay
/// are coalesced and stale results are not printed.
async fn run_interactive(session: Session, json: bool) -> Result<()> {
    let session = Arc::new(session);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = JoinSet::new();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let session = session.clone();
        pending.spawn(async move {
            match session.submit(&line).await {
                Ok(Some(view)) => {
                    if let Err(e) = print_view(&view, json) {
                        error!("Failed to print results: {:#}", e);
                    }
                }
                Ok(None) => {}
                Err(e) => error!("{}: {}", e.title(), e),
            }
        });

        // Reap finished submissions so the set only holds pending ones
        while pending.try_join_next().is_some() {}
    }

    while pending.join_next().await.is_some() {}
    Ok(())
}

fn print_view(view: &View, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(view).context("Failed to serialize results")?);
        return Ok(());
    }

    if let Some(suggestion) = &view.suggestion {
        println!("Did you mean: {}", suggestion.corrected);
        if let Some(path) = &suggestion.diff_path {
            println!("Diff: {}", path.display());
        }
    }

    for result in &view.results {
        println!("{}\t[{}]", result.translated, view.accessory(result));
        info!(
            "{} | {} | {}",
            format_language_pair(result.from, result.to),
            result.google_translate_url(),
            result.google_search_url()
        );
    }

    Ok(())
}
