mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use futures::StreamExt;
use komik_config::Config;
use komik_library::models::ListingEntry;
use komik_library::{BatchEvent, Komik};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::process::ExitCode;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// A listing entry as printed, with its update time rendered relative to now.
#[derive(Serialize)]
struct ListingRow<'a> {
    #[serde(flatten)]
    entry: &'a ListingEntry,
    age: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Command::log_level(cli.verbose))))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let komik = Komik::connect(&config).or_raise(|| ErrorKind::Service)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; cancelling");
            interrupt.cancel();
        }
    });

    match cli.command {
        Command::Latest { page } => {
            let url = komik.site().latest_url(page).or_raise(|| ErrorKind::Service)?;
            listing(&komik, url.as_str()).await
        },
        Command::Popular { page } => {
            let url = komik.site().popular_url(page).or_raise(|| ErrorKind::Service)?;
            listing(&komik, url.as_str()).await
        },
        Command::Search { query } => {
            let entries = komik.search_listing(&query).await.or_raise(|| ErrorKind::Service)?;
            print_json(&rows(&entries))
        },
        Command::Detail { link } => print_json(&komik.fetch_detail(&link, false).await.or_raise(|| ErrorKind::Service)?),
        Command::Chapter { link } => {
            print_json(&komik.fetch_chapter_page(&link, false).await.or_raise(|| ErrorKind::Service)?)
        },
        Command::Download { link, output } => {
            let download = komik.build_single_chapter_archive(&link, &cancel).await.or_raise(|| ErrorKind::Service)?;
            for asset in &download.skipped {
                tracing::warn!(index = asset.index, url = %asset.url, reason = %asset.reason, "Image left out");
            }
            let path = output.join(&download.file_name);
            write(&path, &download.bytes).await?;
            println!("{}", path.display());
            Ok(())
        },
        Command::Batch { link, chapters, output, sse } => {
            let selected: HashSet<String> = chapters.into_iter().collect();
            let job = komik.build_batch_archive(&link, &selected).await.or_raise(|| ErrorKind::Service)?;
            tracing::info!(manga = job.manga(), chapters = job.chapters().len(), "Starting batch");
            batch(job.run(cancel), &output, sse).await
        },
    }
}

async fn listing(komik: &Komik, url: &str) -> Result<()> {
    let listing = komik.fetch_listing(url, false).await.or_raise(|| ErrorKind::Service)?;
    if let Some(next) = &listing.next_page {
        tracing::info!(next = %next, "More results available");
    }
    print_json(&rows(&listing.entries))
}

fn rows(entries: &[ListingEntry]) -> Vec<ListingRow<'_>> {
    let now = OffsetDateTime::now_utc();
    entries
        .iter()
        .map(|entry| ListingRow {
            entry,
            age: entry.age(now).map(|age| age.to_string()),
        })
        .collect()
}

/// Prints every event as it arrives, then writes the archive on completion.
async fn batch(events: impl futures::Stream<Item = BatchEvent>, output: &Path, sse: bool) -> Result<()> {
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        if sse {
            print!("{}", event.to_sse().or_raise(|| ErrorKind::Encode)?);
        } else {
            println!("{}", event.to_json().or_raise(|| ErrorKind::Encode)?);
        }
        match event {
            BatchEvent::Complete { file_name, archive, .. } => {
                let path = output.join(&file_name);
                write(&path, &archive).await?;
                tracing::info!(path = %path.display(), "Batch archive written");
            },
            BatchEvent::Error { .. } => exn::bail!(ErrorKind::Service),
            BatchEvent::Progress { .. } => {},
        }
    }
    Ok(())
}

async fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes).await.or_raise(|| ErrorKind::Write(path.to_path_buf()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).or_raise(|| ErrorKind::Encode)?);
    Ok(())
}
