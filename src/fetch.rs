//! Page fan-out: fetch, cache, parse, and persist each queued program page
//! as an independent task. No retries and no cross-task coordination; a
//! failed page is recorded and its siblings proceed.

use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::db::QueuedPage;
use crate::index::USER_AGENT;
use crate::parser;
use crate::store::Store;

const CONCURRENCY: usize = 8;

/// Per-run scrape stats returned after completion.
pub struct ScrapeStats {
    pub total: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// What happened to one page.
pub enum PageStatus {
    /// Parsed and written as a fresh JSON artifact.
    Parsed,
    /// Artifact already on disk; no fetch, no write.
    Skipped,
    Failed(String),
}

pub struct PageOutcome {
    pub page_id: i64,
    pub status: PageStatus,
}

/// Scrape pages concurrently, recording each outcome in the queue as it
/// arrives. Results stream over a channel so the sqlite connection stays on
/// this task.
pub async fn scrape_pages_streaming(
    conn: &Connection,
    store: &Store,
    pages: Vec<QueuedPage>,
) -> Result<ScrapeStats> {
    let client = Arc::new(
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?,
    );
    let semaphore = Arc::new(Semaphore::new(CONCURRENCY));
    let total = pages.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let (tx, mut rx) = tokio::sync::mpsc::channel::<PageOutcome>(CONCURRENCY * 2);

    for page in pages {
        let client = Arc::clone(&client);
        let sem = Arc::clone(&semaphore);
        let store = store.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            let page_id = page.page_id;
            let status = match scrape_one(&client, &store, &page).await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Task failed for {}: {:#}", page.program_id, e);
                    PageStatus::Failed(format!("{:#}", e))
                }
            };
            let _ = tx.send(PageOutcome { page_id, status }).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut parsed = 0usize;
    let mut skipped = 0usize;
    let mut errors = 0usize;

    let mut mark_stmt = conn.prepare(
        "UPDATE pages SET visited = 1, visited_at = datetime('now'), last_error = ?2
         WHERE id = ?1",
    )?;

    while let Some(outcome) = rx.recv().await {
        let error = match &outcome.status {
            PageStatus::Parsed => {
                parsed += 1;
                None
            }
            PageStatus::Skipped => {
                skipped += 1;
                None
            }
            PageStatus::Failed(e) => {
                errors += 1;
                Some(e.as_str())
            }
        };
        mark_stmt.execute(rusqlite::params![outcome.page_id, error])?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Scraped {} pages ({} parsed, {} skipped, {} errors)",
        total, parsed, skipped, errors
    );

    Ok(ScrapeStats { total, parsed, skipped, errors })
}

/// Handle one page end to end. An existing JSON artifact short-circuits the
/// whole page: no fetch, no write, artifact untouched. A cached HTML blob
/// is never refetched, so parse failures can be retried without network
/// cost.
async fn scrape_one(
    client: &reqwest::Client,
    store: &Store,
    page: &QueuedPage,
) -> Result<PageStatus> {
    let program_id = parser::program_id_from_url(&page.url)?;

    if store.program_exists(&program_id) {
        return Ok(PageStatus::Skipped);
    }

    let html = match store.load_html(&program_id)? {
        Some(html) => html,
        None => {
            let html = fetch_page(client, &page.url).await?;
            store.save_html(&program_id, &html)?;
            html
        }
    };

    let program = parser::parse_program(&page.url, &html)?;
    store.save_program(&program)?;
    Ok(PageStatus::Parsed)
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("fetching {}", url))?
        .error_for_status()
        .with_context(|| format!("fetching {}", url))?
        .text()
        .await
        .with_context(|| format!("reading body of {}", url))
}

// ── Tests ──
