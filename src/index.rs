//! Author index crawl. The archive lists every program on 26 alphabetical
//! index pages; each table row yields the seed URL for one program page.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::parser::extract::element_text;
use crate::parser::ROOT_URL;
use crate::validate;

const AUTHOR_INDEX_URL: &str = "https://booknotes.c-span.org/AuthorIndex/";

// The archive serves an error page to clients without a browser UA.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr.rowStyl").unwrap());
static AUTHOR_CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.aLinkItem").unwrap());
static AUTHOR_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.aLinkItem a.aLinkItem").unwrap());
static TITLE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.pLinkItem").unwrap());

#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub program_id: String,
    pub url: String,
    pub author_name: String,
    pub program_title: String,
}

/// Fetch all 26 index pages and return the entries found on them.
pub async fn fetch_author_index() -> Result<Vec<IndexEntry>> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    let mut entries = Vec::new();
    for letter in 'A'..='Z' {
        let url = format!("{}{}", AUTHOR_INDEX_URL, letter);
        info!("Fetching author index page: {}", url);
        let html = client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
            .with_context(|| format!("fetching author index page {}", url))?;
        entries.extend(parse_index_page(&html));
    }

    info!("Author index entries found: {}", entries.len());
    Ok(entries)
}

/// Parse one alphabetical index page. Rows that do not carry a well-formed
/// program link are logged and dropped rather than failing the crawl.
pub fn parse_index_page(html: &str) -> Vec<IndexEntry> {
    let doc = Html::parse_document(html);
    doc.select(&ROW_SEL).filter_map(process_index_row).collect()
}

fn process_index_row(row: ElementRef) -> Option<IndexEntry> {
    let path = row
        .select(&AUTHOR_LINK_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))?
        .to_string();

    let program_id = path.rsplit('/').next().unwrap_or_default().to_string();
    if let Err(e) = validate::validate_program_id(&program_id) {
        warn!("Skipping index row with bad program link '{}': {}", path, e);
        return None;
    }

    let url = Url::parse(ROOT_URL).ok()?.join(&path).ok()?.to_string();
    let author_name = row.select(&AUTHOR_CELL_SEL).next().map(element_text)?;
    let program_title = row.select(&TITLE_LINK_SEL).next().map(element_text)?;

    Some(IndexEntry {
        program_id,
        url,
        author_name,
        program_title,
    })
}

// ── Tests ──
