pub mod extract;

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::error::ParseError;
use crate::model::Program;
use crate::validate;

pub const ROOT_URL: &str = "https://booknotes.c-span.org";

static PROGRAM_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"booknotes\.c-span\.org/Watch/(\d+-\d+)").unwrap());

/// Derive the program id from the page URL, e.g.
/// "https://booknotes.c-span.org/Watch/57267-1" → "57267-1". A locator that
/// does not match is malformed input, reported distinctly from missing page
/// content.
pub fn program_id_from_url(url: &str) -> Result<String, ParseError> {
    PROGRAM_URL_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| ParseError::MalformedUrl(url.to_string()))
}

/// Compose all field extractors into one validated record for the page.
/// The first field error aborts the whole record; there are no partial or
/// best-effort records.
pub fn parse_program(url: &str, html: &str) -> Result<Program, ParseError> {
    let id = program_id_from_url(url)?;
    let doc = Html::parse_document(html);

    let program = Program {
        id,
        url: url.to_string(),
        title: extract::title::extract(&doc)?,
        guest: extract::guest::extract(&doc)?,
        description: extract::description::extract(&doc)?,
        book_isbn: extract::isbn::extract(&doc)?,
        air_date: extract::air_date::extract(&doc)?,
        transcript: extract::transcript::extract(&doc)?,
        related: extract::related::extract(&doc)?,
    };

    // The player duration label is surfaced in logs only; the record does
    // not carry it.
    if let Ok(duration) = extract::duration::extract(&doc) {
        if validate::validate_duration(&duration).is_ok() {
            debug!("Program {} runs {}", program.id, duration);
        }
    }

    program.validate()?;
    Ok(program)
}

// ── Tests ──
