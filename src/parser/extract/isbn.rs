use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{anchor, element_text};
use crate::error::{Field, ParseError};

static ISBN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span#lblISBN").unwrap());

/// Book ISBN. Same empty-to-absent coercion as the description: an empty
/// label means the episode's book has no ISBN on record.
pub fn extract(doc: &Html) -> Result<Option<String>, ParseError> {
    let text = element_text(anchor(doc, &ISBN_SEL, Field::BookIsbn)?);
    Ok(if text.is_empty() { None } else { Some(text) })
}
