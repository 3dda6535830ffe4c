use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{anchor, element_text};
use crate::error::{Field, ParseError};

static GUEST_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div#AuthorName").unwrap());

/// Guest author name.
pub fn extract(doc: &Html) -> Result<String, ParseError> {
    Ok(element_text(anchor(doc, &GUEST_SEL, Field::Guest)?))
}
