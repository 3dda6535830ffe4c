use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{anchor, element_text};
use crate::error::{Field, ParseError};

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#pnlProgramTitle").unwrap());

/// Program title from the title panel div.
pub fn extract(doc: &Html) -> Result<String, ParseError> {
    Ok(element_text(anchor(doc, &TITLE_SEL, Field::Title)?))
}
