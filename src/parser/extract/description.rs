use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{anchor, element_text};
use crate::error::{Field, ParseError};

static DESCRIPTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#progContent").unwrap());

/// Program description. The anchor being present but collapsing to empty
/// text means the program has no description, which is not an error.
pub fn extract(doc: &Html) -> Result<Option<String>, ParseError> {
    let text = element_text(anchor(doc, &DESCRIPTION_SEL, Field::Description)?);
    Ok(if text.is_empty() { None } else { Some(text) })
}
