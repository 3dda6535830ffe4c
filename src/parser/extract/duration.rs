use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{anchor, element_text};
use crate::error::{Field, ParseError};

static DURATION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.jw-video-duration").unwrap());

/// Video player duration label. Extracted from the page but not carried on
/// the assembled record; kept for callers that want it on its own.
pub fn extract(doc: &Html) -> Result<String, ParseError> {
    Ok(element_text(anchor(doc, &DURATION_SEL, Field::Duration)?))
}
