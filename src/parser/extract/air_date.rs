use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{anchor, element_text};
use crate::error::{Field, ParseError};

static AIR_DATE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span#lblAirDate").unwrap());

/// Original air date, as displayed ("Month DD, YYYY"). Validation of the
/// format happens at record construction, not here.
pub fn extract(doc: &Html) -> Result<String, ParseError> {
    Ok(element_text(anchor(doc, &AIR_DATE_SEL, Field::AirDate)?))
}
