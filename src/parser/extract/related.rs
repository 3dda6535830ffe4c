use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{anchor, element_text};
use crate::error::{Field, ParseError};
use crate::model::RelatedProgram;
use crate::parser::ROOT_URL;

static SECTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#RelateProgram").unwrap());
static ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.RPItem").unwrap());
static AUTHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.AuthorNameSmall").unwrap());
static AUTHOR_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.AuthorNameSmall a").unwrap());
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.BookTitleSmall").unwrap());

/// Related program recommendations. Each fixed-structure item carries a
/// denormalized copy of the referenced program's id, url, author and title;
/// no live lookup of the target page happens here.
pub fn extract(doc: &Html) -> Result<Vec<RelatedProgram>, ParseError> {
    let section = anchor(doc, &SECTION_SEL, Field::RelatedPrograms)?;
    section.select(&ITEM_SEL).map(process_item).collect()
}

fn process_item(item: ElementRef) -> Result<RelatedProgram, ParseError> {
    let link = item
        .select(&AUTHOR_LINK_SEL)
        .next()
        .ok_or(ParseError::NotFound(Field::RelatedPrograms))?;
    let path = link
        .value()
        .attr("href")
        .ok_or(ParseError::NotFound(Field::RelatedPrograms))?;

    // "/Watch/57267-1" → id "57267-1", url joined against the site root.
    let id = path.rsplit('/').next().unwrap_or_default().to_string();
    let url = Url::parse(ROOT_URL)
        .and_then(|base| base.join(path))
        .map_err(|e| {
            ParseError::invalid(Field::RelatedPrograms, format!("bad item href '{}': {}", path, e))
        })?
        .to_string();

    let author = item
        .select(&AUTHOR_SEL)
        .next()
        .map(element_text)
        .ok_or(ParseError::NotFound(Field::RelatedPrograms))?;
    let title = item
        .select(&TITLE_SEL)
        .next()
        .map(element_text)
        .ok_or(ParseError::NotFound(Field::RelatedPrograms))?;

    Ok(RelatedProgram { id, url, author, title })
}
