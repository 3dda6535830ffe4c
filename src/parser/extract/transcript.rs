use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{anchor, collapse_ws, element_text};
use crate::error::{Field, ParseError};
use crate::model::{SpeakerRole, TranscriptEntry};

static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#transContent div#ransContPadding").unwrap());
static SPEAKER_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

/// Conversation transcript. Only child divs classed `host` or `guest` yield
/// turns; other siblings (adverts, separators) are skipped and do not
/// consume index values. Indices are 1-based over surviving turns.
pub fn extract(doc: &Html) -> Result<Vec<TranscriptEntry>, ParseError> {
    let container = anchor(doc, &CONTAINER_SEL, Field::Transcript)?;

    let mut turns = Vec::new();
    for el in container.child_elements() {
        if el.value().name() != "div" {
            continue;
        }
        let Some(role) = el.value().classes().find_map(SpeakerRole::from_class) else {
            continue;
        };

        let speaker_name = el
            .select(&SPEAKER_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();

        turns.push(TranscriptEntry {
            index: (turns.len() + 1) as u32,
            speaker_role: role,
            speaker_name,
            text: direct_text(el),
        });
    }

    Ok(turns)
}

/// Text from the element's direct text children only, so the speaker-name
/// span nested inside the turn div is excluded.
fn direct_text(el: ElementRef) -> String {
    let pieces: Vec<&str> = el
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|t| &*t.text)
        .collect();
    collapse_ws(&pieces.join(" "))
}
