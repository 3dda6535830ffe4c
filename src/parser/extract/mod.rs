pub mod air_date;
pub mod description;
pub mod duration;
pub mod guest;
pub mod isbn;
pub mod related;
pub mod title;
pub mod transcript;

use scraper::{ElementRef, Html, Selector};

use crate::error::{Field, ParseError};

/// Collapse internal whitespace and newlines to single spaces, trim edges.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All text under an element, whitespace-collapsed.
pub fn element_text(el: ElementRef) -> String {
    collapse_ws(&el.text().collect::<Vec<_>>().join(" "))
}

/// Locate a field's single well-known anchor node. Absence of the anchor is
/// the sole failure condition; there are no fallback search strategies.
pub fn anchor<'a>(
    doc: &'a Html,
    selector: &Selector,
    field: Field,
) -> Result<ElementRef<'a>, ParseError> {
    doc.select(selector).next().ok_or(ParseError::NotFound(field))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpeakerRole;

    fn parse(fixture: &str) -> Html {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        Html::parse_document(&html)
    }

    #[test]
    fn rhodes_scalar_fields() {
        let doc = parse("rhodes");
        assert_eq!(title::extract(&doc).unwrap(), "Choosing the Right Stuff");
        assert_eq!(guest::extract(&doc).unwrap(), "RICHARD RHODES");
        assert_eq!(air_date::extract(&doc).unwrap(), "June 5, 1994");
    }

    #[test]
    fn rhodes_empty_isbn_is_absent_not_error() {
        let doc = parse("rhodes");
        assert_eq!(isbn::extract(&doc).unwrap(), None);
    }

    #[test]
    fn ambrose_full_page() {
        let doc = parse("ambrose");
        assert_eq!(title::extract(&doc).unwrap(), "Undaunted Courage");
        assert_eq!(guest::extract(&doc).unwrap(), "STEPHEN AMBROSE");
        assert_eq!(isbn::extract(&doc).unwrap().as_deref(), Some("0-684-81107-3"));
        let desc = description::extract(&doc).unwrap().unwrap();
        assert!(desc.starts_with("Mr. Ambrose discussed"));
        // Newlines in the source markup collapse to single spaces.
        assert!(!desc.contains('\n'));
    }

    #[test]
    fn missing_description_anchor_is_not_found() {
        let doc = Html::parse_document("<html><body><div id='other'>x</div></body></html>");
        match description::extract(&doc) {
            Err(ParseError::NotFound(Field::Description)) => {}
            other => panic!("expected NotFound(Description), got {:?}", other),
        }
    }

    #[test]
    fn present_but_empty_description_is_none() {
        let doc =
            Html::parse_document("<html><body><div id='progContent'>  \n </div></body></html>");
        assert_eq!(description::extract(&doc).unwrap(), None);
    }

    #[test]
    fn transcript_turns_skip_non_conversational_siblings() {
        let doc = parse("ambrose");
        let turns = transcript::extract(&doc).unwrap();
        // Fixture interleaves an advert div between host and guest turns;
        // it must not consume an index.
        assert_eq!(turns.len(), 3);
        let indices: Vec<u32> = turns.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(turns[0].speaker_role, SpeakerRole::Host);
        assert_eq!(turns[0].speaker_name, "LAMB");
        assert_eq!(turns[1].speaker_role, SpeakerRole::Guest);
        assert_eq!(turns[1].speaker_name, "AMBROSE");
    }

    #[test]
    fn transcript_text_excludes_speaker_span() {
        let doc = parse("ambrose");
        let turns = transcript::extract(&doc).unwrap();
        assert_eq!(turns[0].text, "Stephen Ambrose, why Lewis and Clark?");
        assert!(!turns[0].text.contains("LAMB"));
    }

    #[test]
    fn missing_transcript_container_is_not_found() {
        let doc = Html::parse_document("<html><body><div id='transContent'></div></body></html>");
        match transcript::extract(&doc) {
            Err(ParseError::NotFound(Field::Transcript)) => {}
            other => panic!("expected NotFound(Transcript), got {:?}", other),
        }
    }

    #[test]
    fn related_items_join_against_site_root() {
        let doc = parse("ambrose");
        let related = related::extract(&doc).unwrap();
        assert_eq!(related.len(), 2);
        assert_eq!(related[0].id, "57267-1");
        assert_eq!(related[0].url, "https://booknotes.c-span.org/Watch/57267-1");
        assert_eq!(related[0].author, "RICHARD RHODES");
        assert_eq!(related[0].title, "The Making of the Atomic Bomb");
    }

    #[test]
    fn empty_related_section_is_empty_list() {
        let doc =
            Html::parse_document("<html><body><div id='RelateProgram'></div></body></html>");
        assert_eq!(related::extract(&doc).unwrap(), vec![]);
    }

    #[test]
    fn duration_anchor() {
        let doc = parse("ambrose");
        assert_eq!(duration::extract(&doc).unwrap(), "58:12");

        let empty = Html::parse_document("<html><body></body></html>");
        assert!(matches!(
            duration::extract(&empty),
            Err(ParseError::NotFound(Field::Duration))
        ));
    }

    #[test]
    fn collapse_ws_folds_runs_and_trims() {
        assert_eq!(collapse_ws("  a \n\n b\t c  "), "a b c");
        assert_eq!(collapse_ws("\n \t "), "");
    }
}
