use std::fmt;

use thiserror::Error;

/// Fields a program page is parsed into. One tag per extractor so a failed
/// page reports exactly which anchor was missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ProgramId,
    Url,
    Title,
    Description,
    Guest,
    BookIsbn,
    AirDate,
    Duration,
    Transcript,
    RelatedPrograms,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::ProgramId => "program id",
            Field::Url => "url",
            Field::Title => "title",
            Field::Description => "description",
            Field::Guest => "guest author",
            Field::BookIsbn => "book ISBN",
            Field::AirDate => "air date",
            Field::Duration => "duration",
            Field::Transcript => "transcript",
            Field::RelatedPrograms => "related programs",
        };
        f.write_str(name)
    }
}

/// Page-local parse failures. Every variant aborts that page's record and
/// never the whole run.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The anchor node for a field is absent from the page.
    #[error("{0} anchor not found in page")]
    NotFound(Field),

    /// The field was found but fails format/range rules.
    #[error("invalid {field}: {message}")]
    Invalid { field: Field, message: String },

    /// The source locator itself is not a program URL. Distinct from
    /// NotFound: raised before any extraction is attempted.
    #[error("URL is not a program page: {0}")]
    MalformedUrl(String),
}

impl ParseError {
    pub fn invalid(field: Field, message: impl Into<String>) -> Self {
        ParseError::Invalid {
            field,
            message: message.into(),
        }
    }
}

// ── Tests ──
