//! Typed record definitions and their structural invariants. A `Program` is
//! built once per page, validated at construction, never mutated, and
//! consumed exactly once by the flattening stage.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Field, ParseError};
use crate::validate;

static ISBN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9Xx-]{9,17}$").unwrap());

/// Who is speaking in a transcript turn. Booknotes is a two-person show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    Host,
    Guest,
}

impl SpeakerRole {
    /// Map a transcript div's class name to a role.
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "host" => Some(SpeakerRole::Host),
            "guest" => Some(SpeakerRole::Guest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpeakerRole::Host => "host",
            SpeakerRole::Guest => "guest",
        }
    }
}

impl fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single turn in the conversation transcript. `index` is 1-based and
/// assigned at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub index: u32,
    pub speaker_role: SpeakerRole,
    pub speaker_name: String,
    pub text: String,
}

/// A lightweight cross-reference to another program, copied inline from the
/// referencing page. Not a full record; no back-reference is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedProgram {
    pub id: String,
    pub url: String,
    pub author: String,
    pub title: String,
}

/// The fully parsed, validated representation of one program page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub url: String,
    pub title: String,
    pub guest: String,
    pub description: Option<String>,
    pub book_isbn: Option<String>,
    pub air_date: String,
    pub transcript: Vec<TranscriptEntry>,
    pub related: Vec<RelatedProgram>,
}

impl Program {
    /// Check every field invariant. Called once at construction by the
    /// parser, and again whenever a record is read back from a JSON
    /// artifact, so downstream consumers never see garbage.
    pub fn validate(&self) -> Result<(), ParseError> {
        validate::validate_program_id(&self.id)?;
        check_len(Field::Url, &self.url, 5, 250)?;
        check_len(Field::Title, &self.title, 5, 250)?;
        check_len(Field::Guest, &self.guest, 5, 250)?;

        if let Some(desc) = &self.description {
            if desc.chars().count() < 25 {
                return Err(ParseError::invalid(
                    Field::Description,
                    "description shorter than 25 characters should have been absent",
                ));
            }
        }

        if let Some(isbn) = &self.book_isbn {
            if !ISBN_RE.is_match(isbn) {
                return Err(ParseError::invalid(
                    Field::BookIsbn,
                    format!("'{}' is not an ISBN-10/13 (9-17 chars, optional hyphens)", isbn),
                ));
            }
        }

        validate::validate_air_date(&self.air_date)?;

        // Extraction-time turn numbering is 1-based and contiguous.
        for (i, entry) in self.transcript.iter().enumerate() {
            let expected = (i + 1) as u32;
            if entry.index != expected {
                return Err(ParseError::invalid(
                    Field::Transcript,
                    format!("turn {} has index {}, expected {}", i, entry.index, expected),
                ));
            }
        }

        for item in &self.related {
            validate::validate_program_id(&item.id)?;
            check_len(Field::RelatedPrograms, &item.url, 5, 250)?;
            check_len(Field::RelatedPrograms, &item.author, 5, 250)?;
            check_len(Field::RelatedPrograms, &item.title, 5, 250)?;
        }

        Ok(())
    }
}

fn check_len(field: Field, value: &str, min: usize, max: usize) -> Result<(), ParseError> {
    let n = value.chars().count();
    if n < min || n > max {
        Err(ParseError::invalid(
            field,
            format!("length {} outside [{}, {}]: '{}'", n, min, max, value),
        ))
    } else {
        Ok(())
    }
}

// ── Tests ──
