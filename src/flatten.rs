//! Flattening stage: one validated record becomes one program row, N
//! transcript rows, and M related-item rows, all keyed by the program id.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{self, ProgramRow, RelatedItemRow, TranscriptRow};
use crate::model::Program;
use crate::store::Store;

pub struct FlattenCounts {
    pub programs: usize,
    pub transcripts: usize,
    pub related: usize,
    pub errors: usize,
}

impl FlattenCounts {
    pub fn print(&self) {
        println!(
            "Saved {} programs, {} transcript entries, {} related items ({} files failed).",
            self.programs, self.transcripts, self.related, self.errors
        );
    }
}

/// Flatten one record into its three row sets. The air date moves from its
/// display string to a calendar value here; a parse failure is fatal for
/// this record and never silently defaulted.
pub fn flatten_program(
    program: &Program,
) -> Result<(ProgramRow, Vec<TranscriptRow>, Vec<RelatedItemRow>)> {
    let air_date = parse_air_date(&program.air_date)
        .with_context(|| format!("air date of program {}", program.id))?;

    let program_row = ProgramRow {
        program_id: program.id.clone(),
        guest: program.guest.clone(),
        title: program.title.clone(),
        description: program.description.clone(),
        air_date,
        book_isbn: program.book_isbn.clone(),
        url: program.url.clone(),
    };

    // Flattening reindexes turns from 0, independent of the 1-based index
    // assigned at extraction. Both numbering schemes are kept.
    let transcript_rows = program
        .transcript
        .iter()
        .enumerate()
        .map(|(i, entry)| TranscriptRow {
            program_id: program.id.clone(),
            sequence: i as i64,
            speaker_role: entry.speaker_role.as_str(),
            speaker_name: entry.speaker_name.clone(),
            text: entry.text.clone(),
        })
        .collect();

    let related_rows = program
        .related
        .iter()
        .map(|item| RelatedItemRow {
            program_id: program.id.clone(),
            related_id: item.id.clone(),
            guest: item.author.clone(),
            title: item.title.clone(),
            url: item.url.clone(),
        })
        .collect();

    Ok((program_row, transcript_rows, related_rows))
}

/// The validator admits both full and abbreviated month names, so the
/// conversion must too.
fn parse_air_date(display: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(display, "%B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(display, "%b %d, %Y"))
        .with_context(|| format!("'{}' is not a 'Month DD, YYYY' date", display))
}

/// Rebuild the three flattened tables from every JSON artifact on disk.
/// Reading and flattening fan out over rayon; failures are per-file and the
/// run continues past them.
pub fn flatten_all(conn: &Connection, store: &Store) -> Result<FlattenCounts> {
    let paths = store.list_programs()?;
    info!("Flattening {} record artifacts", paths.len());

    db::clear_flattened(conn)?;

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = FlattenCounts { programs: 0, transcripts: 0, related: 0, errors: 0 };

    for chunk in paths.chunks(500) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| {
                let program = store.read_program(path)?;
                flatten_program(&program)
            })
            .collect();

        let mut programs = Vec::new();
        let mut transcripts = Vec::new();
        let mut related = Vec::new();

        for (path, result) in chunk.iter().zip(results) {
            match result {
                Ok((p, t, r)) => {
                    programs.push(p);
                    transcripts.extend(t);
                    related.extend(r);
                }
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    counts.errors += 1;
                }
            }
        }

        counts.programs += programs.len();
        counts.transcripts += transcripts.len();
        counts.related += related.len();
        db::save_flattened(conn, &programs, &transcripts, &related)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RelatedProgram, SpeakerRole, TranscriptEntry};

    fn program_with(turns: usize, related: usize) -> Program {
        Program {
            id: "57267-1".into(),
            url: "https://booknotes.c-span.org/Watch/57267-1".into(),
            title: "Choosing the Right Stuff".into(),
            guest: "RICHARD RHODES".into(),
            description: None,
            book_isbn: Some("0-671-44133-7".into()),
            air_date: "June 5, 1994".into(),
            transcript: (0..turns)
                .map(|i| TranscriptEntry {
                    index: (i + 1) as u32,
                    speaker_role: if i % 2 == 0 { SpeakerRole::Host } else { SpeakerRole::Guest },
                    speaker_name: "LAMB".into(),
                    text: format!("Turn {}", i + 1),
                })
                .collect(),
            related: (0..related)
                .map(|i| RelatedProgram {
                    id: format!("4123{}-1", i),
                    url: format!("https://booknotes.c-span.org/Watch/4123{}-1", i),
                    author: "DAVID MCCULLOUGH".into(),
                    title: "Truman: A Life in Politics".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn three_turns_two_related_yield_one_three_two() {
        let (p, t, r) = flatten_program(&program_with(3, 2)).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(r.len(), 2);
        assert_eq!(p.program_id, "57267-1");
        assert!(t.iter().all(|row| row.program_id == "57267-1"));
        assert!(r.iter().all(|row| row.program_id == "57267-1"));
    }

    #[test]
    fn flattened_sequence_is_zero_based() {
        let (_, t, _) = flatten_program(&program_with(3, 0)).unwrap();
        let sequences: Vec<i64> = t.iter().map(|row| row.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        // Extraction-time indices stay 1-based on the record itself.
        let program = program_with(3, 0);
        assert_eq!(program.transcript[0].index, 1);
    }

    #[test]
    fn air_date_becomes_a_calendar_value() {
        let (p, _, _) = flatten_program(&program_with(0, 0)).unwrap();
        assert_eq!(p.air_date, NaiveDate::from_ymd_opt(1994, 6, 5).unwrap());

        let mut program = program_with(0, 0);
        program.air_date = "Feb 14, 1995".into();
        let (p, _, _) = flatten_program(&program).unwrap();
        assert_eq!(p.air_date, NaiveDate::from_ymd_opt(1995, 2, 14).unwrap());
    }

    #[test]
    fn unparseable_air_date_is_fatal_for_the_record() {
        let mut program = program_with(1, 0);
        program.air_date = "sometime in 1994".into();
        assert!(flatten_program(&program).is_err());
    }

    #[test]
    fn flatten_all_rebuilds_tables_from_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        store.ensure_dirs().unwrap();
        store.save_program(&program_with(3, 2)).unwrap();

        let conn = rusqlite::Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();

        let counts = flatten_all(&conn, &store).unwrap();
        assert_eq!(counts.programs, 1);
        assert_eq!(counts.transcripts, 3);
        assert_eq!(counts.related, 2);
        assert_eq!(counts.errors, 0);

        // Rerunning recomputes rather than accumulating.
        let counts = flatten_all(&conn, &store).unwrap();
        assert_eq!(counts.programs, 1);
        let stats = db::get_stats(&conn).unwrap();
        assert_eq!(stats.flattened_programs, 1);
        assert_eq!(stats.transcript_rows, 3);
        assert_eq!(stats.related_rows, 2);
    }
}
