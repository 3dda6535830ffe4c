use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::index::IndexEntry;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pages (
            id         INTEGER PRIMARY KEY,
            url        TEXT UNIQUE NOT NULL,
            program_id TEXT UNIQUE NOT NULL,
            author     TEXT,
            title      TEXT,
            visited    BOOLEAN NOT NULL DEFAULT 0,
            visited_at TEXT,
            last_error TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_pages_visited ON pages(visited);

        -- Flattened output, rewritten wholesale on every flatten run
        CREATE TABLE IF NOT EXISTS programs (
            program_id  TEXT PRIMARY KEY,
            guest       TEXT NOT NULL,
            title       TEXT NOT NULL,
            description TEXT,
            air_date    TEXT NOT NULL,
            book_isbn   TEXT,
            url         TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS transcript_entries (
            id           INTEGER PRIMARY KEY,
            program_id   TEXT NOT NULL REFERENCES programs(program_id),
            sequence     INTEGER NOT NULL,
            speaker_role TEXT NOT NULL CHECK(speaker_role IN ('host','guest')),
            speaker_name TEXT NOT NULL,
            text         TEXT NOT NULL,
            UNIQUE(program_id, sequence)
        );
        CREATE INDEX IF NOT EXISTS idx_transcript_program ON transcript_entries(program_id);

        CREATE TABLE IF NOT EXISTS related_items (
            id         INTEGER PRIMARY KEY,
            program_id TEXT NOT NULL REFERENCES programs(program_id),
            related_id TEXT NOT NULL,
            guest      TEXT NOT NULL,
            title      TEXT NOT NULL,
            url        TEXT NOT NULL,
            UNIQUE(program_id, related_id)
        );
        CREATE INDEX IF NOT EXISTS idx_related_program ON related_items(program_id);
        ",
    )?;
    Ok(())
}

// ── Page queue ──

pub struct QueuedPage {
    pub page_id: i64,
    pub url: String,
    pub program_id: String,
}

pub fn insert_pages(conn: &Connection, entries: &[IndexEntry]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO pages (url, program_id, author, title)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for e in entries {
            count += stmt.execute(rusqlite::params![
                e.url,
                e.program_id,
                e.author_name,
                e.program_title
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

/// Every queued page, oldest first. Page-level idempotence is decided by
/// the artifact store, not by the visited flag, so reruns walk the full
/// queue and skip cheaply.
pub fn fetch_pages(conn: &Connection, limit: Option<usize>) -> Result<Vec<QueuedPage>> {
    let sql = match limit {
        Some(n) => format!("SELECT id, url, program_id FROM pages ORDER BY id LIMIT {}", n),
        None => "SELECT id, url, program_id FROM pages ORDER BY id".to_string(),
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(QueuedPage {
                page_id: row.get(0)?,
                url: row.get(1)?,
                program_id: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Flattened rows ──

pub struct ProgramRow {
    pub program_id: String,
    pub guest: String,
    pub title: String,
    pub description: Option<String>,
    pub air_date: chrono::NaiveDate,
    pub book_isbn: Option<String>,
    pub url: String,
}

pub struct TranscriptRow {
    pub program_id: String,
    pub sequence: i64,
    pub speaker_role: &'static str,
    pub speaker_name: String,
    pub text: String,
}

pub struct RelatedItemRow {
    pub program_id: String,
    pub related_id: String,
    pub guest: String,
    pub title: String,
    pub url: String,
}

/// Flatten output is non-incremental: a run recomputes all three tables
/// from whatever JSON artifacts exist at that time.
pub fn clear_flattened(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM transcript_entries;
         DELETE FROM related_items;
         DELETE FROM programs;",
    )?;
    Ok(())
}

pub fn save_flattened(
    conn: &Connection,
    programs: &[ProgramRow],
    transcripts: &[TranscriptRow],
    related: &[RelatedItemRow],
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut p_stmt = tx.prepare(
            "INSERT OR REPLACE INTO programs
             (program_id, guest, title, description, air_date, book_isbn, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for p in programs {
            p_stmt.execute(rusqlite::params![
                p.program_id,
                p.guest,
                p.title,
                p.description,
                p.air_date.to_string(),
                p.book_isbn,
                p.url,
            ])?;
        }

        let mut t_stmt = tx.prepare(
            "INSERT OR REPLACE INTO transcript_entries
             (program_id, sequence, speaker_role, speaker_name, text)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for t in transcripts {
            t_stmt.execute(rusqlite::params![
                t.program_id,
                t.sequence,
                t.speaker_role,
                t.speaker_name,
                t.text,
            ])?;
        }

        let mut r_stmt = tx.prepare(
            "INSERT OR REPLACE INTO related_items
             (program_id, related_id, guest, title, url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for r in related {
            r_stmt.execute(rusqlite::params![
                r.program_id,
                r.related_id,
                r.guest,
                r.title,
                r.url,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Overview ──

pub struct OverviewRow {
    pub program_id: String,
    pub title: String,
    pub guest: String,
    pub air_date: String,
    pub turns: i64,
    pub related: i64,
}

pub fn fetch_overview(
    conn: &Connection,
    year: Option<i32>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let where_clause = match year {
        Some(y) => format!(" WHERE p.air_date LIKE '{:04}-%'", y),
        None => String::new(),
    };
    let sql = format!(
        "SELECT p.program_id, p.title, p.guest, p.air_date,
                (SELECT COUNT(*) FROM transcript_entries t WHERE t.program_id = p.program_id),
                (SELECT COUNT(*) FROM related_items r WHERE r.program_id = p.program_id)
         FROM programs p{}
         ORDER BY p.air_date, p.program_id
         LIMIT {}",
        where_clause, limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(OverviewRow {
                program_id: row.get(0)?,
                title: row.get(1)?,
                guest: row.get(2)?,
                air_date: row.get(3)?,
                turns: row.get(4)?,
                related: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub queued: usize,
    pub attempted: usize,
    pub page_errors: usize,
    pub flattened_programs: usize,
    pub transcript_rows: usize,
    pub related_rows: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let queued: usize = conn.query_row("SELECT COUNT(*) FROM pages", [], |r| r.get(0))?;
    let attempted: usize =
        conn.query_row("SELECT COUNT(*) FROM pages WHERE visited = 1", [], |r| r.get(0))?;
    let page_errors: usize = conn.query_row(
        "SELECT COUNT(*) FROM pages WHERE last_error IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let flattened_programs: usize =
        conn.query_row("SELECT COUNT(*) FROM programs", [], |r| r.get(0))?;
    let transcript_rows: usize =
        conn.query_row("SELECT COUNT(*) FROM transcript_entries", [], |r| r.get(0))?;
    let related_rows: usize =
        conn.query_row("SELECT COUNT(*) FROM related_items", [], |r| r.get(0))?;
    Ok(Stats {
        queued,
        attempted,
        page_errors,
        flattened_programs,
        transcript_rows,
        related_rows,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexEntry;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn entry(id: &str) -> IndexEntry {
        IndexEntry {
            program_id: id.to_string(),
            url: format!("https://booknotes.c-span.org/Watch/{}", id),
            author_name: "RICHARD RHODES".into(),
            program_title: "Choosing the Right Stuff".into(),
        }
    }

    #[test]
    fn queue_insert_is_idempotent() {
        let conn = test_conn();
        let entries = vec![entry("57267-1"), entry("41234-1")];
        assert_eq!(insert_pages(&conn, &entries).unwrap(), 2);
        assert_eq!(insert_pages(&conn, &entries).unwrap(), 0);
        assert_eq!(fetch_pages(&conn, None).unwrap().len(), 2);
        assert_eq!(fetch_pages(&conn, Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn flattened_tables_share_the_program_key() {
        let conn = test_conn();
        let programs = vec![ProgramRow {
            program_id: "57267-1".into(),
            guest: "RICHARD RHODES".into(),
            title: "Choosing the Right Stuff".into(),
            description: None,
            air_date: chrono::NaiveDate::from_ymd_opt(1994, 6, 5).unwrap(),
            book_isbn: None,
            url: "https://booknotes.c-span.org/Watch/57267-1".into(),
        }];
        let transcripts = vec![
            TranscriptRow {
                program_id: "57267-1".into(),
                sequence: 0,
                speaker_role: "host",
                speaker_name: "LAMB".into(),
                text: "Why this book?".into(),
            },
            TranscriptRow {
                program_id: "57267-1".into(),
                sequence: 1,
                speaker_role: "guest",
                speaker_name: "RHODES".into(),
                text: "It needed writing.".into(),
            },
        ];
        let related = vec![RelatedItemRow {
            program_id: "57267-1".into(),
            related_id: "41234-1".into(),
            guest: "DAVID MCCULLOUGH".into(),
            title: "Truman: A Life in Politics".into(),
            url: "https://booknotes.c-span.org/Watch/41234-1".into(),
        }];
        save_flattened(&conn, &programs, &transcripts, &related).unwrap();

        let s = get_stats(&conn).unwrap();
        assert_eq!(s.flattened_programs, 1);
        assert_eq!(s.transcript_rows, 2);
        assert_eq!(s.related_rows, 1);

        let overview = fetch_overview(&conn, Some(1994), 10).unwrap();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].turns, 2);
        assert_eq!(overview[0].related, 1);
        assert!(fetch_overview(&conn, Some(1999), 10).unwrap().is_empty());

        clear_flattened(&conn).unwrap();
        assert_eq!(get_stats(&conn).unwrap().flattened_programs, 0);
    }
}
