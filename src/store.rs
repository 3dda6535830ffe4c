//! On-disk artifact store, keyed by program id: raw HTML cache plus one JSON
//! document per successfully parsed program. Both are write-once — a cached
//! page is never refetched and an existing record artifact makes the whole
//! page a no-op on rerun.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::Program;

const HTML_CACHE_DIR: &str = "html_cache";
const PROGRAMS_DIR: &str = "programs";

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Store { root: root.into() }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.root.join(HTML_CACHE_DIR))?;
        fs::create_dir_all(self.root.join(PROGRAMS_DIR))?;
        Ok(())
    }

    fn html_path(&self, program_id: &str) -> PathBuf {
        self.root.join(HTML_CACHE_DIR).join(format!("{}.html", program_id))
    }

    fn program_path(&self, program_id: &str) -> PathBuf {
        self.root.join(PROGRAMS_DIR).join(format!("{}.json", program_id))
    }

    // ── HTML cache ──

    pub fn load_html(&self, program_id: &str) -> Result<Option<String>> {
        let path = self.html_path(program_id);
        if !path.exists() {
            return Ok(None);
        }
        let html = fs::read_to_string(&path)
            .with_context(|| format!("reading cached HTML {}", path.display()))?;
        Ok(Some(html))
    }

    pub fn save_html(&self, program_id: &str, html: &str) -> Result<()> {
        let path = self.html_path(program_id);
        fs::write(&path, html).with_context(|| format!("caching HTML to {}", path.display()))
    }

    // ── Parsed program artifacts ──

    pub fn program_exists(&self, program_id: &str) -> bool {
        self.program_path(program_id).exists()
    }

    pub fn save_program(&self, program: &Program) -> Result<()> {
        let path = self.program_path(&program.id);
        let json = serde_json::to_string(program)?;
        fs::write(&path, json).with_context(|| format!("writing record to {}", path.display()))
    }

    /// Read a record artifact back, re-validating it so the flattening
    /// stage never consumes garbage.
    pub fn read_program(&self, path: &Path) -> Result<Program> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading record {}", path.display()))?;
        let program: Program = serde_json::from_str(&json)
            .with_context(|| format!("decoding record {}", path.display()))?;
        program
            .validate()
            .with_context(|| format!("re-validating record {}", path.display()))?;
        Ok(program)
    }

    pub fn list_programs(&self) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(PROGRAMS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    pub fn count_html(&self) -> usize {
        count_files(&self.root.join(HTML_CACHE_DIR))
    }

    pub fn count_programs(&self) -> usize {
        count_files(&self.root.join(PROGRAMS_DIR))
    }
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|rd| rd.filter_map(|e| e.ok()).filter(|e| e.path().is_file()).count())
        .unwrap_or(0)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Program, RelatedProgram, SpeakerRole, TranscriptEntry};

    fn sample() -> Program {
        Program {
            id: "57267-1".into(),
            url: "https://booknotes.c-span.org/Watch/57267-1".into(),
            title: "Choosing the Right Stuff".into(),
            guest: "RICHARD RHODES".into(),
            description: None,
            book_isbn: None,
            air_date: "June 5, 1994".into(),
            transcript: vec![TranscriptEntry {
                index: 1,
                speaker_role: SpeakerRole::Host,
                speaker_name: "LAMB".into(),
                text: "Why this book?".into(),
            }],
            related: vec![RelatedProgram {
                id: "41234-1".into(),
                url: "https://booknotes.c-span.org/Watch/41234-1".into(),
                author: "DAVID MCCULLOUGH".into(),
                title: "Truman: A Life in Politics".into(),
            }],
        }
    }

    #[test]
    fn program_artifacts_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        store.ensure_dirs().unwrap();

        let program = sample();
        assert!(!store.program_exists(&program.id));
        store.save_program(&program).unwrap();
        assert!(store.program_exists(&program.id));

        let paths = store.list_programs().unwrap();
        assert_eq!(paths.len(), 1);
        let back = store.read_program(&paths[0]).unwrap();
        assert_eq!(back, program);
    }

    #[test]
    fn read_rejects_invalid_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        store.ensure_dirs().unwrap();

        // Hand-written artifact with a broken transcript index.
        let path = dir.path().join(PROGRAMS_DIR).join("57267-1.json");
        let mut program = sample();
        program.transcript[0].index = 7;
        std::fs::write(&path, serde_json::to_string(&program).unwrap()).unwrap();
        assert!(store.read_program(&path).is_err());
    }

    #[test]
    fn html_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        store.ensure_dirs().unwrap();

        assert_eq!(store.load_html("57267-1").unwrap(), None);
        store.save_html("57267-1", "<html></html>").unwrap();
        assert_eq!(store.load_html("57267-1").unwrap().as_deref(), Some("<html></html>"));
        assert_eq!(store.count_html(), 1);
    }
}
