//! Medication plan persistence.
//!
//! Plan entries are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{PlanEntry, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Location of the plan file inside a data directory
pub fn plan_path(data_dir: &Path) -> PathBuf {
    data_dir.join("plan").join("medications.jsonl")
}

/// Plan sink trait for persisting entries
pub trait PlanSink {
    fn append(&mut self, entry: &PlanEntry) -> Result<()>;

    /// Persist a batch of entries as a unit; returns how many were written
    fn append_all(&mut self, entries: &[PlanEntry]) -> Result<usize>;
}

/// JSONL-based plan sink with file locking
pub struct JsonlPlan {
    path: PathBuf,
}

impl JsonlPlan {
    /// Create a new JSONL plan for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Whether a non-empty file stops partway through a line
///
/// Must be called while holding the lock.
fn ends_mid_line(mut file: &File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl PlanSink for JsonlPlan {
    fn append(&mut self, entry: &PlanEntry) -> Result<()> {
        self.append_all(std::slice::from_ref(entry))?;
        tracing::debug!(
            "Appended {} ({}) to plan",
            entry.id,
            entry.medication.dosage().kind()
        );
        Ok(())
    }

    fn append_all(&mut self, entries: &[PlanEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        // Serialize everything before touching the file
        let mut batch = String::new();
        for entry in entries {
            batch.push_str(&serde_json::to_string(entry)?);
            batch.push('\n');
        }

        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        if ends_mid_line(&file)? {
            tracing::warn!(
                "Plan {:?} ends with an unterminated line; starting a new one",
                self.path
            );
            batch.insert(0, '\n');
        }

        // One write per batch keeps lines whole even if the lock is ignored
        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(batch.as_bytes())?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended {} entries to {:?}", entries.len(), self.path);
        Ok(entries.len())
    }
}

/// Read all entries from a plan file
///
/// Lines that do not hold a valid plan entry (including lines that are not
/// UTF-8) are logged and skipped.
pub fn read_plan(path: &Path) -> Result<Vec<PlanEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.split(b'\n').enumerate() {
        let line = line_result?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<PlanEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed plan entry at line {}: {}",
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} entries from plan", entries.len());
    Ok(entries)
}
