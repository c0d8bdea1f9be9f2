//! CSV interchange for medication plans.
//!
//! Rows use one nullable column per dosage field:
//! `drug_name,kind,morning,midday,evening,speed,duration`. Every imported row
//! passes through the encoding boundary, so a row describing both dosage forms
//! (or neither) never becomes a `Medication`.

use crate::encoding::MedicationRow;
use crate::{Error, Medication, PlanEntry, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::NamedTempFile;

/// What to do with a CSV row that fails validation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRowPolicy {
    /// Record the row in the report and keep going
    #[default]
    Skip,
    /// Fail the whole import
    Abort,
}

/// A row left out of an import
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedRow {
    /// 1-based line number in the CSV file (the header is line 1)
    pub line: u64,
    pub reason: String,
}

/// Outcome of an import
#[derive(Clone, Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<Medication>,
    pub rejected: Vec<RejectedRow>,
}

/// Write plan entries to a CSV file, replacing it atomically
///
/// The header is always written, even for an empty plan. Returns the number of
/// rows written.
pub fn export_csv(entries: &[PlanEntry], path: &Path) -> Result<usize> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file());
        writer.write_record([
            "drug_name", "kind", "morning", "midday", "evening", "speed", "duration",
        ])?;
        for entry in entries {
            writer.serialize(MedicationRow::from(&entry.medication))?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} medications to {:?}", entries.len(), path);
    Ok(entries.len())
}

/// Read medications from a CSV file
///
/// Rows that cannot be decoded are handled according to `policy`.
pub fn import_csv(path: &Path, policy: InvalidRowPolicy) -> Result<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut report = ImportReport::default();

    for result in reader.records() {
        let (line, decoded) = match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                let decoded = record
                    .deserialize::<MedicationRow>(Some(&headers))
                    .map_err(Error::from)
                    .and_then(Medication::try_from);
                (line, decoded)
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                (line, Err(Error::from(e)))
            }
        };

        match decoded {
            Ok(medication) => report.imported.push(medication),
            Err(e) => match policy {
                InvalidRowPolicy::Abort => {
                    return Err(Error::Encoding(format!("line {}: {}", line, e)));
                }
                InvalidRowPolicy::Skip => {
                    tracing::warn!("Skipping CSV line {}: {}", line, e);
                    report.rejected.push(RejectedRow {
                        line,
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    tracing::info!(
        "Imported {} medications from {:?} ({} rejected)",
        report.imported.len(),
        path,
        report.rejected.len()
    );
    Ok(report)
}
