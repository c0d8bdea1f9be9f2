#![forbid(unsafe_code)]

//! Core domain model for medication dosages.
//!
//! This crate provides:
//! - Domain types (the closed `Dosage` sum, `Medication`, plan entries)
//! - The formatter and its per-variant (trait object) counterpart
//! - Validation at the boundary with flat row/JSON encodings
//! - Persistence (JSONL plan, CSV import/export)
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod format;
pub mod polymorphic;
pub mod encoding;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod plan;
pub mod csv_io;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use format::{format_dosage, format_medication};
pub use polymorphic::{format_medication_polymorphic, DosageForm, InfusionDosage, TabletDosage};
pub use encoding::{DosageRow, MedicationRow};
pub use catalog::sample_medications;
pub use config::Config;
pub use plan::{plan_path, read_plan, JsonlPlan, PlanSink};
pub use csv_io::{export_csv, import_csv, ImportReport, InvalidRowPolicy, RejectedRow};
