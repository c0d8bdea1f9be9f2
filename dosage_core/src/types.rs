//! Core domain types for medication dosages.
//!
//! This module defines the fundamental types used throughout the system:
//! - The closed `Dosage` sum (tablet schedule or infusion)
//! - The `Medication` record pairing a drug name with its dosage
//! - Persisted plan entries

use crate::encoding::DosageRow;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Dosage
// ============================================================================

/// How a drug is administered.
///
/// Exactly two shapes exist. Every consumer matches on both variants without a
/// wildcard arm, so adding a third shape is a compile error everywhere it
/// matters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "DosageRow", try_from = "DosageRow")]
pub enum Dosage {
    /// Tablets taken in the morning, at midday and in the evening
    Tablet { morning: u32, midday: u32, evening: u32 },
    /// Continuous infusion at `speed` ml/min for `duration` hours
    Infusion { speed: f64, duration: u32 },
}

/// Discriminant of a `Dosage`, used by external encodings and logs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DosageKind {
    Tablet,
    Infusion,
}

impl Dosage {
    /// Tablet schedule. Counts are unsigned, so every value is valid.
    pub fn tablet(morning: u32, midday: u32, evening: u32) -> Self {
        Dosage::Tablet {
            morning,
            midday,
            evening,
        }
    }

    /// Infusion at `speed` ml/min for `duration` hours.
    ///
    /// Rejects negative, NaN and infinite speeds. Negative zero is stored as zero
    /// so it renders as `0`.
    pub fn infusion(speed: f64, duration: u32) -> Result<Self> {
        if !speed.is_finite() {
            return Err(Error::Validation(format!(
                "infusion speed must be a finite number, got {}",
                speed
            )));
        }
        if speed < 0.0 {
            return Err(Error::Validation(format!(
                "infusion speed must not be negative, got {}",
                speed
            )));
        }
        let speed = if speed == 0.0 { 0.0 } else { speed };
        Ok(Dosage::Infusion { speed, duration })
    }

    /// Which variant this dosage is
    pub fn kind(&self) -> DosageKind {
        match self {
            Dosage::Tablet { .. } => DosageKind::Tablet,
            Dosage::Infusion { .. } => DosageKind::Infusion,
        }
    }
}

impl DosageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DosageKind::Tablet => "tablet",
            DosageKind::Infusion => "infusion",
        }
    }
}

impl fmt::Display for DosageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DosageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tablet" => Ok(DosageKind::Tablet),
            "infusion" => Ok(DosageKind::Infusion),
            other => Err(Error::Encoding(format!("unknown dosage kind '{}'", other))),
        }
    }
}

// ============================================================================
// Medication
// ============================================================================

/// A drug and the way it is dosed.
///
/// Fields are private so the non-empty name holds for every value, including
/// deserialized ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMedication")]
pub struct Medication {
    drug_name: String,
    dosage: Dosage,
}

/// Unvalidated wire shape of a `Medication`
#[derive(Deserialize)]
struct RawMedication {
    drug_name: String,
    dosage: Dosage,
}

impl TryFrom<RawMedication> for Medication {
    type Error = Error;

    fn try_from(raw: RawMedication) -> Result<Self> {
        Medication::new(raw.drug_name, raw.dosage)
    }
}

impl Medication {
    /// Pair a drug name with its dosage. The name must contain a non-whitespace
    /// character.
    pub fn new(drug_name: impl Into<String>, dosage: Dosage) -> Result<Self> {
        let drug_name = drug_name.into();
        if drug_name.trim().is_empty() {
            return Err(Error::Validation("drug name must not be empty".into()));
        }
        Ok(Self { drug_name, dosage })
    }

    pub fn drug_name(&self) -> &str {
        &self.drug_name
    }

    pub fn dosage(&self) -> &Dosage {
        &self.dosage
    }

    /// Built-in values whose names are known to be non-empty
    pub(crate) fn from_static(drug_name: &'static str, dosage: Dosage) -> Self {
        Self {
            drug_name: drug_name.into(),
            dosage,
        }
    }
}

// ============================================================================
// Plan Types
// ============================================================================

/// A medication recorded in the user's plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: Uuid,
    pub added_at: DateTime<Utc>,
    pub medication: Medication,
}

impl PlanEntry {
    /// Stamp a medication with a fresh id and the current time
    pub fn new(medication: Medication) -> Self {
        Self {
            id: Uuid::new_v4(),
            added_at: Utc::now(),
            medication,
        }
    }
}
