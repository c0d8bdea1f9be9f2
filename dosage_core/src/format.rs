//! Rendering medications as display text.
//!
//! Output format:
//! - Tablet: `Paracetamol: 1-0-2`
//! - Infusion: `Infliximab: 1.5ml/min for 2h`
//!
//! Speeds use the shortest decimal form that reads back to the same value, so
//! `1.5` stays `1.5` and `0.0` becomes `0`.

use crate::{Dosage, Medication};
use std::fmt;

/// The single dispatch point over `Dosage`. No wildcard arm.
fn write_dosage(f: &mut impl fmt::Write, dosage: &Dosage) -> fmt::Result {
    match dosage {
        Dosage::Tablet {
            morning,
            midday,
            evening,
        } => write!(f, "{}-{}-{}", morning, midday, evening),
        Dosage::Infusion { speed, duration } => {
            write!(f, "{}ml/min for {}h", speed, duration)
        }
    }
}

impl fmt::Display for Dosage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dosage(f, self)
    }
}

impl fmt::Display for Medication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.drug_name())?;
        write_dosage(f, self.dosage())
    }
}

/// Render just the dosage part, e.g. `1-0-2`
pub fn format_dosage(dosage: &Dosage) -> String {
    dosage.to_string()
}

/// Render a medication as `<drug name>: <dosage>`
pub fn format_medication(medication: &Medication) -> String {
    medication.to_string()
}
