//! Built-in sample medications.
//!
//! One of each dosage form, shown by `medfmt show`.

use crate::types::*;
use once_cell::sync::Lazy;

/// Cached sample catalog - built once and reused
static SAMPLE_CATALOG: Lazy<Vec<Medication>> = Lazy::new(build_sample_catalog);

/// Get a reference to the cached sample medications
pub fn sample_medications() -> &'static [Medication] {
    &SAMPLE_CATALOG
}

/// Builds the sample medications in display order
pub fn build_sample_catalog() -> Vec<Medication> {
    let catalog = vec![
        Medication::from_static("Paracetamol", Dosage::tablet(1, 0, 2)),
        Medication::from_static(
            "Infliximab",
            Dosage::Infusion {
                speed: 1.5,
                duration: 2,
            },
        ),
    ];

    // from_static skips the checked constructors
    debug_assert!(
        validate(&catalog).is_empty(),
        "sample catalog is invalid: {:?}",
        validate(&catalog)
    );
    catalog
}

/// Check a list of medications against the construction rules
///
/// Returns a list of validation errors, or empty Vec if valid.
pub fn validate(medications: &[Medication]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, medication) in medications.iter().enumerate() {
        if medication.drug_name().trim().is_empty() {
            errors.push(format!("Medication #{} has empty drug name", index + 1));
        }

        match *medication.dosage() {
            Dosage::Tablet { .. } => {}
            Dosage::Infusion { speed, .. } => {
                if !speed.is_finite() || speed < 0.0 {
                    errors.push(format!(
                        "Medication '{}': invalid infusion speed {}",
                        medication.drug_name(),
                        speed
                    ));
                }
            }
        }
    }

    errors
}
