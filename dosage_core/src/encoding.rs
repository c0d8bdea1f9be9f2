//! Translation between flat external records and the closed `Dosage` sum.
//!
//! Relational rows and tagged JSON objects carry one nullable column per field
//! of every variant, so they can describe a tablet and an infusion at once, or
//! neither. Every conversion here checks that exactly one variant's columns are
//! populated before a `Dosage` is produced.

use crate::{Dosage, DosageKind, Error, Medication, Result};
use serde::{Deserialize, Serialize};

/// Nullable-column shape of a dosage
///
/// This is also the JSON shape of `Dosage`: absent columns are omitted on
/// output and unknown keys are rejected on input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DosageRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midday: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl DosageRow {
    fn has_tablet_columns(&self) -> bool {
        self.morning.is_some() || self.midday.is_some() || self.evening.is_some()
    }

    fn has_infusion_columns(&self) -> bool {
        self.speed.is_some() || self.duration.is_some()
    }

    /// Resolve the variant from the tag, or from the populated columns when
    /// the tag is missing
    fn resolve_kind(&self) -> Result<DosageKind> {
        let tag = self
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty());

        if let Some(tag) = tag {
            return tag.parse();
        }

        match (self.has_tablet_columns(), self.has_infusion_columns()) {
            (true, false) => Ok(DosageKind::Tablet),
            (false, true) => Ok(DosageKind::Infusion),
            (true, true) => Err(Error::Encoding(
                "row carries both tablet and infusion columns".into(),
            )),
            (false, false) => Err(Error::Encoding(
                "row carries neither tablet nor infusion columns".into(),
            )),
        }
    }
}

impl TryFrom<DosageRow> for Dosage {
    type Error = Error;

    fn try_from(row: DosageRow) -> Result<Self> {
        match row.resolve_kind()? {
            DosageKind::Tablet => {
                if row.has_infusion_columns() {
                    return Err(Error::Encoding(
                        "tablet row must not carry speed or duration".into(),
                    ));
                }
                match (row.morning, row.midday, row.evening) {
                    (Some(morning), Some(midday), Some(evening)) => {
                        Ok(Dosage::tablet(morning, midday, evening))
                    }
                    _ => Err(Error::Encoding(
                        "tablet row is missing morning, midday or evening".into(),
                    )),
                }
            }
            DosageKind::Infusion => {
                if row.has_tablet_columns() {
                    return Err(Error::Encoding(
                        "infusion row must not carry morning, midday or evening".into(),
                    ));
                }
                match (row.speed, row.duration) {
                    (Some(speed), Some(duration)) => Dosage::infusion(speed, duration),
                    _ => Err(Error::Encoding(
                        "infusion row is missing speed or duration".into(),
                    )),
                }
            }
        }
    }
}

impl From<&Dosage> for DosageRow {
    fn from(dosage: &Dosage) -> Self {
        match *dosage {
            Dosage::Tablet {
                morning,
                midday,
                evening,
            } => DosageRow {
                kind: Some(DosageKind::Tablet.as_str().into()),
                morning: Some(morning),
                midday: Some(midday),
                evening: Some(evening),
                ..DosageRow::default()
            },
            Dosage::Infusion { speed, duration } => DosageRow {
                kind: Some(DosageKind::Infusion.as_str().into()),
                speed: Some(speed),
                duration: Some(duration),
                ..DosageRow::default()
            },
        }
    }
}

impl From<Dosage> for DosageRow {
    fn from(dosage: Dosage) -> Self {
        DosageRow::from(&dosage)
    }
}

/// One CSV record of a medication plan
///
/// Kept flat rather than flattening `DosageRow`, since the csv reader cannot
/// type fields inside a flattened map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicationRow {
    pub drug_name: String,
    pub kind: Option<String>,
    pub morning: Option<u32>,
    pub midday: Option<u32>,
    pub evening: Option<u32>,
    pub speed: Option<f64>,
    pub duration: Option<u32>,
}

impl TryFrom<MedicationRow> for Medication {
    type Error = Error;

    fn try_from(row: MedicationRow) -> Result<Self> {
        let dosage = Dosage::try_from(DosageRow {
            kind: row.kind,
            morning: row.morning,
            midday: row.midday,
            evening: row.evening,
            speed: row.speed,
            duration: row.duration,
        })?;
        Medication::new(row.drug_name, dosage)
    }
}

impl From<&Medication> for MedicationRow {
    fn from(medication: &Medication) -> Self {
        let dosage = DosageRow::from(medication.dosage());
        MedicationRow {
            drug_name: medication.drug_name().to_string(),
            kind: dosage.kind,
            morning: dosage.morning,
            midday: dosage.midday,
            evening: dosage.evening,
            speed: dosage.speed,
            duration: dosage.duration,
        }
    }
}
