//! Per-variant dispatch through trait objects.
//!
//! Each dosage form renders itself, so adding a form needs no change to a
//! central `match`, while adding an operation means touching every form. The
//! trait is sealed: only `TabletDosage` and `InfusionDosage` can implement it,
//! and converting any other form back into a `Dosage` panics.

use crate::{Dosage, DosageKind};
use std::any::Any;

mod private {
    pub trait Sealed {}
}

/// A dosage shape that knows how to render itself
pub trait DosageForm: private::Sealed + Any + Send + Sync {
    fn kind(&self) -> DosageKind;

    /// Same text as `format_dosage` for the equivalent `Dosage`
    fn render(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabletDosage {
    pub morning: u32,
    pub midday: u32,
    pub evening: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfusionDosage {
    pub speed: f64,
    pub duration: u32,
}

impl private::Sealed for TabletDosage {}
impl private::Sealed for InfusionDosage {}

impl DosageForm for TabletDosage {
    fn kind(&self) -> DosageKind {
        DosageKind::Tablet
    }

    fn render(&self) -> String {
        format!("{}-{}-{}", self.morning, self.midday, self.evening)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl DosageForm for InfusionDosage {
    fn kind(&self) -> DosageKind {
        DosageKind::Infusion
    }

    fn render(&self) -> String {
        format!("{}ml/min for {}h", self.speed, self.duration)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Dosage {
    /// View this dosage as a self-rendering form
    pub fn as_form(&self) -> Box<dyn DosageForm> {
        match *self {
            Dosage::Tablet {
                morning,
                midday,
                evening,
            } => Box::new(TabletDosage {
                morning,
                midday,
                evening,
            }),
            Dosage::Infusion { speed, duration } => Box::new(InfusionDosage { speed, duration }),
        }
    }

    /// Recover the closed representation of a form.
    ///
    /// # Panics
    /// If `form` is neither a `TabletDosage` nor an `InfusionDosage`. The seal
    /// makes that impossible from outside this crate; reaching it means the
    /// variant set was extended without updating this conversion.
    pub fn from_form(form: &dyn DosageForm) -> Dosage {
        let any = form.as_any();
        if let Some(t) = any.downcast_ref::<TabletDosage>() {
            return Dosage::tablet(t.morning, t.midday, t.evening);
        }
        if let Some(i) = any.downcast_ref::<InfusionDosage>() {
            return Dosage::Infusion {
                speed: i.speed,
                duration: i.duration,
            };
        }
        tracing::error!("Dosage form reporting kind {} has no closed variant", form.kind());
        panic!(
            "unreachable dosage variant: form reporting kind '{}' is neither TabletDosage nor InfusionDosage",
            form.kind()
        );
    }
}

/// Render `<drug name>: <dosage>` through the form's own method
pub fn format_medication_polymorphic(drug_name: &str, form: &dyn DosageForm) -> String {
    format!("{}: {}", drug_name, form.render())
}
