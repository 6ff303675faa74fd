//! Demo records loaded at startup.
//!
//! Seeding goes through the regular create path so the counters advance
//! exactly as they would for client-created records.

use lims_types::{NewEquipment, NewSample};
use tracing::info;

use crate::store::{EntityStore, StoreError};

const DEMO_COLLECTOR: &str = "Demo User";

const DEMO_SAMPLES: [(&str, &str, &str); 3] = [
    ("Blood Test - Patient A", "BLOOD", "PAT-001"),
    ("Urine Analysis - Patient B", "URINE", "PAT-002"),
    ("Tissue Biopsy - Patient C", "TISSUE", "PAT-003"),
];

const DEMO_EQUIPMENT: [(&str, &str, &str); 3] = [
    ("PCR Machine", "X-200", "BioTech Corp"),
    ("Microscope", "Ultra-5000", "OptiScope"),
    ("Centrifuge", "SpinMax Pro", "LabEquip Inc"),
];

/// Insert the demo samples and equipment.
///
/// # Errors
///
/// Propagates [`StoreError::IdSpaceExhausted`] from the store.
pub fn seed_demo_data(store: &mut EntityStore) -> Result<(), StoreError> {
    for (name, sample_type, patient_id) in DEMO_SAMPLES {
        store.create_sample(NewSample {
            name: name.to_owned(),
            sample_type: sample_type.to_owned(),
            patient_id: patient_id.to_owned(),
            description: None,
            collected_by: Some(DEMO_COLLECTOR.to_owned()),
        })?;
    }

    for (name, model, manufacturer) in DEMO_EQUIPMENT {
        store.create_equipment(NewEquipment {
            name: name.to_owned(),
            model: model.to_owned(),
            manufacturer: manufacturer.to_owned(),
            serial_number: None,
        })?;
    }

    info!(
        samples = store.sample_count(),
        equipment = store.equipment_count(),
        "Demo data initialized"
    );
    Ok(())
}
