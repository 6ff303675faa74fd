//! In-memory entity store for samples and equipment.
//!
//! [`EntityStore`] is the single source of truth read by every action
//! handler and by the dashboard aggregation. It is a plain owned value;
//! callers share it behind one lock (see `lims-server`'s `AppState`), so
//! every method here runs inside that mutual-exclusion boundary and never
//! blocks.
//!
//! Records are kept in `BTreeMap`s keyed by their sequence identifiers.
//! Identifiers order numerically and are handed out in increasing order,
//! so map iteration is insertion order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lims_types::{
    DashboardSummary, Equipment, EquipmentId, EquipmentStatus, NewEquipment, NewSample, Sample,
    SampleId, SampleStatus,
};

/// Number of samples listed in [`DashboardSummary::recent_samples`].
pub const RECENT_SAMPLE_LIMIT: usize = 5;

/// Collector recorded when the request does not name one.
pub const DEFAULT_COLLECTOR: &str = "Current User";

/// Serial number recorded when the request does not supply one.
pub const DEFAULT_SERIAL_NUMBER: &str = "SN-AUTO";

/// Errors reported by [`EntityStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No sample carries the requested identifier.
    #[error("sample not found: {0}")]
    SampleNotFound(String),

    /// The identifier counter reached its maximum; ids are never reused.
    #[error("{0} identifier space exhausted")]
    IdSpaceExhausted(&'static str),
}

/// Owned collections of samples and equipment plus their id counters.
#[derive(Debug, Clone)]
pub struct EntityStore {
    samples: BTreeMap<SampleId, Sample>,
    equipment: BTreeMap<EquipmentId, Equipment>,
    /// Identifier the next sample will receive; `None` once exhausted.
    next_sample_id: Option<SampleId>,
    /// Identifier the next equipment record will receive.
    next_equipment_id: Option<EquipmentId>,
    /// Millisecond stamp of the most recently issued barcode.
    last_barcode_millis: Option<i64>,
}

impl EntityStore {
    /// Create an empty store with both counters at 1.
    pub const fn new() -> Self {
        Self {
            samples: BTreeMap::new(),
            equipment: BTreeMap::new(),
            next_sample_id: Some(SampleId::FIRST),
            next_equipment_id: Some(EquipmentId::FIRST),
            last_barcode_millis: None,
        }
    }

    // -----------------------------------------------------------------------
    // Samples
    // -----------------------------------------------------------------------

    /// Register a new sample collected now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdSpaceExhausted`] once the sample counter
    /// cannot advance any further.
    pub fn create_sample(&mut self, new: NewSample) -> Result<Sample, StoreError> {
        self.create_sample_at(new, Utc::now())
    }

    /// Register a new sample with an explicit collection instant.
    ///
    /// The sample receives the next identifier, status
    /// [`SampleStatus::Registered`] and a barcode derived from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdSpaceExhausted`] once the sample counter
    /// cannot advance any further.
    pub fn create_sample_at(
        &mut self,
        new: NewSample,
        now: DateTime<Utc>,
    ) -> Result<Sample, StoreError> {
        let sample_id = self
            .next_sample_id
            .ok_or(StoreError::IdSpaceExhausted("sample"))?;
        self.next_sample_id = sample_id.next();

        let sample = Sample {
            sample_id,
            name: new.name,
            sample_type: new.sample_type,
            patient_id: new.patient_id,
            description: new.description.unwrap_or_default(),
            status: SampleStatus::Registered,
            barcode: self.issue_barcode(now),
            collection_date: now,
            collected_by: new
                .collected_by
                .unwrap_or_else(|| DEFAULT_COLLECTOR.to_owned()),
        };

        self.samples.insert(sample_id, sample.clone());
        Ok(sample)
    }

    /// Change the status of the sample named by `raw_id`.
    ///
    /// Only the `status` field changes. Applying the same status twice is
    /// a no-op the second time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SampleNotFound`] when `raw_id` is not a
    /// sample identifier or names no stored sample. The store is left
    /// unchanged.
    pub fn update_sample_status(
        &mut self,
        raw_id: &str,
        status: SampleStatus,
    ) -> Result<Sample, StoreError> {
        let sample = SampleId::parse(raw_id)
            .and_then(|id| self.samples.get_mut(&id))
            .ok_or_else(|| StoreError::SampleNotFound(raw_id.to_owned()))?;
        sample.status = status;
        Ok(sample.clone())
    }

    /// Look up one sample.
    pub fn sample(&self, id: SampleId) -> Option<&Sample> {
        self.samples.get(&id)
    }

    /// All samples in insertion order.
    pub fn list_samples(&self) -> Vec<Sample> {
        self.samples.values().cloned().collect()
    }

    /// Number of stored samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    // -----------------------------------------------------------------------
    // Equipment
    // -----------------------------------------------------------------------

    /// Register new equipment with status [`EquipmentStatus::Available`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdSpaceExhausted`] once the equipment counter
    /// cannot advance any further.
    pub fn create_equipment(&mut self, new: NewEquipment) -> Result<Equipment, StoreError> {
        let equipment_id = self
            .next_equipment_id
            .ok_or(StoreError::IdSpaceExhausted("equipment"))?;
        self.next_equipment_id = equipment_id.next();

        let item = Equipment {
            equipment_id,
            name: new.name,
            model: new.model,
            manufacturer: new.manufacturer,
            serial_number: new
                .serial_number
                .unwrap_or_else(|| DEFAULT_SERIAL_NUMBER.to_owned()),
            status: EquipmentStatus::Available,
        };

        self.equipment.insert(equipment_id, item.clone());
        Ok(item)
    }

    /// Look up one equipment record.
    pub fn equipment_item(&self, id: EquipmentId) -> Option<&Equipment> {
        self.equipment.get(&id)
    }

    /// All equipment in insertion order.
    pub fn list_equipment(&self) -> Vec<Equipment> {
        self.equipment.values().cloned().collect()
    }

    /// Number of stored equipment records.
    pub fn equipment_count(&self) -> usize {
        self.equipment.len()
    }

    // -----------------------------------------------------------------------
    // Aggregation
    // -----------------------------------------------------------------------

    /// Compute the dashboard counts and the recent-sample window.
    pub fn dashboard(&self) -> DashboardSummary {
        let count_samples = |status: SampleStatus| {
            self.samples.values().filter(|s| s.status == status).count()
        };
        let skip = self.samples.len().saturating_sub(RECENT_SAMPLE_LIMIT);

        DashboardSummary {
            total_samples: self.samples.len(),
            pending_samples: count_samples(SampleStatus::Registered),
            completed_samples: count_samples(SampleStatus::Completed),
            total_equipment: self.equipment.len(),
            available_equipment: self
                .equipment
                .values()
                .filter(|e| e.status == EquipmentStatus::Available)
                .count(),
            recent_samples: self.samples.values().skip(skip).cloned().collect(),
        }
    }

    /// Barcodes are `BAR-<unix millis>`; two samples created within the
    /// same millisecond get consecutive stamps.
    fn issue_barcode(&mut self, now: DateTime<Utc>) -> String {
        let now_millis = now.timestamp_millis();
        let millis = match self.last_barcode_millis {
            Some(last) if now_millis <= last => last.saturating_add(1),
            _ => now_millis,
        };
        self.last_barcode_millis = Some(millis);
        format!("BAR-{millis}")
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
