//! Entity records, creation inputs and aggregate views.
//!
//! Field names follow the browser client's camelCase convention on the
//! wire (`sampleId`, `patientId`, `serialNumber`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EquipmentStatus, SampleStatus};
use crate::ids::{EquipmentId, SampleId};

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// A registered laboratory sample.
///
/// Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Sample {
    /// Store-assigned identifier (`SMP-0001`).
    pub sample_id: SampleId,
    /// Human-readable label.
    pub name: String,
    /// Specimen kind (`BLOOD`, `URINE`, `TISSUE`, ...).
    #[serde(rename = "type")]
    pub sample_type: String,
    /// Patient the specimen was taken from.
    pub patient_id: String,
    /// Free-form notes; empty when none were supplied.
    pub description: String,
    /// Current processing state.
    pub status: SampleStatus,
    /// Printable barcode (`BAR-<unix millis>`), unique per store.
    pub barcode: String,
    /// Instant the sample was registered.
    pub collection_date: DateTime<Utc>,
    /// Who registered the sample.
    pub collected_by: String,
}

/// Client-supplied fields for a new sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NewSample {
    /// Human-readable label.
    pub name: String,
    /// Specimen kind.
    #[serde(rename = "type")]
    pub sample_type: String,
    /// Patient the specimen was taken from.
    pub patient_id: String,
    /// Optional notes.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional collector name; the store fills in a default.
    #[serde(default)]
    pub collected_by: Option<String>,
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// A registered piece of laboratory equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Equipment {
    /// Store-assigned identifier (`EQP-001`).
    pub equipment_id: EquipmentId,
    /// Display name.
    pub name: String,
    /// Vendor model designation.
    pub model: String,
    /// Vendor.
    pub manufacturer: String,
    /// Vendor serial number, or a placeholder when unknown.
    pub serial_number: String,
    /// Current availability.
    pub status: EquipmentStatus,
}

/// Client-supplied fields for new equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NewEquipment {
    /// Display name.
    pub name: String,
    /// Vendor model designation.
    pub model: String,
    /// Vendor.
    pub manufacturer: String,
    /// Optional serial number.
    #[serde(default)]
    pub serial_number: Option<String>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Profile returned to a client after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UserProfile {
    /// Stable user identifier (`USR-001`).
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact address.
    pub email: String,
    /// Role label shown by the client (`ADMIN`).
    pub role: String,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Aggregate counts shown on the client dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DashboardSummary {
    /// Number of samples in the store.
    pub total_samples: usize,
    /// Samples still in [`SampleStatus::Registered`].
    pub pending_samples: usize,
    /// Samples in [`SampleStatus::Completed`].
    pub completed_samples: usize,
    /// Number of equipment records.
    pub total_equipment: usize,
    /// Equipment in [`EquipmentStatus::Available`].
    pub available_equipment: usize,
    /// The most recently registered samples, oldest first.
    pub recent_samples: Vec<Sample>,
}
