//! Enumeration types shared by the store and the wire protocol.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Sample lifecycle
// ---------------------------------------------------------------------------

/// Processing state of a laboratory sample.
///
/// New samples start as [`SampleStatus::Registered`]. Clients move them
/// through the remaining states with the `updateStatus` action.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum SampleStatus {
    /// Logged at reception, not yet processed.
    #[default]
    Registered,
    /// Under analysis.
    InProgress,
    /// Analysis finished.
    Completed,
    /// Unusable (contaminated, mislabeled, insufficient volume).
    Rejected,
}

// ---------------------------------------------------------------------------
// Equipment availability
// ---------------------------------------------------------------------------

/// Availability of a piece of laboratory equipment.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum EquipmentStatus {
    /// Free to be booked.
    #[default]
    Available,
    /// Currently running a job.
    InUse,
    /// Out of service.
    Maintenance,
}

// ---------------------------------------------------------------------------
// Response outcome
// ---------------------------------------------------------------------------

/// Outcome flag carried by request/response pairs (`"success"` / `"error"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ResponseStatus {
    /// The request was carried out.
    Success,
    /// The request was understood but refused.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_status_wire_names() {
        let json = serde_json::to_string(&SampleStatus::InProgress).ok();
        assert_eq!(json.as_deref(), Some("\"IN_PROGRESS\""));

        let parsed: Result<SampleStatus, _> = serde_json::from_str("\"COMPLETED\"");
        assert_eq!(parsed.ok(), Some(SampleStatus::Completed));

        let unknown: Result<SampleStatus, _> = serde_json::from_str("\"LOST\"");
        assert!(unknown.is_err());
    }

    #[test]
    fn equipment_status_defaults_to_available() {
        assert_eq!(EquipmentStatus::default(), EquipmentStatus::Available);
        let json = serde_json::to_string(&EquipmentStatus::InUse).ok();
        assert_eq!(json.as_deref(), Some("\"IN_USE\""));
    }

    #[test]
    fn response_status_is_lowercase() {
        let json = serde_json::to_string(&ResponseStatus::Success).ok();
        assert_eq!(json.as_deref(), Some("\"success\""));
    }
}
