//! Shared type definitions for the LIMS dispatch server.
//!
//! Entity records, identifiers and enumerations used by the store, the
//! wire protocol and the browser client. Types flow to `TypeScript` via
//! `ts-rs` so the client sees the same field names the server emits.
//!
//! # Modules
//!
//! - [`ids`] -- Prefixed sequence identifiers and connection identifiers
//! - [`enums`] -- Sample and equipment states, response outcome
//! - [`structs`] -- Entity records, creation inputs, dashboard summary

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EquipmentStatus, ResponseStatus, SampleStatus};
pub use ids::{ConnectionId, EquipmentId, SampleId};
pub use structs::{DashboardSummary, Equipment, NewEquipment, NewSample, Sample, UserProfile};
