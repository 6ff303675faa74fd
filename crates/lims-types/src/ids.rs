//! Type-safe identifier wrappers.
//!
//! Entity identifiers (`SampleId`, `EquipmentId`) are sequence numbers
//! rendered with a fixed prefix and zero padding (`SMP-0001`, `EQP-001`).
//! They order numerically, so a `BTreeMap` keyed by them iterates in
//! creation order even past the padding width.
//!
//! Connection identifiers wrap a [`Uuid`] v7 and never leave the server.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a prefixed, zero-padded sequence identifier.
macro_rules! define_seq_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal, $width:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(#[ts(type = "string")] u32);

        impl $name {
            /// The first identifier handed out by a fresh store.
            pub const FIRST: Self = Self(1);

            /// Wrap a raw sequence number.
            pub const fn from_seq(seq: u32) -> Self {
                Self(seq)
            }

            /// Return the raw sequence number.
            pub const fn seq(self) -> u32 {
                self.0
            }

            /// The identifier following this one, or `None` once the
            /// sequence space is exhausted.
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(seq) => Some(Self(seq)),
                    None => None,
                }
            }

            /// Parse the rendered form (prefix, `-`, decimal digits).
            ///
            /// Returns `None` for any other shape, including a bare number.
            pub fn parse(raw: &str) -> Option<Self> {
                let digits = raw.strip_prefix($prefix)?.strip_prefix('-')?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse().ok().map(Self)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}-{:0width$}", $prefix, self.0, width = $width)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "invalid {} identifier: {raw}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

define_seq_id! {
    /// Identifier of a laboratory sample, rendered as `SMP-%04d`.
    SampleId, "SMP", 4
}

define_seq_id! {
    /// Identifier of a piece of laboratory equipment, rendered as `EQP-%03d`.
    EquipmentId, "EQP", 3
}

/// Identifier of one open client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_id_is_zero_padded_to_four() {
        assert_eq!(SampleId::FIRST.to_string(), "SMP-0001");
        assert_eq!(SampleId::from_seq(42).to_string(), "SMP-0042");
        assert_eq!(SampleId::from_seq(12345).to_string(), "SMP-12345");
    }

    #[test]
    fn equipment_id_is_zero_padded_to_three() {
        assert_eq!(EquipmentId::FIRST.to_string(), "EQP-001");
        assert_eq!(EquipmentId::from_seq(7).to_string(), "EQP-007");
    }

    #[test]
    fn parse_accepts_only_prefixed_form() {
        assert_eq!(SampleId::parse("SMP-0003"), Some(SampleId::from_seq(3)));
        assert_eq!(SampleId::parse("SMP-10000"), Some(SampleId::from_seq(10_000)));
        assert_eq!(SampleId::parse("EQP-003"), None);
        assert_eq!(SampleId::parse("0003"), None);
        assert_eq!(SampleId::parse("SMP-"), None);
        assert_eq!(SampleId::parse("SMP-+12"), None);
        assert_eq!(EquipmentId::parse("EQP-012"), Some(EquipmentId::from_seq(12)));
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let small = SampleId::from_seq(9999);
        let big = SampleId::from_seq(10_000);
        assert!(small < big);
        assert!(small.to_string() > big.to_string());
    }

    #[test]
    fn next_stops_at_exhaustion() {
        assert_eq!(SampleId::FIRST.next(), Some(SampleId::from_seq(2)));
        assert_eq!(SampleId::from_seq(u32::MAX).next(), None);
    }

    #[test]
    fn serializes_as_rendered_string() {
        let json = serde_json::to_string(&EquipmentId::from_seq(5)).ok();
        assert_eq!(json.as_deref(), Some("\"EQP-005\""));

        let restored: Result<SampleId, _> = serde_json::from_str("\"SMP-0011\"");
        assert_eq!(restored.ok(), Some(SampleId::from_seq(11)));

        let rejected: Result<SampleId, _> = serde_json::from_str("\"nope\"");
        assert!(rejected.is_err());
    }

    #[test]
    fn connection_ids_are_distinct() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
