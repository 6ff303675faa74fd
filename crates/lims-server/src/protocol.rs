//! Wire codec for the WebSocket message channel.
//!
//! Every frame is one UTF-8 JSON object.
//!
//! Requests:
//!
//! ```json
//! { "action": "createSample", "data": { "name": "Test", "type": "BLOOD", "patientId": "PAT-099" } }
//! ```
//!
//! `data` is optional and defaults to an empty object. Which fields it
//! must carry depends on the action, so presence is checked per handler
//! via [`ClientRequest::payload`], not here.
//!
//! Responses and broadcasts are flat objects tagged with a `type`
//! discriminator (see [`ServerMessage`]). Decoding is the only fallible
//! direction.

use lims_types::{
    DashboardSummary, Equipment, NewEquipment, NewSample, ResponseStatus, Sample, SampleStatus,
    UserProfile,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use crate::error::ProtocolError;

/// Greeting sent on every new connection.
pub const WELCOME_MESSAGE: &str = "Welcome to LIMS!";

/// Message sent on a rejected login. Deliberately does not say which
/// half of the pair was wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Frame sent in place of a message that failed to serialize.
const FALLBACK_FRAME: &str = r#"{"type":"error"}"#;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Actions a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Check the credential pair.
    Login,
    /// List all samples.
    GetSamples,
    /// Register a sample.
    CreateSample,
    /// Change a sample's status.
    UpdateStatus,
    /// List all equipment.
    GetEquipment,
    /// Register equipment.
    CreateEquipment,
    /// Aggregate counts for the dashboard.
    GetDashboard,
    /// Liveness probe.
    Ping,
}

impl Action {
    /// All recognized actions.
    pub const ALL: [Self; 8] = [
        Self::Login,
        Self::GetSamples,
        Self::CreateSample,
        Self::UpdateStatus,
        Self::GetEquipment,
        Self::CreateEquipment,
        Self::GetDashboard,
        Self::Ping,
    ];

    /// Resolve a wire action name. Matching is case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    /// The wire name of this action.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::GetSamples => "getSamples",
            Self::CreateSample => "createSample",
            Self::UpdateStatus => "updateStatus",
            Self::GetEquipment => "getEquipment",
            Self::CreateEquipment => "createEquipment",
            Self::GetDashboard => "getDashboard",
            Self::Ping => "ping",
        }
    }

    /// Whether this action changes the store. The dispatcher runs these
    /// under the write lock and publishes the resulting update.
    pub const fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::CreateSample | Self::UpdateStatus | Self::CreateEquipment
        )
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded request frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRequest {
    /// Action name as sent; may name no known [`Action`].
    pub action: String,
    /// Action payload; empty when the client sent none.
    pub data: Map<String, Value>,
}

impl ClientRequest {
    /// Decode one text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] when the frame is not a JSON object,
    /// lacks a string `action`, or carries a non-object `data`.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let Value::Object(mut object) = serde_json::from_str::<Value>(frame)? else {
            return Err(ProtocolError::NotAnObject);
        };

        let action = match object.remove("action") {
            Some(Value::String(action)) => action,
            _ => return Err(ProtocolError::MissingAction),
        };

        let data = match object.remove("data") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(data)) => data,
            Some(_) => return Err(ProtocolError::InvalidData { action }),
        };

        Ok(Self { action, data })
    }

    /// The recognized action, if any.
    pub fn action(&self) -> Option<Action> {
        Action::parse(&self.action)
    }

    /// Deserialize `data` into the payload type of `action`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidPayload`] when a required field is
    /// absent or has the wrong type.
    pub fn payload<T: DeserializeOwned>(&self, action: Action) -> Result<T, ProtocolError> {
        serde_json::from_value(Value::Object(self.data.clone())).map_err(|source| {
            ProtocolError::InvalidPayload {
                action: action.name(),
                source,
            }
        })
    }
}

/// Payload of `login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    /// Login name.
    pub username: String,
    /// Password; never logged.
    pub password: String,
}

/// Payload of `updateStatus`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    /// Target sample, kept raw so an unknown id reads as not-found rather
    /// than as a malformed request.
    pub sample_id: String,
    /// New status.
    pub status: SampleStatus,
}

/// Payload of `createSample`.
pub type CreateSamplePayload = NewSample;

/// Payload of `createEquipment`.
pub type CreateEquipmentPayload = NewEquipment;

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Every frame the server sends, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Greeting sent when a connection opens.
    Connection {
        /// Always `"connected"`.
        status: String,
        /// Human-readable greeting.
        message: String,
    },

    /// Result of `login`.
    LoginResponse {
        /// Whether the pair was accepted.
        status: ResponseStatus,
        /// Profile of the logged-in user on success.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<UserProfile>,
        /// Reason on failure.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Result of `getSamples`.
    SamplesResponse {
        /// All samples in insertion order.
        samples: Vec<Sample>,
    },

    /// Result of `createSample`.
    CreateSampleResponse {
        /// Always success; failures produce no response.
        status: ResponseStatus,
        /// The stored record.
        sample: Sample,
    },

    /// Result of `updateStatus`.
    UpdateStatusResponse {
        /// Success, or error when the sample does not exist.
        status: ResponseStatus,
        /// The updated record on success.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sample: Option<Sample>,
        /// Reason on failure.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Result of `getEquipment`.
    EquipmentResponse {
        /// All equipment in insertion order.
        equipment: Vec<Equipment>,
    },

    /// Result of `createEquipment`.
    CreateEquipmentResponse {
        /// Always success; failures produce no response.
        status: ResponseStatus,
        /// The stored record.
        equipment: Equipment,
    },

    /// Result of `getDashboard`.
    DashboardResponse {
        /// Aggregate counts.
        dashboard: DashboardSummary,
    },

    /// Result of `ping`.
    Pong {
        /// Server time in unix milliseconds.
        timestamp: i64,
    },

    /// Broadcast after any sample mutation.
    SamplesUpdate {
        /// The full current collection.
        samples: Vec<Sample>,
    },

    /// Broadcast after any equipment mutation.
    EquipmentUpdate {
        /// The full current collection.
        equipment: Vec<Equipment>,
    },
}

impl ServerMessage {
    /// The greeting sent on connection open.
    pub fn welcome() -> Self {
        Self::Connection {
            status: "connected".to_owned(),
            message: WELCOME_MESSAGE.to_owned(),
        }
    }

    /// The `type` discriminator of this message.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::LoginResponse { .. } => "loginResponse",
            Self::SamplesResponse { .. } => "samplesResponse",
            Self::CreateSampleResponse { .. } => "createSampleResponse",
            Self::UpdateStatusResponse { .. } => "updateStatusResponse",
            Self::EquipmentResponse { .. } => "equipmentResponse",
            Self::CreateEquipmentResponse { .. } => "createEquipmentResponse",
            Self::DashboardResponse { .. } => "dashboardResponse",
            Self::Pong { .. } => "pong",
            Self::SamplesUpdate { .. } => "samplesUpdate",
            Self::EquipmentUpdate { .. } => "equipmentUpdate",
        }
    }

    /// Serialize to a text frame.
    ///
    /// Never fails: a serialization error is logged and replaced with a
    /// bare `{"type":"error"}` frame.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!(kind = self.kind(), error = %e, "Failed to encode server message");
            FALLBACK_FRAME.to_owned()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_full_request() {
        let request = ClientRequest::decode(
            r#"{"action":"login","data":{"username":"admin","password":"admin123"}}"#,
        );
        let request = request.ok();
        assert_eq!(request.as_ref().and_then(ClientRequest::action), Some(Action::Login));
        assert_eq!(
            request.and_then(|r| r.data.get("username").cloned()),
            Some(Value::from("admin"))
        );
    }

    #[test]
    fn data_defaults_to_empty() {
        for frame in [r#"{"action":"ping"}"#, r#"{"action":"ping","data":null}"#] {
            let request = ClientRequest::decode(frame).ok();
            assert_eq!(request.map(|r| r.data.is_empty()), Some(true));
        }
    }

    #[test]
    fn unknown_action_still_decodes() {
        let request = ClientRequest::decode(r#"{"action":"foo"}"#).ok();
        assert_eq!(request.as_ref().map(|r| r.action.as_str()), Some("foo"));
        assert_eq!(request.and_then(|r| r.action()), None);
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(matches!(
            ClientRequest::decode("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            ClientRequest::decode("[1,2,3]"),
            Err(ProtocolError::NotAnObject)
        ));
        assert!(matches!(
            ClientRequest::decode(r#"{"data":{}}"#),
            Err(ProtocolError::MissingAction)
        ));
        assert!(matches!(
            ClientRequest::decode(r#"{"action":42}"#),
            Err(ProtocolError::MissingAction)
        ));
        assert!(matches!(
            ClientRequest::decode(r#"{"action":"login","data":"admin"}"#),
            Err(ProtocolError::InvalidData { .. })
        ));
    }

    #[test]
    fn payload_presence_is_checked_per_action() {
        let request = ClientRequest::decode(r#"{"action":"login","data":{"username":"admin"}}"#);
        let payload = request
            .map_err(|e| e.to_string())
            .and_then(|r| r.payload::<LoginPayload>(Action::Login).map_err(|e| e.to_string()));
        assert!(payload.is_err_and(|e| e.contains("password")));
    }

    #[test]
    fn update_status_payload_uses_camel_case() {
        let request = ClientRequest::decode(
            r#"{"action":"updateStatus","data":{"sampleId":"SMP-0001","status":"COMPLETED"}}"#,
        );
        let payload = request
            .ok()
            .and_then(|r| r.payload::<UpdateStatusPayload>(Action::UpdateStatus).ok());
        assert_eq!(payload.as_ref().map(|p| p.sample_id.as_str()), Some("SMP-0001"));
        assert_eq!(payload.map(|p| p.status), Some(SampleStatus::Completed));
    }

    #[test]
    fn action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.name()), Some(action));
        }
        assert_eq!(Action::parse("Login"), None);
    }

    #[test]
    fn only_creates_and_status_updates_mutate() {
        let mutating: Vec<Action> = Action::ALL
            .into_iter()
            .filter(|action| action.is_mutating())
            .collect();
        assert_eq!(
            mutating,
            [Action::CreateSample, Action::UpdateStatus, Action::CreateEquipment]
        );
    }

    #[test]
    fn welcome_frame_shape() {
        let json: Value = serde_json::from_str(&ServerMessage::welcome().encode())
            .unwrap_or_default();
        assert_eq!(json["type"], "connection");
        assert_eq!(json["status"], "connected");
        assert_eq!(json["message"], WELCOME_MESSAGE);
    }

    #[test]
    fn failed_login_omits_user() {
        let message = ServerMessage::LoginResponse {
            status: ResponseStatus::Error,
            user: None,
            message: Some(INVALID_CREDENTIALS_MESSAGE.to_owned()),
        };
        let json: Value = serde_json::from_str(&message.encode()).unwrap_or_default();
        assert_eq!(json["type"], "loginResponse");
        assert_eq!(json["status"], "error");
        assert!(json.get("user").is_none());
    }

    #[test]
    fn kind_matches_serialized_tag() {
        let messages = [
            ServerMessage::welcome(),
            ServerMessage::Pong { timestamp: 1 },
            ServerMessage::SamplesUpdate { samples: Vec::new() },
            ServerMessage::EquipmentUpdate { equipment: Vec::new() },
            ServerMessage::EquipmentResponse { equipment: Vec::new() },
        ];
        for message in messages {
            let json: Value = serde_json::from_str(&message.encode()).unwrap_or_default();
            assert_eq!(json["type"], message.kind());
        }
    }
}
