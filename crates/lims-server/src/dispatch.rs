//! Action dispatcher.
//!
//! Each inbound frame is decoded and routed by its action name to exactly
//! one handler. Handlers read or mutate the [`EntityStore`], reply to the
//! requesting connection, and for mutating actions publish the full
//! updated collection through the [`Notifier`].
//!
//! | action | reply | publish |
//! |--------|-------|---------|
//! | `login` | `loginResponse` | -- |
//! | `getSamples` | `samplesResponse` | -- |
//! | `createSample` | `createSampleResponse` | `samplesUpdate` |
//! | `updateStatus` | `updateStatusResponse` | `samplesUpdate` (found only) |
//! | `getEquipment` | `equipmentResponse` | -- |
//! | `createEquipment` | `createEquipmentResponse` | `equipmentUpdate` |
//! | `getDashboard` | `dashboardResponse` | -- |
//! | `ping` | `pong` | -- |
//!
//! Unrecognized actions are logged and produce nothing.
//!
//! # Ordering
//!
//! [`Action::is_mutating`] decides which actions take the store's write
//! lock. Those handlers reply and the dispatcher publishes while the lock
//! is still held. The reply is therefore queued ahead of the broadcast on the
//! requester's connection, and broadcasts from concurrent mutations leave
//! in the order the mutations were applied.

use std::sync::Arc;

use chrono::Utc;
use lims_core::auth::CredentialVerifier;
use lims_core::store::{EntityStore, StoreError};
use lims_types::{ConnectionId, ResponseStatus};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::hub::Notifier;
use crate::protocol::{
    Action, ClientRequest, CreateEquipmentPayload, CreateSamplePayload, INVALID_CREDENTIALS_MESSAGE,
    LoginPayload, ServerMessage, UpdateStatusPayload,
};

/// Routes decoded requests to their handlers.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<RwLock<EntityStore>>,
    credentials: Arc<dyn CredentialVerifier>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    /// Create a dispatcher over a shared store.
    pub fn new(
        store: Arc<RwLock<EntityStore>>,
        credentials: Arc<dyn CredentialVerifier>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            credentials,
            notifier,
        }
    }

    /// Decode one text frame from `origin` and run its handler.
    ///
    /// Returns the action that was handled, or `None` when the action
    /// name is not recognized (nothing is sent in that case).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Protocol`] for a malformed frame or a
    /// payload missing a required field, and [`DispatchError::Store`] when
    /// the store refuses a creation. No response is sent for either; the
    /// connection stays usable.
    pub async fn dispatch(
        &self,
        origin: ConnectionId,
        frame: &str,
    ) -> Result<Option<Action>, DispatchError> {
        let request = ClientRequest::decode(frame)?;

        let Some(action) = request.action() else {
            warn!(connection = %origin, action = %request.action, "Unknown action");
            return Ok(None);
        };
        debug!(connection = %origin, %action, "Received request");

        if action.is_mutating() {
            self.apply_change(origin, action, &request).await?;
        } else {
            self.answer(origin, action, &request).await?;
        }

        Ok(Some(action))
    }

    /// Run a read-only action and reply to `origin`.
    async fn answer(
        &self,
        origin: ConnectionId,
        action: Action,
        request: &ClientRequest,
    ) -> Result<(), DispatchError> {
        match action {
            Action::Login => self.login(origin, request)?,
            Action::GetSamples => self.get_samples(origin).await,
            Action::GetEquipment => self.get_equipment(origin).await,
            Action::GetDashboard => self.get_dashboard(origin).await,
            Action::Ping => self.ping(origin),
            Action::CreateSample | Action::UpdateStatus | Action::CreateEquipment => {}
        }
        Ok(())
    }

    /// Run a mutating action under the write lock, reply to `origin`, then
    /// publish the resulting update (if any) before the lock is released.
    async fn apply_change(
        &self,
        origin: ConnectionId,
        action: Action,
        request: &ClientRequest,
    ) -> Result<(), DispatchError> {
        let mut store = self.store.write().await;
        let update = match action {
            Action::CreateSample => Some(self.create_sample(origin, request, &mut store)?),
            Action::UpdateStatus => self.update_status(origin, request, &mut store)?,
            Action::CreateEquipment => Some(self.create_equipment(origin, request, &mut store)?),
            Action::Login
            | Action::GetSamples
            | Action::GetEquipment
            | Action::GetDashboard
            | Action::Ping => None,
        };

        if let Some(update) = update {
            self.notifier.publish(&update);
        }
        Ok(())
    }

    fn login(&self, origin: ConnectionId, request: &ClientRequest) -> Result<(), DispatchError> {
        let payload: LoginPayload = request.payload(Action::Login)?;

        let response = match self.credentials.verify(&payload.username, &payload.password) {
            Some(user) => {
                info!(connection = %origin, username = %payload.username, "Login successful");
                ServerMessage::LoginResponse {
                    status: ResponseStatus::Success,
                    user: Some(user),
                    message: None,
                }
            }
            None => {
                info!(connection = %origin, username = %payload.username, "Login failed");
                ServerMessage::LoginResponse {
                    status: ResponseStatus::Error,
                    user: None,
                    message: Some(INVALID_CREDENTIALS_MESSAGE.to_owned()),
                }
            }
        };

        self.notifier.reply(origin, &response);
        Ok(())
    }

    async fn get_samples(&self, origin: ConnectionId) {
        let samples = self.store.read().await.list_samples();
        debug!(connection = %origin, count = samples.len(), "Sending samples");
        self.notifier
            .reply(origin, &ServerMessage::SamplesResponse { samples });
    }

    fn create_sample(
        &self,
        origin: ConnectionId,
        request: &ClientRequest,
        store: &mut EntityStore,
    ) -> Result<ServerMessage, DispatchError> {
        let payload: CreateSamplePayload = request.payload(Action::CreateSample)?;

        let sample = store.create_sample(payload)?;
        info!(sample_id = %sample.sample_id, name = %sample.name, "Sample created");

        self.notifier.reply(
            origin,
            &ServerMessage::CreateSampleResponse {
                status: ResponseStatus::Success,
                sample,
            },
        );
        Ok(ServerMessage::SamplesUpdate {
            samples: store.list_samples(),
        })
    }

    /// Returns no update when the sample does not exist; the requester is
    /// told so directly.
    fn update_status(
        &self,
        origin: ConnectionId,
        request: &ClientRequest,
        store: &mut EntityStore,
    ) -> Result<Option<ServerMessage>, DispatchError> {
        let payload: UpdateStatusPayload = request.payload(Action::UpdateStatus)?;

        match store.update_sample_status(&payload.sample_id, payload.status) {
            Ok(sample) => {
                info!(sample_id = %sample.sample_id, status = ?sample.status, "Sample status updated");
                self.notifier.reply(
                    origin,
                    &ServerMessage::UpdateStatusResponse {
                        status: ResponseStatus::Success,
                        sample: Some(sample),
                        message: None,
                    },
                );
                Ok(Some(ServerMessage::SamplesUpdate {
                    samples: store.list_samples(),
                }))
            }
            Err(e @ StoreError::SampleNotFound(_)) => {
                warn!(connection = %origin, sample_id = %payload.sample_id, "Status update for unknown sample");
                self.notifier.reply(
                    origin,
                    &ServerMessage::UpdateStatusResponse {
                        status: ResponseStatus::Error,
                        sample: None,
                        message: Some(not_found_message(&e)),
                    },
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_equipment(&self, origin: ConnectionId) {
        let equipment = self.store.read().await.list_equipment();
        debug!(connection = %origin, count = equipment.len(), "Sending equipment");
        self.notifier
            .reply(origin, &ServerMessage::EquipmentResponse { equipment });
    }

    fn create_equipment(
        &self,
        origin: ConnectionId,
        request: &ClientRequest,
        store: &mut EntityStore,
    ) -> Result<ServerMessage, DispatchError> {
        let payload: CreateEquipmentPayload = request.payload(Action::CreateEquipment)?;

        let equipment = store.create_equipment(payload)?;
        info!(equipment_id = %equipment.equipment_id, name = %equipment.name, "Equipment created");

        self.notifier.reply(
            origin,
            &ServerMessage::CreateEquipmentResponse {
                status: ResponseStatus::Success,
                equipment,
            },
        );
        Ok(ServerMessage::EquipmentUpdate {
            equipment: store.list_equipment(),
        })
    }

    async fn get_dashboard(&self, origin: ConnectionId) {
        let dashboard = self.store.read().await.dashboard();
        self.notifier
            .reply(origin, &ServerMessage::DashboardResponse { dashboard });
    }

    fn ping(&self, origin: ConnectionId) {
        self.notifier.reply(
            origin,
            &ServerMessage::Pong {
                timestamp: Utc::now().timestamp_millis(),
            },
        );
    }
}

fn not_found_message(error: &StoreError) -> String {
    match error {
        StoreError::SampleNotFound(id) => format!("Sample not found: {id}"),
        other => other.to_string(),
    }
}
