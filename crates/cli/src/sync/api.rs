// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote workout API.
//!
//! Two layers:
//!
//! - [`ApiClient`] is the raw request/reply seam. Middleware such as
//!   [`OfflineGuard`](super::middleware::OfflineGuard) wraps it.
//! - [`RemoteWorkoutApi`] is the typed surface the sync engine replays
//!   mutations through. [`WorkoutApi`] implements it over any `ApiClient`.
//!
//! Every failure reaching the engine is classified into a [`RemoteError`]:
//!
//! | Failure                                   | Class        |
//! |-------------------------------------------|--------------|
//! | offline, transport, error frame, bad reply | transient    |
//! | rejected 401 / 403 / 408 / 429            | transient    |
//! | rejected 5xx                              | server fault |
//! | any other rejection (400, 404, 409, 422)  | rejected     |

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use fit_core::protocol::{ClientMessage, ServerMessage};
use fit_core::{Identity, WorkoutFields, WorkoutRecord};

use super::transport::TransportError;

/// Error returned by an [`ApiClient`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The device is offline; the request never left.
    #[error("network unavailable")]
    NetworkUnavailable,

    /// Connecting, sending or receiving failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a well-formed rejection.
    #[error("rejected ({code}): {reason}")]
    Rejected { code: u16, reason: String },

    /// The server could not process the frame at all.
    #[error("server error: {0}")]
    Server(String),

    /// The reply did not match the request.
    #[error("unexpected reply to {request}: {reply}")]
    UnexpectedReply {
        request: &'static str,
        reply: String,
    },
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future returned by [`ApiClient::call`].
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// Raw request/reply client.
///
/// Implementations return `Ok` only for success replies; a `Rejected` frame
/// comes back as [`ApiError::Rejected`].
pub trait ApiClient: Send + Sync {
    /// Send one request and wait for its reply.
    fn call(&self, request: ClientMessage) -> ApiFuture<'_, ServerMessage>;
}

impl<C: ApiClient + ?Sized> ApiClient for Arc<C> {
    fn call(&self, request: ClientMessage) -> ApiFuture<'_, ServerMessage> {
        (**self).call(request)
    }
}

/// How the sync engine should treat a failed replay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Temporary condition; keep the mutation and stop draining.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The server failed (5xx); retry, but only a bounded number of times.
    #[error("server fault ({code}): {reason}")]
    ServerFault { code: u16, reason: String },

    /// The server will never accept this mutation; drop it.
    #[error("rejected ({code}): {reason}")]
    Rejected { code: u16, reason: String },
}

impl RemoteError {
    /// Whether the mutation should stay queued.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RemoteError::Rejected { .. })
    }
}

impl From<ApiError> for RemoteError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Rejected { code, reason } => match code {
                401 | 403 | 408 | 429 => {
                    RemoteError::Transient(format!("rejected ({code}): {reason}"))
                }
                500..=599 => RemoteError::ServerFault { code, reason },
                _ => RemoteError::Rejected { code, reason },
            },
            other => RemoteError::Transient(other.to_string()),
        }
    }
}

/// Boxed future returned by [`RemoteWorkoutApi`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Typed remote operations the sync engine replays mutations through.
pub trait RemoteWorkoutApi: Send + Sync {
    /// Create (or confirm) a workout owned by `identity`.
    fn create_workout<'a>(
        &'a self,
        identity: &'a Identity,
        fields: &'a WorkoutFields,
    ) -> RemoteFuture<'a, WorkoutRecord>;

    /// Delete a workout by client workout id.
    fn delete_workout<'a>(
        &'a self,
        identity: &'a Identity,
        workout_id: &'a str,
    ) -> RemoteFuture<'a, ()>;
}

impl<A: RemoteWorkoutApi + ?Sized> RemoteWorkoutApi for Arc<A> {
    fn create_workout<'a>(
        &'a self,
        identity: &'a Identity,
        fields: &'a WorkoutFields,
    ) -> RemoteFuture<'a, WorkoutRecord> {
        (**self).create_workout(identity, fields)
    }

    fn delete_workout<'a>(
        &'a self,
        identity: &'a Identity,
        workout_id: &'a str,
    ) -> RemoteFuture<'a, ()> {
        (**self).delete_workout(identity, workout_id)
    }
}

/// [`RemoteWorkoutApi`] over an [`ApiClient`].
///
/// Request ids are left at zero; the client assigns correlation ids.
pub struct WorkoutApi<C: ApiClient> {
    client: C,
}

impl<C: ApiClient> WorkoutApi<C> {
    /// Wrap a client.
    pub fn new(client: C) -> Self {
        WorkoutApi { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// List the caller's workouts on the server.
    pub async fn list_workouts(&self, identity: &Identity) -> Result<Vec<WorkoutRecord>, RemoteError> {
        let request = ClientMessage::list_workouts(0, identity.token());
        match self.client.call(request).await? {
            ServerMessage::Workouts { records, .. } => Ok(records),
            other => Err(unexpected("list_workouts", &other).into()),
        }
    }

    /// Round-trip a ping.
    pub async fn ping(&self) -> Result<(), RemoteError> {
        match self.client.call(ClientMessage::ping(0)).await? {
            ServerMessage::Pong { .. } => Ok(()),
            other => Err(unexpected("ping", &other).into()),
        }
    }
}

impl<C: ApiClient> RemoteWorkoutApi for WorkoutApi<C> {
    fn create_workout<'a>(
        &'a self,
        identity: &'a Identity,
        fields: &'a WorkoutFields,
    ) -> RemoteFuture<'a, WorkoutRecord> {
        Box::pin(async move {
            let request = ClientMessage::create_workout(0, identity.token(), fields.clone());
            match self.client.call(request).await? {
                ServerMessage::Created { record, .. } => Ok(record),
                other => Err(unexpected("create_workout", &other).into()),
            }
        })
    }

    fn delete_workout<'a>(
        &'a self,
        identity: &'a Identity,
        workout_id: &'a str,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let request = ClientMessage::delete_workout(0, identity.token(), workout_id);
            match self.client.call(request).await? {
                ServerMessage::Deleted { .. } => Ok(()),
                other => Err(unexpected("delete_workout", &other).into()),
            }
        })
    }
}

fn unexpected(request: &'static str, reply: &ServerMessage) -> ApiError {
    let reply = reply
        .to_json()
        .unwrap_or_else(|_| format!("{reply:?}"));
    ApiError::UnexpectedReply { request, reply }
}
