// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fit_core::protocol::{ClientMessage, ServerMessage};
use fit_core::stamp::millis_to_utc;
use fit_core::{Identity, ManualClock, QueuedMutation, WorkoutFields, WorkoutRecord, WorkoutUnit};
use tokio::sync::Semaphore;

use super::api::{ApiClient, ApiError, ApiFuture, RemoteError, RemoteFuture, RemoteWorkoutApi};
use super::bus::StateBus;
use super::connectivity::LiveChannel;
use super::engine::{EngineConfig, SyncEngine};
use super::queue::{MutationQueue, QueueError, QueueResult, QueueStore};
use super::transport::{Transport, TransportError, TransportFuture};

/// Workout fields performed at `performed_ms`.
pub fn make_fields(exercise: &str, amount: f64, performed_ms: u64) -> WorkoutFields {
    WorkoutFields::new(exercise, amount, WorkoutUnit::Reps, millis_to_utc(performed_ms)).unwrap()
}

pub fn make_identity() -> Identity {
    Identity::new("user-token-1").unwrap()
}

pub fn make_record(fields: &WorkoutFields) -> WorkoutRecord {
    WorkoutRecord {
        id: format!("srv-{}", fields.client_workout_id),
        owner: "owner".into(),
        fields: fields.clone(),
        recorded_at: millis_to_utc(0),
    }
}

/// In-memory queue store whose writes can be made to fail.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub entries: Arc<Mutex<Vec<QueuedMutation>>>,
    pub fail_appends: Arc<AtomicBool>,
    pub fail_rewrites: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Vec<QueuedMutation> {
        self.entries.lock().unwrap().clone()
    }
}

impl QueueStore for MemoryStore {
    fn load(&self) -> QueueResult<Vec<QueuedMutation>> {
        Ok(self.stored())
    }

    fn append(&mut self, mutation: &QueuedMutation) -> QueueResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(QueueError::Io(std::io::Error::other("disk full")));
        }
        self.entries.lock().unwrap().push(mutation.clone());
        Ok(())
    }

    fn replace_all(&mut self, mutations: &[QueuedMutation]) -> QueueResult<()> {
        if self.fail_rewrites.load(Ordering::SeqCst) {
            return Err(QueueError::Io(std::io::Error::other("read-only filesystem")));
        }
        *self.entries.lock().unwrap() = mutations.to_vec();
        Ok(())
    }
}

/// A queue over `store` with a manual clock starting at `start_ms`.
pub fn memory_queue(store: &MemoryStore, start_ms: u64) -> (MutationQueue<MemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_ms));
    let queue = MutationQueue::with_store(store.clone(), 7, clock.clone()).unwrap();
    (queue, clock)
}

/// One remote call as seen by [`MockApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create(String),
    Delete(String),
}

/// Scripted [`RemoteWorkoutApi`].
///
/// Calls succeed unless a failure is scripted for them, in order.
#[derive(Clone, Default)]
pub struct MockApi {
    pub calls: Arc<Mutex<Vec<ApiCall>>>,
    /// Token each call was made with, in call order.
    pub tokens: Arc<Mutex<Vec<String>>>,
    pub script: Arc<Mutex<VecDeque<Result<(), RemoteError>>>>,
    /// When set, every call waits for a permit before completing.
    pub gate: Option<Arc<Semaphore>>,
    pub in_flight: Arc<AtomicUsize>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose calls block until permits are added to the returned gate.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let api = MockApi {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (api, gate)
    }

    pub fn push_result(&self, result: Result<(), RemoteError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn fail_with(&self, error: RemoteError) {
        self.push_result(Err(error));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    async fn respond(&self, identity: &Identity, call: ApiCall) -> Result<(), RemoteError> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.calls.lock().unwrap().push(call);
        self.tokens.lock().unwrap().push(identity.token().to_string());
        let result = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl RemoteWorkoutApi for MockApi {
    fn create_workout<'a>(
        &'a self,
        identity: &'a Identity,
        fields: &'a WorkoutFields,
    ) -> RemoteFuture<'a, WorkoutRecord> {
        Box::pin(async move {
            self.respond(identity, ApiCall::Create(fields.client_workout_id.clone()))
                .await
                .map(|()| make_record(fields))
        })
    }

    fn delete_workout<'a>(
        &'a self,
        identity: &'a Identity,
        workout_id: &'a str,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            self.respond(identity, ApiCall::Delete(workout_id.to_string()))
                .await
        })
    }
}

/// Engine over a memory store and a [`MockApi`].
pub struct EngineFixture {
    pub engine: Arc<SyncEngine<MockApi, MemoryStore>>,
    pub api: MockApi,
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
}

pub fn engine_fixture(api: MockApi) -> EngineFixture {
    engine_fixture_with(api, MemoryStore::new(), EngineConfig::default())
}

pub fn engine_fixture_with(api: MockApi, store: MemoryStore, config: EngineConfig) -> EngineFixture {
    let (queue, clock) = memory_queue(&store, 1_000);
    let engine = SyncEngine::new(api.clone(), queue, StateBus::new(), config);
    EngineFixture {
        engine: Arc::new(engine),
        api,
        store,
        clock,
    }
}

/// [`ApiClient`] that records requests and answers from a script.
#[derive(Clone, Default)]
pub struct MockClient {
    pub requests: Arc<Mutex<Vec<ClientMessage>>>,
    pub replies: Arc<Mutex<VecDeque<Result<ServerMessage, ApiError>>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, reply: Result<ServerMessage, ApiError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<ClientMessage> {
        self.requests.lock().unwrap().clone()
    }
}

impl ApiClient for MockClient {
    fn call(&self, request: ClientMessage) -> ApiFuture<'_, ServerMessage> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted reply".into())));
        Box::pin(std::future::ready(reply))
    }
}

/// Mock transport for testing without real sockets.
///
/// Replies are scripted as closures over the sent message so tests can echo
/// the correlation id the client chose.
#[derive(Clone, Default)]
pub struct MockTransport {
    pub connected: Arc<AtomicBool>,
    pub connects: Arc<AtomicUsize>,
    pub connect_should_fail: Arc<AtomicBool>,
    pub outgoing: Arc<Mutex<Vec<ClientMessage>>>,
    pub incoming: Arc<Mutex<VecDeque<ServerMessage>>>,
    #[allow(clippy::type_complexity)]
    pub responder: Arc<Mutex<Option<Box<dyn Fn(&ClientMessage) -> Vec<ServerMessage> + Send>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every sent message with `f(message)`.
    pub fn respond_with(&self, f: impl Fn(&ClientMessage) -> Vec<ServerMessage> + Send + 'static) {
        *self.responder.lock().unwrap() = Some(Box::new(f));
    }

    pub fn queue_incoming(&self, msg: ServerMessage) {
        self.incoming.lock().unwrap().push_back(msg);
    }

    pub fn get_outgoing(&self) -> Vec<ClientMessage> {
        self.outgoing.lock().unwrap().clone()
    }

    pub fn is_open(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _url: &str, _timeout: Duration) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.connect_should_fail.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectionFailed("mock failure".into()));
            }
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.is_open() {
                return Err(TransportError::ConnectionClosed);
            }
            if let Some(responder) = self.responder.lock().unwrap().as_ref() {
                self.incoming.lock().unwrap().extend(responder(&msg));
            }
            self.outgoing.lock().unwrap().push(msg);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<ServerMessage>> {
        Box::pin(async move {
            let next = self.incoming.lock().unwrap().pop_front();
            if next.is_none() {
                self.connected.store(false, Ordering::SeqCst);
            }
            Ok(next)
        })
    }

    fn reset(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.is_open()
    }
}

/// [`LiveChannel`] that records suspend/resume calls.
#[derive(Default)]
pub struct RecordingChannel {
    pub events: Mutex<Vec<&'static str>>,
}

impl RecordingChannel {
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl LiveChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn suspend(&self) {
        self.events.lock().unwrap().push("suspend");
    }

    fn resume(&self) {
        self.events.lock().unwrap().push("resume");
    }
}
