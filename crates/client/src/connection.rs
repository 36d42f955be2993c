// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Connection entry and session lifecycle state machine.
//!
//! A [`ConnectionEntry`] owns one physical session to a (address, realm) pair
//! and mirrors caller intent across reconnect cycles. Desired subscriptions
//! and registrations are the durable record of what callers want; active
//! handles are the live mirror against the present session, rebuilt from
//! scratch on every successful (re)connect and cleared on disconnect.
//! Invariants: an active name is always also desired, and both active maps
//! are empty while disconnected.

use std::{
    fmt::Debug,
    future::Future,
    pin::Pin,
    sync::{
        Arc, Mutex, PoisonError, RwLock, Weak,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use crate::{
    config::BusClientConfig,
    error::SessionResult,
    events::{ConnectionStatus, StatusFeed, StatusListener},
    payload::Payload,
    session::{
        BusSession, CloseReason, ProcedureHandler, RegistrationHandle, SessionFactory,
        SubscriptionHandle, TopicHandler, TransportConnection, TransportEvent,
    },
};

/// A pending remote procedure call.
///
/// Resolves with the remote return value, or with
/// [`SessionError::Remote`](crate::error::SessionError::Remote) carrying the
/// remote error payload. There is no cancellation primitive: closing the
/// owning connection simply tears down the transport and a pending call is
/// left unresolved.
pub struct PendingCall {
    inner: BoxFuture<'static, SessionResult<Payload>>,
}

impl Debug for PendingCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCall").finish_non_exhaustive()
    }
}

impl Future for PendingCall {
    type Output = SessionResult<Payload>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

/// One pooled connection to a (address, realm) pair.
///
/// Created by [`ConnectionPool::get`](crate::pool::ConnectionPool::get), which
/// starts the handshake immediately; destroyed only by an explicit pool
/// close, never by transport-level disconnects (those trigger the transport's
/// own reconnect cycle, not eviction).
pub struct ConnectionEntry {
    config: BusClientConfig,
    session: RwLock<Option<Arc<dyn BusSession>>>,
    connecting: AtomicBool,
    connected: AtomicBool,
    closing: AtomicBool,
    desired_subscriptions: DashMap<String, TopicHandler>,
    active_subscriptions: DashMap<String, SubscriptionHandle>,
    desired_procedures: DashMap<String, ProcedureHandler>,
    active_procedures: DashMap<String, RegistrationHandle>,
    status: StatusFeed,
    transport: Mutex<Option<Box<dyn TransportConnection>>>,
}

impl Debug for ConnectionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionEntry")
            .field("address", &self.config.address)
            .field("realm", &self.config.realm)
            .field("connecting", &self.is_connecting())
            .field("connected", &self.is_connected())
            .field("closing", &self.is_closing())
            .field("desired_subscriptions", &self.desired_subscriptions.len())
            .field("active_subscriptions", &self.active_subscriptions.len())
            .field("desired_procedures", &self.desired_procedures.len())
            .field("active_procedures", &self.active_procedures.len())
            .finish_non_exhaustive()
    }
}

impl ConnectionEntry {
    /// Creates the entry and immediately begins its handshake.
    ///
    /// Spawns the driver task consuming transport lifecycle events; the task
    /// holds only a weak reference and stops once the transport's event
    /// channel closes or the entry is dropped.
    pub(crate) fn spawn(factory: &dyn SessionFactory, config: BusClientConfig) -> Arc<Self> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let transport = factory.create(config.clone(), event_tx);

        let entry = Arc::new(Self {
            config,
            session: RwLock::new(None),
            connecting: AtomicBool::new(true),
            connected: AtomicBool::new(false),
            closing: AtomicBool::new(false),
            desired_subscriptions: DashMap::new(),
            active_subscriptions: DashMap::new(),
            desired_procedures: DashMap::new(),
            active_procedures: DashMap::new(),
            status: StatusFeed::new(),
            transport: Mutex::new(None),
        });

        tracing::info!(
            address = %entry.config.address,
            realm = %entry.config.realm,
            auth_id = %entry.config.credential.masked_auth_id(),
            "Connecting to router"
        );

        transport.open();
        *entry
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(transport);

        let driver: Weak<Self> = Arc::downgrade(&entry);
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                let Some(entry) = driver.upgrade() else {
                    break;
                };
                match event {
                    TransportEvent::Open(session) => entry.handle_open(session).await,
                    TransportEvent::Close { reason, details } => {
                        entry.handle_close(reason, details);
                    }
                }
            }
            tracing::debug!("Transport event channel closed, driver stopping");
        });

        entry
    }

    /// Returns the router address this entry connects to.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// Returns the realm this entry joins.
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.config.realm
    }

    /// Returns whether a handshake is in flight.
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::Acquire)
    }

    /// Returns whether a live session is established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Returns whether an explicit close has been requested.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    /// Creates a lifecycle status listener.
    ///
    /// The listener starts at `Closed` until the first handshake completes;
    /// `Ready` is observable only after the full replay of recorded
    /// subscriptions and registrations.
    #[must_use]
    pub fn status(&self) -> StatusListener {
        self.status.listen()
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub fn current_status(&self) -> ConnectionStatus {
        self.status.current()
    }

    /// Returns the topics recorded for subscription, in no particular order.
    #[must_use]
    pub fn desired_topics(&self) -> Vec<String> {
        self.desired_subscriptions
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Returns the topics live on the current session, in no particular order.
    #[must_use]
    pub fn active_topics(&self) -> Vec<String> {
        self.active_subscriptions
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Returns the procedures recorded for registration, in no particular order.
    #[must_use]
    pub fn desired_procedure_names(&self) -> Vec<String> {
        self.desired_procedures
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Returns the procedures registered on the current session, in no
    /// particular order.
    #[must_use]
    pub fn active_procedure_names(&self) -> Vec<String> {
        self.active_procedures
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Publishes a payload to `topic`.
    ///
    /// A publish while disconnected is logged and dropped; it is never
    /// surfaced as an error.
    pub async fn publish(&self, topic: &str, payload: Payload) {
        let Some(session) = self.current_session() else {
            tracing::warn!(topic = %topic, "Publish dropped, not connected");
            return;
        };

        tracing::debug!(topic = %topic, "Publishing");
        if let Err(e) = session.publish(topic, payload).await {
            tracing::warn!(topic = %topic, error = %e, "Publish failed");
        }
    }

    /// Calls a remote procedure.
    ///
    /// Returns `None` (after logging) when disconnected, otherwise a
    /// [`PendingCall`] resolving with the remote result.
    #[must_use]
    pub fn call(&self, procedure: &str, payload: Payload) -> Option<PendingCall> {
        let Some(session) = self.current_session() else {
            tracing::warn!(procedure = %procedure, "Call dropped, not connected");
            return None;
        };

        tracing::debug!(procedure = %procedure, "Calling");
        let procedure = procedure.to_string();
        Some(PendingCall {
            inner: Box::pin(async move { session.call(&procedure, payload).await }),
        })
    }

    /// Records a subscription and, when connected, issues it immediately.
    ///
    /// Idempotent by topic: a later call with the same topic replaces the
    /// handler. The recorded subscription survives reconnects and is replayed
    /// on every successful handshake.
    pub async fn subscribe(&self, topic: &str, handler: TopicHandler) {
        tracing::debug!(topic = %topic, "Recording subscription");
        self.desired_subscriptions
            .insert(topic.to_string(), handler.clone());

        if !self.is_connected() {
            return;
        }
        let Some(session) = self.current_session() else {
            return;
        };

        match session.subscribe(topic, handler).await {
            Ok(handle) => {
                // Retire the replaced subscription so only the latest handler
                // receives deliveries
                if let Some(stale) = self.active_subscriptions.insert(topic.to_string(), handle) {
                    let _ = session.unsubscribe(stale).await;
                }
                tracing::debug!(topic = %topic, "Subscribed");
            }
            Err(e) => tracing::warn!(topic = %topic, error = %e, "Subscribe failed"),
        }
    }

    /// Removes a subscription from both the recorded and live state.
    ///
    /// The transport unsubscribe is issued only while connected; failures are
    /// logged and otherwise ignored.
    pub async fn unsubscribe(&self, topic: &str) {
        self.desired_subscriptions.remove(topic);
        let Some((_, handle)) = self.active_subscriptions.remove(topic) else {
            return;
        };
        let Some(session) = self.current_session() else {
            return;
        };

        match session.unsubscribe(handle).await {
            Ok(()) => tracing::debug!(topic = %topic, "Unsubscribed"),
            Err(e) => tracing::warn!(topic = %topic, error = %e, "Unsubscribe failed"),
        }
    }

    /// Records a procedure registration and, when connected, issues it
    /// immediately.
    ///
    /// Idempotent by procedure name: a later call with the same name replaces
    /// the handler. The recorded registration survives reconnects and is
    /// replayed on every successful handshake.
    pub async fn register(&self, procedure: &str, handler: ProcedureHandler) {
        tracing::debug!(procedure = %procedure, "Recording registration");
        self.desired_procedures
            .insert(procedure.to_string(), handler.clone());

        if !self.is_connected() {
            return;
        }
        let Some(session) = self.current_session() else {
            return;
        };

        match session.register(procedure, handler).await {
            Ok(handle) => {
                if let Some(stale) = self.active_procedures.insert(procedure.to_string(), handle) {
                    let _ = session.unregister(stale).await;
                }
                tracing::debug!(procedure = %procedure, "Registered");
            }
            Err(e) => tracing::warn!(procedure = %procedure, error = %e, "Register failed"),
        }
    }

    /// Removes a procedure registration from both the recorded and live state.
    pub async fn unregister(&self, procedure: &str) {
        self.desired_procedures.remove(procedure);
        let Some((_, handle)) = self.active_procedures.remove(procedure) else {
            return;
        };
        let Some(session) = self.current_session() else {
            return;
        };

        match session.unregister(handle).await {
            Ok(()) => tracing::debug!(procedure = %procedure, "Unregistered"),
            Err(e) => tracing::warn!(procedure = %procedure, error = %e, "Unregister failed"),
        }
    }

    /// Marks the entry closing and tears down its transport.
    ///
    /// `closing` is sticky and suppresses the unexpected-closure signal from
    /// the transport's final close event. Teardown completion is
    /// fire-and-forget.
    pub(crate) fn close(&self) {
        self.closing.store(true, Ordering::Release);
        if let Some(transport) = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            transport.close();
        }
    }

    fn current_session(&self) -> Option<Arc<dyn BusSession>> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn handle_open(&self, session: Arc<dyn BusSession>) {
        tracing::info!(
            address = %self.config.address,
            realm = %self.config.realm,
            "Session established"
        );

        *self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        self.connected.store(true, Ordering::Release);
        self.connecting.store(false, Ordering::Release);

        self.replay_subscriptions(&session).await;
        self.replay_registrations(&session).await;

        // Ready only after the full replay, so status observers see the
        // active maps populated and further subscribes layer on top of the
        // bulk replay instead of racing it.
        self.status.emit(ConnectionStatus::Ready);
    }

    async fn replay_subscriptions(&self, session: &Arc<dyn BusSession>) {
        self.active_subscriptions.clear();
        let desired: Vec<(String, TopicHandler)> = self
            .desired_subscriptions
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        for (topic, handler) in desired {
            match session.subscribe(&topic, handler).await {
                Ok(handle) => {
                    // Dropped from desired while the replay was in flight
                    if !self.desired_subscriptions.contains_key(&topic) {
                        let _ = session.unsubscribe(handle).await;
                        continue;
                    }
                    self.active_subscriptions.insert(topic.clone(), handle);
                    tracing::debug!(topic = %topic, "Subscription replayed");
                }
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "Subscription replay failed");
                }
            }
        }
    }

    async fn replay_registrations(&self, session: &Arc<dyn BusSession>) {
        self.active_procedures.clear();
        let desired: Vec<(String, ProcedureHandler)> = self
            .desired_procedures
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        for (procedure, handler) in desired {
            match session.register(&procedure, handler).await {
                Ok(handle) => {
                    if !self.desired_procedures.contains_key(&procedure) {
                        let _ = session.unregister(handle).await;
                        continue;
                    }
                    self.active_procedures.insert(procedure.clone(), handle);
                    tracing::debug!(procedure = %procedure, "Registration replayed");
                }
                Err(e) => {
                    tracing::warn!(procedure = %procedure, error = %e, "Registration replay failed");
                }
            }
        }
    }

    fn handle_close(&self, reason: CloseReason, details: Option<String>) {
        self.connecting.store(false, Ordering::Release);
        self.connected.store(false, Ordering::Release);
        *self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.active_subscriptions.clear();
        self.active_procedures.clear();

        if self.is_closing() {
            tracing::debug!(reason = %reason, "Session closed");
        } else {
            tracing::warn!(
                address = %self.config.address,
                realm = %self.config.realm,
                reason = %reason,
                details = details.as_deref().unwrap_or_default(),
                "Session closed unexpectedly"
            );
            self.status.emit(ConnectionStatus::Closed);
        }
    }
}
