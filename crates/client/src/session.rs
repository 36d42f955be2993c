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

//! The supplied session library boundary.
//!
//! The wire protocol, framing, and handshake cryptography live behind these
//! traits. A transport implementation owns one physical connection per
//! [`create`](SessionFactory::create) call, performs its own bounded retry per
//! [`RetryPolicy`](crate::config::RetryPolicy), calls
//! [`BusClientConfig::sign_challenge`](crate::config::BusClientConfig::sign_challenge)
//! when the router issues its CRA challenge, and reports lifecycle transitions
//! as [`TransportEvent`]s on the channel it was given.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use strum::Display;
use tokio::sync::mpsc;

use crate::{
    config::BusClientConfig,
    error::SessionResult,
    payload::{Invocation, Payload},
};

/// Handler invoked for each event delivered on a subscribed topic.
pub type TopicHandler = Arc<dyn Fn(Invocation) + Send + Sync>;

/// Handler servicing calls to a registered procedure.
///
/// The returned future resolves with the result payload (or an error), which
/// the session library delivers back to the original caller transparently.
pub type ProcedureHandler =
    Arc<dyn Fn(Invocation) -> BoxFuture<'static, SessionResult<Payload>> + Send + Sync>;

/// Identifies one live subscription on the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub u64);

/// Identifies one live procedure registration on the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegistrationHandle(pub u64);

/// Reason a transport connection closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CloseReason {
    /// Closed by an explicit local request.
    Requested,
    /// Connection lost after being established.
    Lost,
    /// The router could not be reached and the retry budget is exhausted.
    Unreachable,
    /// The router refused the session (bad realm, failed handshake).
    Refused,
}

/// Lifecycle events delivered by the transport for one physical connection.
pub enum TransportEvent {
    /// The handshake succeeded and the session is live.
    Open(Arc<dyn BusSession>),
    /// The connection closed, expectedly or not. The transport emits this
    /// after its own retry budget is spent, or once per drop when it intends
    /// to re-open on its own.
    Close {
        /// Why the connection closed.
        reason: CloseReason,
        /// Transport-specific detail for diagnostics.
        details: Option<String>,
    },
}

impl Debug for TransportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(_) => f.debug_tuple("Open").finish(),
            Self::Close { reason, details } => f
                .debug_struct("Close")
                .field("reason", reason)
                .field("details", details)
                .finish(),
        }
    }
}

/// One live authenticated session on the bus.
#[async_trait]
pub trait BusSession: Send + Sync {
    /// Publishes a payload to `topic`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be handed to the transport.
    async fn publish(&self, topic: &str, payload: Payload) -> SessionResult<()>;

    /// Subscribes `handler` to `topic`.
    ///
    /// # Errors
    ///
    /// Returns an error if the router rejects the subscription.
    async fn subscribe(&self, topic: &str, handler: TopicHandler)
        -> SessionResult<SubscriptionHandle>;

    /// Removes a live subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown or the router rejects it.
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> SessionResult<()>;

    /// Calls a remote procedure and resolves with its result.
    ///
    /// No local timeout is imposed; the session library's own call semantics
    /// govern how long a call may stay pending.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Remote`](crate::error::SessionError::Remote)
    /// for application-level errors, or a transport error.
    async fn call(&self, procedure: &str, payload: Payload) -> SessionResult<Payload>;

    /// Registers `handler` as the callee for `procedure`.
    ///
    /// # Errors
    ///
    /// Returns an error if the router rejects the registration.
    async fn register(
        &self,
        procedure: &str,
        handler: ProcedureHandler,
    ) -> SessionResult<RegistrationHandle>;

    /// Removes a live procedure registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown or the router rejects it.
    async fn unregister(&self, handle: RegistrationHandle) -> SessionResult<()>;
}

/// One physical connection supplied by the session library.
pub trait TransportConnection: Send + Sync {
    /// Begins connecting asynchronously; never blocks.
    fn open(&self);

    /// Initiates graceful teardown; completion is fire-and-forget.
    fn close(&self);
}

/// Creates transport connections for the pool.
pub trait SessionFactory: Send + Sync {
    /// Constructs one physical connection for `config`.
    ///
    /// Lifecycle events are delivered on `events` from the moment
    /// [`TransportConnection::open`] is called.
    fn create(
        &self,
        config: BusClientConfig,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Box<dyn TransportConnection>;
}
