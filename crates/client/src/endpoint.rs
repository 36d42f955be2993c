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

//! Per-feature caller facades.
//!
//! Each facade binds one topic or procedure name to a shared
//! [`ConnectionEntry`] and forwards a single kind of operation. The host
//! adapter layer owns these; features holding a facade stay unaware of
//! reconnect churn and react only to the [`StatusListener`] for display.

use std::sync::Arc;

use crate::{
    connection::{ConnectionEntry, PendingCall},
    events::StatusListener,
    payload::Payload,
    session::{ProcedureHandler, TopicHandler},
};

/// Publish-only facade bound to one topic.
#[derive(Clone, Debug)]
pub struct PublishEndpoint {
    entry: Arc<ConnectionEntry>,
    topic: String,
}

impl PublishEndpoint {
    /// Creates a new [`PublishEndpoint`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `topic` is empty.
    pub fn new(entry: Arc<ConnectionEntry>, topic: impl Into<String>) -> anyhow::Result<Self> {
        let topic = topic.into();
        if topic.is_empty() {
            anyhow::bail!("Topic must not be empty");
        }
        Ok(Self { entry, topic })
    }

    /// Returns the bound topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Creates a lifecycle status listener for display.
    #[must_use]
    pub fn status(&self) -> StatusListener {
        self.entry.status()
    }

    /// Publishes a payload to the bound topic.
    ///
    /// Logged and dropped while disconnected.
    pub async fn publish(&self, payload: Payload) {
        self.entry.publish(&self.topic, payload).await;
    }
}

/// Subscribe-only facade; the subscription is recorded at bind time and
/// survives reconnects until [`unsubscribe`](Self::unsubscribe).
#[derive(Clone, Debug)]
pub struct SubscribeEndpoint {
    entry: Arc<ConnectionEntry>,
    topic: String,
}

impl SubscribeEndpoint {
    /// Records a subscription for `topic` and returns the facade.
    ///
    /// # Errors
    ///
    /// Returns an error if `topic` is empty.
    pub async fn bind(
        entry: Arc<ConnectionEntry>,
        topic: impl Into<String>,
        handler: TopicHandler,
    ) -> anyhow::Result<Self> {
        let topic = topic.into();
        if topic.is_empty() {
            anyhow::bail!("Topic must not be empty");
        }
        entry.subscribe(&topic, handler).await;
        Ok(Self { entry, topic })
    }

    /// Returns the bound topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Creates a lifecycle status listener for display.
    #[must_use]
    pub fn status(&self) -> StatusListener {
        self.entry.status()
    }

    /// Removes the subscription from both recorded and live state.
    pub async fn unsubscribe(&self) {
        self.entry.unsubscribe(&self.topic).await;
    }
}

/// Register-only facade; the registration is recorded at bind time and
/// survives reconnects until [`unregister`](Self::unregister).
#[derive(Clone, Debug)]
pub struct RegisterEndpoint {
    entry: Arc<ConnectionEntry>,
    procedure: String,
}

impl RegisterEndpoint {
    /// Records a procedure registration and returns the facade.
    ///
    /// # Errors
    ///
    /// Returns an error if `procedure` is empty.
    pub async fn bind(
        entry: Arc<ConnectionEntry>,
        procedure: impl Into<String>,
        handler: ProcedureHandler,
    ) -> anyhow::Result<Self> {
        let procedure = procedure.into();
        if procedure.is_empty() {
            anyhow::bail!("Procedure must not be empty");
        }
        entry.register(&procedure, handler).await;
        Ok(Self { entry, procedure })
    }

    /// Returns the bound procedure name.
    #[must_use]
    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    /// Creates a lifecycle status listener for display.
    #[must_use]
    pub fn status(&self) -> StatusListener {
        self.entry.status()
    }

    /// Removes the registration from both recorded and live state.
    pub async fn unregister(&self) {
        self.entry.unregister(&self.procedure).await;
    }
}

/// Call-only facade bound to one procedure.
#[derive(Clone, Debug)]
pub struct CallEndpoint {
    entry: Arc<ConnectionEntry>,
    procedure: String,
}

impl CallEndpoint {
    /// Creates a new [`CallEndpoint`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `procedure` is empty.
    pub fn new(entry: Arc<ConnectionEntry>, procedure: impl Into<String>) -> anyhow::Result<Self> {
        let procedure = procedure.into();
        if procedure.is_empty() {
            anyhow::bail!("Procedure must not be empty");
        }
        Ok(Self { entry, procedure })
    }

    /// Returns the bound procedure name.
    #[must_use]
    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    /// Creates a lifecycle status listener for display.
    #[must_use]
    pub fn status(&self) -> StatusListener {
        self.entry.status()
    }

    /// Calls the bound procedure.
    ///
    /// Returns `None` while disconnected.
    #[must_use]
    pub fn call(&self, payload: Payload) -> Option<PendingCall> {
        self.entry.call(&self.procedure, payload)
    }
}
