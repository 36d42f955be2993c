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

//! Registry of shared connections, one per (address, realm) pair.

use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    sync::{Arc, Mutex, PoisonError},
};

use crate::{config::BusClientConfig, connection::ConnectionEntry, session::SessionFactory};

/// Key identifying one physical connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey(String);

impl PoolKey {
    /// Creates a new [`PoolKey`] instance from an address and realm.
    #[must_use]
    pub fn new(address: &str, realm: &str) -> Self {
        Self(format!("{realm}@{address}"))
    }
}

impl Display for PoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct PoolSlot {
    entry: Arc<ConnectionEntry>,
    refs: usize,
}

/// Registry of pooled connections.
///
/// Explicitly constructed and owned by the host composition root; at most one
/// live [`ConnectionEntry`] exists per key at any time. Entries are shared
/// with reference counting: each [`get`](Self::get) takes one reference and
/// each [`close`](Self::close) releases one, with teardown and eviction at
/// zero, so independent callers sharing a pair cannot close the connection
/// out from under each other.
pub struct ConnectionPool {
    factory: Arc<dyn SessionFactory>,
    entries: Mutex<HashMap<PoolKey, PoolSlot>>,
}

impl Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("connections", &self.len())
            .finish_non_exhaustive()
    }
}

impl ConnectionPool {
    /// Creates a new [`ConnectionPool`] instance using `factory` for transport
    /// connections.
    #[must_use]
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the shared entry for the config's (address, realm) pair,
    /// constructing it and starting its handshake on first request.
    ///
    /// An existing entry is returned unchanged: credentials supplied by later
    /// callers for the same pair are ignored (first caller wins). Never
    /// blocks; the returned entry may not yet be connected. Each call takes
    /// one reference, released with [`close`](Self::close).
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime; the entry's handshake driver
    /// is spawned onto it.
    pub fn get(&self, config: &BusClientConfig) -> Arc<ConnectionEntry> {
        let key = PoolKey::new(&config.address, &config.realm);
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let slot = entries.entry(key).or_insert_with(|| PoolSlot {
            entry: ConnectionEntry::spawn(self.factory.as_ref(), config.clone()),
            refs: 0,
        });
        slot.refs += 1;

        Arc::clone(&slot.entry)
    }

    /// Releases one reference on the (address, realm) pair.
    ///
    /// At zero references the entry is marked closing, its transport torn
    /// down (not awaited), and the key evicted, so a subsequent
    /// [`get`](Self::get) constructs a fresh entry and handshake. Idempotent:
    /// a close for an unknown pair is a no-op.
    pub fn close(&self, address: &str, realm: &str) {
        let key = PoolKey::new(address, realm);
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(slot) = entries.get_mut(&key) else {
            tracing::debug!(key = %key, "Close requested for unknown connection");
            return;
        };

        slot.refs = slot.refs.saturating_sub(1);
        if slot.refs > 0 {
            tracing::debug!(key = %key, refs = slot.refs, "Connection still shared");
            return;
        }

        tracing::info!(key = %key, "Closing connection");
        if let Some(slot) = entries.remove(&key) {
            slot.entry.close();
        }
    }

    /// Tears down every connection regardless of outstanding references.
    pub fn close_all(&self) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        for (key, slot) in entries.drain() {
            tracing::info!(key = %key, "Closing connection");
            slot.entry.close();
        }
    }

    /// Returns the number of live connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether the pool has no live connections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
