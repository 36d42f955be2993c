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

//! Typed lifecycle notification for connection entries.

use strum::Display;
use tokio::sync::watch;

/// Connection lifecycle status observable by caller facades.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    /// The session is live and all recorded subscriptions and registrations
    /// have been replayed.
    Ready,
    /// No live session.
    Closed,
}

impl ConnectionStatus {
    /// Returns whether the connection is ready for traffic.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Lifecycle notifier for one connection entry.
///
/// Seeded [`ConnectionStatus::Closed`] at construction so listeners attached
/// before the first handshake completes observe a not-ready state. Every
/// emission wakes listeners, including repeated `Closed` signals from
/// successive failed reconnect cycles.
#[derive(Debug)]
pub struct StatusFeed {
    tx: watch::Sender<ConnectionStatus>,
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusFeed {
    /// Creates a new [`StatusFeed`] seeded with [`ConnectionStatus::Closed`].
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionStatus::Closed);
        Self { tx }
    }

    /// Emits a status to all listeners.
    pub fn emit(&self, status: ConnectionStatus) {
        self.tx.send_replace(status);
    }

    /// Returns the current status.
    #[must_use]
    pub fn current(&self) -> ConnectionStatus {
        *self.tx.borrow()
    }

    /// Creates a listener positioned at the current status.
    #[must_use]
    pub fn listen(&self) -> StatusListener {
        StatusListener {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receives lifecycle status updates from a [`StatusFeed`].
#[derive(Clone, Debug)]
pub struct StatusListener {
    rx: watch::Receiver<ConnectionStatus>,
}

impl StatusListener {
    /// Returns the status as of the last emission.
    #[must_use]
    pub fn current(&self) -> ConnectionStatus {
        *self.rx.borrow()
    }

    /// Waits for the next status emission.
    ///
    /// Returns `None` once the owning feed is dropped.
    pub async fn next(&mut self) -> Option<ConnectionStatus> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Waits until the status is [`ConnectionStatus::Ready`].
    ///
    /// Returns `false` if the owning feed is dropped first.
    pub async fn wait_ready(&mut self) -> bool {
        loop {
            if self.rx.borrow_and_update().is_ready() {
                return true;
            }
            if self.rx.changed().await.is_err() {
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_feed_seeded_closed() {
        let feed = StatusFeed::new();

        assert_eq!(feed.current(), ConnectionStatus::Closed);
        assert_eq!(feed.listen().current(), ConnectionStatus::Closed);
    }

    #[rstest]
    fn test_listener_observes_emission() {
        let feed = StatusFeed::new();
        let listener = feed.listen();

        feed.emit(ConnectionStatus::Ready);

        assert_eq!(listener.current(), ConnectionStatus::Ready);
    }

    #[tokio::test]
    async fn test_next_wakes_on_repeated_closed() {
        let feed = StatusFeed::new();
        let mut listener = feed.listen();

        feed.emit(ConnectionStatus::Closed);

        assert_eq!(listener.next().await, Some(ConnectionStatus::Closed));
    }

    #[tokio::test]
    async fn test_next_returns_none_after_feed_dropped() {
        let feed = StatusFeed::new();
        let mut listener = feed.listen();
        drop(feed);

        assert_eq!(listener.next().await, None);
    }

    #[tokio::test]
    async fn test_wait_ready() {
        let feed = StatusFeed::new();
        let mut listener = feed.listen();

        feed.emit(ConnectionStatus::Ready);

        assert!(listener.wait_ready().await);
    }

    #[rstest]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::Ready.to_string(), "ready");
        assert_eq!(ConnectionStatus::Closed.to_string(), "closed");
    }
}
