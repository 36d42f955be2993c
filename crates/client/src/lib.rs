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

//! Embeddable client runtime for [SwarmBus](https://nautechsystems.io) realms.
//!
//! Many independent features inside a host application may want to publish to,
//! subscribe to, or register procedures against the same remote realm. This
//! crate multiplexes them over one physical authenticated connection per
//! distinct (address, realm) pair and survives reconnect cycles transparently:
//! every recorded subscription and procedure registration is replayed on each
//! successful (re)connect without the caller redoing any setup.
//!
//! # Architecture
//!
//! ```text
//! Host feature code
//! ├── endpoint: PublishEndpoint | SubscribeEndpoint | RegisterEndpoint | CallEndpoint
//! └── pool: ConnectionPool          (one shared ConnectionEntry per realm@address)
//!     └── connection: ConnectionEntry   (desired/active state + replay on reconnect)
//!         └── session: SessionFactory / BusSession   (supplied transport library)
//! ```
//!
//! The wire protocol, framing, and challenge-response exchange live behind the
//! [`session`] traits and are supplied by the transport library; this crate
//! owns only the pooling, lifecycle, and failure-recovery logic above them.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod payload;
pub mod pool;
pub mod session;
