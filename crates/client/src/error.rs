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

//! Client error types.
//!
//! Steady-state operations on a live connection never surface these to the
//! caller as hard failures: transport problems degrade to logged warnings plus
//! the `Closed` lifecycle signal. [`ConfigError`] is the exception, raised
//! before any connection attempt is made.

use thiserror::Error;

/// Errors raised while resolving client configuration, before any connection
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("Environment variable {0} not set")]
    MissingEnvVar(&'static str),
    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Error types for bus session operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No live session; the connection is down or still handshaking.
    #[error("Not connected")]
    NotConnected,
    /// Transport-level failure.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The router rejected the credential handshake.
    #[error("Authentication error: {0}")]
    Authentication(String),
    /// Failed to hand a message to the transport.
    #[error("Send error: {0}")]
    Send(String),
    /// Payload serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Application-level error returned by the remote peer for a call.
    #[error("Remote error {uri}: {message}")]
    Remote {
        /// The error URI reported by the router.
        uri: String,
        /// The remote error message payload.
        message: String,
    },
}

impl From<serde_json::Error> for SessionError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Result type alias for bus session operations.
pub type SessionResult<T> = Result<T, SessionError>;
