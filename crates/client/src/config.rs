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

//! Client configuration structures and environment resolution.

use std::time::Duration;

use crate::{
    common::{consts::ws_url_for_portal, credential::Credential},
    error::ConfigError,
};

/// Environment variable holding the deployment key.
pub const ENV_DEPLOYMENT_KEY: &str = "SWARMBUS_DEPLOYMENT_KEY";
/// Environment variable holding the application key.
pub const ENV_APP_KEY: &str = "SWARMBUS_APP_KEY";
/// Environment variable holding the deployment environment name.
pub const ENV_ENVIRONMENT: &str = "SWARMBUS_ENV";
/// Environment variable holding the portal origin the deployment was created from.
pub const ENV_PORTAL_URL: &str = "SWARMBUS_PORTAL_URL";
/// Environment variable holding the device serial used as auth id and secret.
pub const ENV_DEVICE_SERIAL: &str = "SWARMBUS_DEVICE_SERIAL";

/// Reconnect policy consumed by the transport library.
///
/// The core performs no backoff of its own; these values parameterize the
/// transport's bounded retry between unexpected closure and re-open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Whether to retry while the router is unreachable.
    pub retry_if_unreachable: bool,
    /// Maximum number of reconnect attempts before final closure.
    pub max_retries: u32,
    /// Delay before the first reconnect attempt.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_if_unreachable: true,
            max_retries: 10,
            initial_delay: Duration::from_secs(3),
        }
    }
}

/// Composes a realm name from deployment identifiers.
///
/// Realms isolate one deployed application per environment, so the name
/// carries all three identifiers. The environment segment is lowercased.
#[must_use]
pub fn compose_realm(deployment_key: &str, app_key: &str, environment: &str) -> String {
    format!(
        "realm-{deployment_key}-{app_key}-{}",
        environment.to_lowercase()
    )
}

/// Configuration for one pooled bus connection.
#[derive(Clone, Debug)]
pub struct BusClientConfig {
    /// Router WebSocket address.
    pub address: String,
    /// Realm to join.
    pub realm: String,
    /// Challenge-response credentials.
    pub credential: Credential,
    /// Reconnect policy handed to the transport.
    pub retry: RetryPolicy,
}

impl BusClientConfig {
    /// Creates a new [`BusClientConfig`] instance with the default retry policy.
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        realm: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            address: address.into(),
            realm: realm.into(),
            credential,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the authentication id presented to the router.
    #[must_use]
    pub fn auth_id(&self) -> &str {
        self.credential.auth_id()
    }

    /// Signs a router challenge with the stored secret.
    ///
    /// Transports call this when the router issues its CRA challenge;
    /// challenge-response is the only authentication method offered.
    #[must_use]
    pub fn sign_challenge(&self, challenge: &str) -> String {
        self.credential.sign_challenge(challenge)
    }

    /// Resolves the configuration from the deployment environment.
    ///
    /// The device serial doubles as auth id and secret, as provisioned on
    /// deployment. The router address is derived from the portal origin when
    /// set, falling back to the primary production endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if any required identifier is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let deployment_key = require_env(ENV_DEPLOYMENT_KEY)?;
        let app_key = require_env(ENV_APP_KEY)?;
        let environment = require_env(ENV_ENVIRONMENT)?;
        let device_serial = require_env(ENV_DEVICE_SERIAL)?;
        let portal_url = std::env::var(ENV_PORTAL_URL).ok();

        let address = ws_url_for_portal(portal_url.as_deref()).to_string();
        let realm = compose_realm(&deployment_key, &app_key, &environment);
        let credential = Credential::new(device_serial.clone(), device_serial);

        Ok(Self::new(address, realm, credential))
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingEnvVar(name))
}
