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

//! Known router endpoints and portal URL resolution.

/// Primary production router WebSocket endpoint.
pub const SWARMBUS_WS_URL: &str = "wss://bus.swarmbus.io/ws";

/// Legacy production router WebSocket endpoint, kept for deployments pinned to
/// the old portal domain.
pub const SWARMBUS_WS_LEGACY_URL: &str = "wss://bus.legacy.swarmbus.io/ws";

/// Local development router WebSocket endpoint.
pub const SWARMBUS_WS_LOCAL_URL: &str = "ws://localhost:8080/ws";

// Portal origins recognized by the resolver
pub const SWARMBUS_PORTAL_URL: &str = "https://portal.swarmbus.io";
pub const SWARMBUS_PORTAL_LEGACY_URL: &str = "https://portal.legacy.swarmbus.io";
pub const SWARMBUS_PORTAL_LOCAL_URL: &str = "http://localhost:8085";

/// Returns the router WebSocket URL for the given portal origin.
///
/// Deployments are provisioned with the portal URL they were created from;
/// the router address is derived from it. `None` or an unrecognized origin
/// resolves to the primary production endpoint.
#[must_use]
pub fn ws_url_for_portal(portal_url: Option<&str>) -> &'static str {
    match portal_url {
        Some(SWARMBUS_PORTAL_URL) => SWARMBUS_WS_URL,
        Some(SWARMBUS_PORTAL_LEGACY_URL) => SWARMBUS_WS_LEGACY_URL,
        Some(SWARMBUS_PORTAL_LOCAL_URL) => SWARMBUS_WS_LOCAL_URL,
        _ => SWARMBUS_WS_URL,
    }
}
