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

//! Router credential storage and challenge-response signing.

use core::fmt::Debug;

use base64::prelude::*;
use ring::hmac;
use zeroize::ZeroizeOnDrop;

/// Credentials for challenge-response (CRA) authentication against a router.
///
/// The router sends a challenge nonce during the handshake and the client
/// proves identity by returning an HMAC-SHA256 signature over it, keyed by the
/// shared secret. The secret itself never travels over the wire.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Credential {
    #[zeroize(skip)]
    auth_id: Box<str>,
    secret: Box<[u8]>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Credential))
            .field("auth_id", &self.masked_auth_id())
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Creates a new [`Credential`] instance from the auth id and shared secret.
    #[must_use]
    pub fn new(auth_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            auth_id: auth_id.into().into_boxed_str(),
            secret: secret.into().into_bytes().into_boxed_slice(),
        }
    }

    /// Returns the authentication id presented to the router.
    #[must_use]
    pub fn auth_id(&self) -> &str {
        &self.auth_id
    }

    /// Returns a masked version of the auth id for logging purposes.
    ///
    /// Shows first 4 and last 4 characters with ellipsis in between.
    /// For ids shorter than 8 characters, shows asterisks only.
    #[must_use]
    pub fn masked_auth_id(&self) -> String {
        let id = self.auth_id.as_ref();
        let len = id.len();

        if len <= 8 {
            "*".repeat(len)
        } else {
            format!("{}...{}", &id[..4], &id[len - 4..])
        }
    }

    /// Signs a router challenge with HMAC-SHA256 and returns the base64 digest.
    #[must_use]
    pub fn sign_challenge(&self, challenge: &str) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.secret);
        let tag = hmac::sign(&key, challenge.as_bytes());
        BASE64_STANDARD.encode(tag.as_ref())
    }
}
