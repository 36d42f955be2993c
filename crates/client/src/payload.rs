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

//! Message payload shapes for publish and call operations.

use serde_json::{Map, Value};

/// Payload accepted by publish and call operations.
///
/// The variant is chosen once at the call site and determines how the message
/// is laid out on the wire: structured values travel as keyword arguments,
/// sequences as positional arguments, and bare scalars as a single-element
/// positional list. Receivers observe the same shape, so all three round-trip.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Named arguments, delivered as the keyword payload.
    Keyword(Map<String, Value>),
    /// A sequence, delivered as the positional payload.
    Positional(Vec<Value>),
    /// A bare value, delivered as a single-element positional payload.
    Scalar(Value),
}

impl Payload {
    /// Builds a payload from an arbitrary JSON value.
    ///
    /// Objects become [`Payload::Keyword`], arrays [`Payload::Positional`],
    /// and anything else [`Payload::Scalar`]. Callers forwarding values they
    /// did not construct themselves use this dispatch; callers that know the
    /// shape construct the variant directly.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Keyword(map),
            Value::Array(items) => Self::Positional(items),
            other => Self::Scalar(other),
        }
    }

    /// Splits the payload into wire-level positional and keyword arguments.
    #[must_use]
    pub fn into_wire(self) -> (Vec<Value>, Map<String, Value>) {
        match self {
            Self::Keyword(map) => (Vec::new(), map),
            Self::Positional(items) => (items, Map::new()),
            Self::Scalar(value) => (vec![value], Map::new()),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Vec<Value>> for Payload {
    fn from(items: Vec<Value>) -> Self {
        Self::Positional(items)
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self::Keyword(map)
    }
}

/// Arguments delivered to topic and procedure handlers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Invocation {
    /// Positional arguments.
    pub args: Vec<Value>,
    /// Keyword arguments.
    pub kwargs: Map<String, Value>,
}

impl Invocation {
    /// Creates a new [`Invocation`] instance.
    #[must_use]
    pub fn new(args: Vec<Value>, kwargs: Map<String, Value>) -> Self {
        Self { args, kwargs }
    }

    /// Creates an [`Invocation`] carrying the wire shape of `payload`.
    #[must_use]
    pub fn from_payload(payload: Payload) -> Self {
        let (args, kwargs) = payload.into_wire();
        Self { args, kwargs }
    }
}
