// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! The contract between the gateway and a route predicate plugin.
//!
//! The host loads a plugin once and receives a [`PredicateSpec`]. For every
//! route that uses the spec's name it calls [`PredicateSpec::create`] with
//! the route's arguments, then evaluates the returned [`Predicate`] for each
//! request. Requests are evaluated concurrently.

use crate::error::Result;
use http::Request;
use serde_json::Value;

pub trait PredicateSpec: Send + Sync {
    /// Name used in route definitions, e.g. `GeoIP("DE")`.
    fn name(&self) -> &str;

    /// Compiles one route's arguments into a predicate.
    fn create(&self, args: &[Value]) -> Result<Box<dyn Predicate>>;
}

pub trait Predicate: Send + Sync {
    /// Only the request head is consulted.
    fn matches(&self, req: &Request<()>) -> bool;
}
