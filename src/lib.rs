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
//! GeoIP route predicate for API gateways.
//!
//! Matches a request when the country of its client address, looked up in a
//! MaxMind database, is one of the countries configured on the route.
//! Addresses that cannot be mapped belong to the `UNKNOWN` country.
//!
//! ```no_run
//! use geoip_predicate::{init_predicate, PredicateSpec};
//! use serde_json::json;
//!
//! # fn main() -> geoip_predicate::Result<()> {
//! let spec = init_predicate(&["db=/var/lib/GeoIP/GeoLite2-Country.mmdb"])?;
//! let predicate = spec.create(&[json!("de"), json!("at"), json!("ch")])?;
//! # let _ = predicate;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod net;
pub mod predicate;
pub mod routing;

#[cfg(target_arch = "wasm32")]
mod plugin;

pub use config::{HostConfig, PluginOptions, PredicateConfig};
pub use database::{CountryLookup, DatabaseMetadata, GeoIpDatabase};
pub use error::{Error, LookupError, Result};
pub use net::RemoteAddr;
pub use predicate::{GeoIpPredicate, GeoIpSpec, PREDICATE_NAME, UNKNOWN_COUNTRY};
pub use routing::{Predicate, PredicateSpec};

/// Plugin entry point: parses the load-time options and opens the database.
pub fn init_predicate<S: AsRef<str>>(opts: &[S]) -> Result<GeoIpSpec> {
    GeoIpSpec::init(opts)
}
