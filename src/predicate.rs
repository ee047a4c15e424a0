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
//! The `GeoIP` route predicate.
//!
//! ```text
//! // requests from Germany
//! de: GeoIP("DE") -> "https://de.example.org";
//! // several countries, any case
//! eu: GeoIP("de", "se", "fr", "ch") -> "https://eu.example.org";
//! // lookup failures and unmapped addresses
//! unknown: GeoIP("UNKNOWN") -> "https://intl.example.org";
//! // use the last X-Forwarded-For entry
//! edge: GeoIP("from_last=true", "nl") -> "https://nl.example.org";
//! ```
//!
//! The plugin is loaded with a `db=/path/to/GeoLite2-Country.mmdb` option
//! pointing at a MaxMind country or city database.

use crate::config::{PluginOptions, PredicateConfig};
use crate::database::{CountryLookup, GeoIpDatabase};
use crate::error::{LookupError, Result};
use crate::net;
use crate::routing::{Predicate, PredicateSpec};
use http::Request;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

pub const PREDICATE_NAME: &str = "GeoIP";

/// Country assigned when the client address cannot be mapped.
pub const UNKNOWN_COUNTRY: &str = "UNKNOWN";

/// Factory for `GeoIP` predicates. Holds the database shared by all routes.
#[derive(Clone)]
pub struct GeoIpSpec {
    db: Arc<dyn CountryLookup>,
}

impl GeoIpSpec {
    /// Parses load-time options and opens the database they name.
    pub fn init<S: AsRef<str>>(opts: &[S]) -> Result<Self> {
        let options = PluginOptions::parse(opts)?;
        let db = GeoIpDatabase::open(&options.db)?;
        Ok(Self::with_database(Arc::new(db)))
    }

    pub fn with_database(db: Arc<dyn CountryLookup>) -> Self {
        Self { db }
    }

    /// Same as [`PredicateSpec::create`], without boxing.
    pub fn create_predicate(&self, args: &[Value]) -> Result<GeoIpPredicate> {
        let config = PredicateConfig::from_args(args)?;
        debug!(
            "geoip: created predicate for {:?} (from_last={})",
            config.countries, config.from_last
        );
        Ok(GeoIpPredicate {
            db: Arc::clone(&self.db),
            config,
        })
    }
}

impl PredicateSpec for GeoIpSpec {
    fn name(&self) -> &str {
        PREDICATE_NAME
    }

    fn create(&self, args: &[Value]) -> Result<Box<dyn Predicate>> {
        Ok(Box::new(self.create_predicate(args)?))
    }
}

pub struct GeoIpPredicate {
    db: Arc<dyn CountryLookup>,
    config: PredicateConfig,
}

impl GeoIpPredicate {
    pub fn countries(&self) -> &HashSet<String> {
        &self.config.countries
    }

    pub fn from_last(&self) -> bool {
        self.config.from_last
    }

    /// Resolves the request's country, `UNKNOWN` when it cannot be
    /// determined. Lookup failures are logged, never returned.
    pub fn country<B>(&self, req: &Request<B>) -> String {
        let src = if self.config.from_last {
            net::remote_host_from_last(req)
        } else {
            net::remote_host(req)
        };

        let lookup = src
            .ok_or(LookupError::MissingAddress)
            .and_then(|addr| self.db.country_code(addr));
        let code = match lookup {
            Ok(code) => code,
            Err(err) => {
                warn!("geoip(): failed to lookup {}: {}", display_addr(src), err);
                None
            }
        };

        match code {
            Some(code) if !code.is_empty() => code.to_uppercase(),
            _ => UNKNOWN_COUNTRY.to_string(),
        }
    }
}

impl Predicate for GeoIpPredicate {
    fn matches(&self, req: &Request<()>) -> bool {
        let country = self.country(req);
        let matched = self.config.countries.contains(&country);
        debug!("geoip: country {} matched={}", country, matched);
        matched
    }
}

fn display_addr(addr: Option<std::net::IpAddr>) -> String {
    addr.map(|a| a.to_string()).unwrap_or_else(|| "<none>".to_string())
}
