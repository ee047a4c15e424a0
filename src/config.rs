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
//! Plugin options and route arguments.
//!
//! The host hands the plugin two kinds of configuration:
//!
//! - load-time options, a list of `key=value` strings given once when the
//!   plugin is loaded (`db=/path/to/GeoLite2-Country.mmdb`), and
//! - route arguments, the literals written in a route definition such as
//!   `GeoIP("de", "se", "from_last=true")`.
//!
//! Under a proxy-wasm host both arrive together as one JSON document, see
//! [`HostConfig`].

use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;

const DB_OPTION: &str = "db=";
const FROM_LAST_ARG: &str = "from_last=";
const DEFAULT_MATCH_HEADER: &str = "x-geoip-match";

/// Options recognised when the plugin is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOptions {
    /// Path of the MaxMind country or city database.
    pub db: PathBuf,
}

impl PluginOptions {
    /// Parses the load-time option list. Unknown options are ignored so that
    /// newer hosts can pass options this plugin does not know about.
    pub fn parse<S: AsRef<str>>(opts: &[S]) -> Result<Self> {
        let mut db = None;
        for opt in opts {
            if let Some(path) = opt.as_ref().strip_prefix(DB_OPTION) {
                db = Some(path);
            }
        }
        match db {
            Some(path) if !path.is_empty() => Ok(Self { db: path.into() }),
            _ => Err(Error::MissingDatabase),
        }
    }
}

/// Per-route configuration of one `GeoIP` predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateConfig {
    /// Upper-cased ISO codes, possibly including `UNKNOWN`.
    pub countries: HashSet<String>,
    /// Take the client address from the end of the `X-Forwarded-For` chain.
    pub from_last: bool,
}

impl PredicateConfig {
    /// Builds the configuration from route arguments.
    ///
    /// Strings of the form `from_last=<bool>` set the address selection, any
    /// other string is a country code. Non-string arguments are skipped.
    pub fn from_args(args: &[Value]) -> Result<Self> {
        let mut config = Self::default();
        for arg in args {
            let Value::String(s) = arg else {
                debug!("geoip: ignoring non-string argument {}", arg);
                continue;
            };
            match s.strip_prefix(FROM_LAST_ARG) {
                Some(flag) => {
                    config.from_last = parse_bool(flag).ok_or_else(|| {
                        Error::InvalidParameters(format!("{}{}", FROM_LAST_ARG, flag))
                    })?;
                }
                None => {
                    config.countries.insert(s.to_uppercase());
                }
            }
        }
        Ok(config)
    }
}

/// Plugin configuration supplied by a proxy-wasm host:
///
/// ```json
/// {
///   "options": ["db=/etc/geoip/GeoLite2-Country.mmdb"],
///   "args": ["de", "se", "from_last=true"],
///   "header": "x-geoip-match"
/// }
/// ```
///
/// The match result is written to `header` as `true` or `false` so the
/// route table can select on it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default = "default_match_header")]
    pub header: String,
}

impl HostConfig {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn default_match_header() -> String {
    DEFAULT_MATCH_HEADER.to_string()
}

/// Accepts the same literals as the gateway's route language.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
