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
use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the plugin or compiling a route.
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing db= parameter for geoip plugin")]
    MissingDatabase,
    #[error("failed to open db {}: {source}", .path.display())]
    OpenDatabase {
        path: PathBuf,
        #[source]
        source: maxminddb::MaxMindDBError,
    },
    #[error("invalid predicate parameters: {0}")]
    InvalidParameters(String),
    #[error("invalid plugin configuration: {0}")]
    InvalidConfiguration(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a request could not be mapped to a country.
///
/// These never fail a request; the predicate logs them and falls back to
/// the `UNKNOWN` country.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("no client address in request")]
    MissingAddress,
    #[error("address {0} not found in database")]
    NotFound(IpAddr),
    #[error("lookup of {addr} failed: {source}")]
    Database {
        addr: IpAddr,
        #[source]
        source: maxminddb::MaxMindDBError,
    },
}
