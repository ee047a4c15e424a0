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
//! Read-only access to the geolocation database.

use crate::error::{Error, LookupError, Result};
use log::info;
use maxminddb::{geoip2, MaxMindDBError, Reader};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Resolves an address to the ISO code of its country.
///
/// Implementations are opened once and then shared by every predicate, so
/// lookups take `&self` and must be safe to run from many threads at once.
pub trait CountryLookup: Send + Sync {
    /// Returns `Ok(None)` when the address has a record but the record carries
    /// no country, e.g. for ranges mapped only to a continent.
    fn country_code(&self, addr: IpAddr) -> std::result::Result<Option<String>, LookupError>;
}

/// Facts about an opened database, logged once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseMetadata {
    pub database_type: String,
    pub ip_version: u16,
    pub build_epoch: u64,
}

/// A MaxMind GeoIP2/GeoLite2 country or city database held in memory.
pub struct GeoIpDatabase {
    path: PathBuf,
    reader: Reader<Vec<u8>>,
}

impl GeoIpDatabase {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = Reader::open_readfile(&path).map_err(|source| Error::OpenDatabase {
            path: path.clone(),
            source,
        })?;
        let db = Self { path, reader };
        let metadata = db.metadata();
        info!(
            "geoip: loaded {} (type {}, IPv{}, built {})",
            db.path.display(),
            metadata.database_type,
            metadata.ip_version,
            metadata.build_epoch
        );
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> DatabaseMetadata {
        DatabaseMetadata {
            database_type: self.reader.metadata.database_type.clone(),
            ip_version: self.reader.metadata.ip_version,
            build_epoch: self.reader.metadata.build_epoch,
        }
    }
}

impl CountryLookup for GeoIpDatabase {
    fn country_code(&self, addr: IpAddr) -> std::result::Result<Option<String>, LookupError> {
        // The country section has the same shape in country and city databases.
        match self.reader.lookup::<geoip2::Country>(addr) {
            Ok(record) => Ok(record
                .country
                .and_then(|c| c.iso_code)
                .map(str::to_string)),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Err(LookupError::NotFound(addr)),
            Err(source) => Err(LookupError::Database { addr, source }),
        }
    }
}

impl std::fmt::Debug for GeoIpDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoIpDatabase")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Built by `testdata/make_country_fixture.py`.
    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/country-test.mmdb");

    fn fixture() -> GeoIpDatabase {
        GeoIpDatabase::open(FIXTURE).unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_open_fixture_metadata() {
        let db = fixture();
        assert_eq!(db.path(), Path::new(FIXTURE));
        let metadata = db.metadata();
        assert_eq!(metadata.database_type, "GeoIP2-Country");
        assert_eq!(metadata.ip_version, 4);
        assert_eq!(metadata.build_epoch, 1_767_225_600);
    }

    /// Verifies that:
    /// - The country ISO code is read from the record as stored
    /// - A record without a country section yields no code
    /// - Addresses outside every network are reported as not found
    #[test]
    fn test_country_code_lookup() {
        let db = fixture();
        assert_eq!(db.country_code(ip("81.2.69.142")).unwrap().as_deref(), Some("GB"));
        assert_eq!(db.country_code(ip("89.160.20.128")).unwrap().as_deref(), Some("se"));
        assert_eq!(db.country_code(ip("10.1.2.3")).unwrap(), None);

        for addr in ["8.8.8.8", "81.2.70.1"] {
            match db.country_code(ip(addr)) {
                Err(LookupError::NotFound(missing)) => assert_eq!(missing, ip(addr)),
                other => panic!("expected NotFound for {}, got {:?}", addr, other),
            }
        }
    }

    #[test]
    fn test_open_missing_file() {
        let err = GeoIpDatabase::open("/nonexistent/GeoLite2-Country.mmdb").unwrap_err();
        match err {
            Error::OpenDatabase { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/GeoLite2-Country.mmdb"))
            }
            other => panic!("expected OpenDatabase, got {:?}", other),
        }
    }

    #[test]
    fn test_open_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a maxmind database").unwrap();
        file.flush().unwrap();

        let err = GeoIpDatabase::open(file.path()).unwrap_err();
        assert!(matches!(err, Error::OpenDatabase { .. }));
        assert!(err.to_string().starts_with("failed to open db "));
    }
}
