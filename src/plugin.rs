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
//! proxy-wasm binding. The plugin configuration is a [`HostConfig`]; each
//! request gets the match result in the configured header.

use crate::config::HostConfig;
use crate::net::RemoteAddr;
use crate::predicate::{GeoIpPredicate, GeoIpSpec};
use crate::routing::Predicate;
use http::header::{HeaderName, HeaderValue};
use http::Request;
use log::{error, info};
use proxy_wasm::traits::{Context, HttpContext, RootContext};
use proxy_wasm::types::{Action, ContextType, LogLevel};
use std::net::SocketAddr;
use std::rc::Rc;

const SOURCE_ADDRESS: &[&str] = &["source", "address"];

proxy_wasm::main! {{
    proxy_wasm::set_log_level(LogLevel::Info);
    proxy_wasm::set_root_context(|_| -> Box<dyn RootContext> {
        Box::new(GeoIpRootContext { route: None })
    });
}}

struct Route {
    predicate: GeoIpPredicate,
    header: String,
}

struct GeoIpRootContext {
    route: Option<Rc<Route>>,
}

impl GeoIpRootContext {
    fn configure(&self, bytes: &[u8]) -> crate::Result<Route> {
        let config = HostConfig::from_slice(bytes)?;
        let spec = GeoIpSpec::init(&config.options[..])?;
        let predicate = spec.create_predicate(&config.args)?;
        Ok(Route {
            predicate,
            header: config.header,
        })
    }
}

impl Context for GeoIpRootContext {}

impl RootContext for GeoIpRootContext {
    fn on_configure(&mut self, _: usize) -> bool {
        let Some(bytes) = self.get_plugin_configuration() else {
            error!("geoip: missing plugin configuration");
            return false;
        };
        match self.configure(&bytes) {
            Ok(route) => {
                info!(
                    "geoip: configured {} countries, result in {}",
                    route.predicate.countries().len(),
                    route.header
                );
                self.route = Some(Rc::new(route));
                true
            }
            Err(e) => {
                error!("geoip: {}", e);
                false
            }
        }
    }

    fn create_http_context(&self, _: u32) -> Option<Box<dyn HttpContext>> {
        let route = self.route.clone()?;
        Some(Box::new(GeoIpHttpContext { route }))
    }

    fn get_type(&self) -> Option<ContextType> {
        Some(ContextType::HttpContext)
    }
}

struct GeoIpHttpContext {
    route: Rc<Route>,
}

impl GeoIpHttpContext {
    fn request_head(&self) -> Request<()> {
        let mut req = Request::new(());
        for (name, value) in self.get_http_request_headers() {
            // Pseudo-headers and anything http rejects are not needed here.
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                req.headers_mut().append(name, value);
            }
        }
        let peer = self
            .get_property(SOURCE_ADDRESS.to_vec())
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .and_then(|addr| addr.parse::<SocketAddr>().ok());
        if let Some(addr) = peer {
            req.extensions_mut().insert(RemoteAddr(addr));
        }
        req
    }
}

impl Context for GeoIpHttpContext {}

impl HttpContext for GeoIpHttpContext {
    fn on_http_request_headers(&mut self, _: usize, _: bool) -> Action {
        let req = self.request_head();
        let matched = self.route.predicate.matches(&req);
        self.set_http_request_header(&self.route.header, Some(if matched { "true" } else { "false" }));
        Action::Continue
    }
}
