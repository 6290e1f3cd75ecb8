// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optional TOML configuration.
//!
//! Everything here has a working default: with no config file, onyx uses
//! the built-in rule catalog, the default region, and has no sandstorm
//! fleets configured.

use std::collections::BTreeMap;

use anyhow::Context;
use camino::Utf8Path;
use onyx_common::rules::RuleCatalog;
use onyx_core::sandstorm::FleetService;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct OnyxConfig {
    /// Default region, overridden by `--region`.
    pub region: Option<String>,

    /// Extra rule types merged into the built-in catalog.  Built-in names
    /// cannot be redefined.
    #[serde(default)]
    pub rule_types: BTreeMap<String, u16>,

    /// Sandstorm fleets, keyed by environment name.
    #[serde(default)]
    pub sandstorm: BTreeMap<String, Vec<FleetService>>,
}

impl OnyxConfig {
    pub fn load(path: Option<&Utf8Path>) -> Result<OnyxConfig, anyhow::Error> {
        let Some(path) = path else {
            return Ok(OnyxConfig::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        toml::from_str(&raw)
            .with_context(|| format!("parsing config file {path}"))
    }

    pub fn catalog(&self) -> RuleCatalog {
        RuleCatalog::with_extra_entries(
            self.rule_types.iter().map(|(name, port)| (name.clone(), *port)),
        )
    }

    pub fn fleet(&self, env: &str) -> Option<&[FleetService]> {
        self.sandstorm.get(env).map(Vec::as_slice)
    }
}
