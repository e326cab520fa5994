//! TOML-backed adapter registry options, one section per network.
//!
//! ```toml
//! [avalanche]
//! adapter_whitelist = ["UnilikeAdapter", "SaddleAdapter", "GmxAdapter"]
//! minimal_adapter_whitelist = ["UnilikeAdapter"]
//! hop_tokens = ["0xb31f66aa3c1e785363f0875a1b74e27b85fd66c7"]
//! wnative = "0xb31f66aa3c1e785363f0875a1b74e27b85fd66c7"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ConfigError, ConfigResult};
use crate::traits::Adapter;

/// Registry options for every configured network, keyed by network name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployOptions {
    networks: BTreeMap<String, NetworkOptions>,
}

impl DeployOptions {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Parse`] on malformed TOML or unknown fields.
    /// - [`ConfigError::InvalidValue`] if any network fails
    ///   [`NetworkOptions::validate`].
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let options: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        for (name, network) in &options.networks {
            network.validate().map_err(|e| match e {
                ConfigError::InvalidValue { field, message } => {
                    ConfigError::invalid(format!("{name}.{field}"), message)
                }
                other => other,
            })?;
        }
        debug!(networks = options.networks.len(), "deploy options loaded");
        Ok(options)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::FileRead`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Options for one network.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownNetwork`] if there is no such section.
    pub fn network(&self, name: &str) -> ConfigResult<&NetworkOptions> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    /// Configured network names, sorted.
    pub fn networks(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }
}

/// Registry options for a single network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkOptions {
    /// Adapter names to register, in router order.
    pub adapter_whitelist: Vec<String>,
    /// Reduced adapter set for lightweight deployments.
    #[serde(default)]
    pub minimal_adapter_whitelist: Option<Vec<String>>,
    /// Tokens a router may route through.
    #[serde(default)]
    pub hop_tokens: Vec<Address>,
    /// Wrapped native token.
    pub wnative: Address,
}

impl NetworkOptions {
    /// Checks the table's invariants.
    ///
    /// Minimal-whitelist entries absent from the full whitelist are only
    /// logged: such adapters are not deployed on the network and
    /// [`select_minimal_adapters`](Self::select_minimal_adapters) skips them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - the whitelist is empty or names an adapter twice;
    /// - a hop token is listed twice;
    /// - hop tokens are declared but `wnative` is not among them.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.adapter_whitelist.is_empty() {
            return Err(ConfigError::invalid("adapter_whitelist", "must not be empty"));
        }
        let mut seen = BTreeSet::new();
        if let Some(dup) = self.adapter_whitelist.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(ConfigError::invalid(
                "adapter_whitelist",
                format!("duplicate adapter {dup}"),
            ));
        }
        for stray in self
            .minimal_whitelist()
            .iter()
            .filter(|n| !seen.contains(n.as_str()))
        {
            warn!(adapter = %stray, "minimal whitelist entry not in adapter_whitelist");
        }
        let mut hops = BTreeSet::new();
        if let Some(dup) = self.hop_tokens.iter().find(|t| !hops.insert(**t)) {
            return Err(ConfigError::invalid(
                "hop_tokens",
                format!("duplicate hop token {dup}"),
            ));
        }
        if !hops.is_empty() && !hops.contains(&self.wnative) {
            return Err(ConfigError::invalid(
                "wnative",
                "must be one of the hop tokens",
            ));
        }
        Ok(())
    }

    /// Whether `name` is in the full whitelist.
    #[must_use]
    pub fn is_whitelisted(&self, name: &str) -> bool {
        self.adapter_whitelist.iter().any(|n| n == name)
    }

    /// The minimal whitelist, or the full one when none is declared.
    #[must_use]
    pub fn minimal_whitelist(&self) -> &[String] {
        self.minimal_adapter_whitelist
            .as_deref()
            .unwrap_or(&self.adapter_whitelist)
    }

    /// Whether `token` may serve as an intermediate hop.
    #[must_use]
    pub fn is_hop_token(&self, token: Address) -> bool {
        self.hop_tokens.contains(&token)
    }

    /// Picks the whitelisted adapters out of `adapters`, in whitelist order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a whitelisted name has no
    /// matching adapter.
    pub fn select_adapters<'a, A: Adapter>(&self, adapters: &'a [A]) -> ConfigResult<Vec<&'a A>> {
        select(&self.adapter_whitelist, adapters)
    }

    /// As [`select_adapters`](Self::select_adapters), over the minimal
    /// whitelist.  Entries outside the full whitelist are skipped.
    ///
    /// # Errors
    ///
    /// As [`select_adapters`](Self::select_adapters).
    pub fn select_minimal_adapters<'a, A: Adapter>(
        &self,
        adapters: &'a [A],
    ) -> ConfigResult<Vec<&'a A>> {
        select(
            self.minimal_whitelist()
                .iter()
                .filter(|name| self.is_whitelisted(name)),
            adapters,
        )
    }
}

fn select<'a, 'n, A: Adapter>(
    names: impl IntoIterator<Item = &'n String>,
    adapters: &'a [A],
) -> ConfigResult<Vec<&'a A>> {
    names
        .into_iter()
        .map(|name| {
            adapters
                .iter()
                .find(|a| a.name() == name.as_str())
                .ok_or_else(|| {
                    ConfigError::invalid("adapter_whitelist", format!("no adapter named {name}"))
                })
        })
        .collect()
}
