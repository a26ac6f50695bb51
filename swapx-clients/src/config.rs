//! Startup configuration: contract addresses, wallet-connector credential and
//! the expected network.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use swapx_core::slippage_config::SlippageTolerance;

pub const POOL_ADDRESS_VAR: &str = "SWAPX_POOL_ADDRESS";
pub const TOKEN_ADDRESS_VAR: &str = "SWAPX_TOKEN_ADDRESS";
pub const PROJECT_ID_VAR: &str = "SWAPX_WALLETCONNECT_PROJECT_ID";
pub const CHAIN_ID_VAR: &str = "SWAPX_CHAIN_ID";
pub const SLIPPAGE_VAR: &str = "SWAPX_SLIPPAGE_BPS";

/// Network the client knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedChain {
  pub id: u64,
  pub name: &'static str,
}

pub const SEPOLIA: SupportedChain = SupportedChain {
  id: 11_155_111,
  name: "Sepolia",
};

pub const MAINNET: SupportedChain = SupportedChain {
  id: 1,
  name: "Ethereum",
};

pub const SUPPORTED_CHAINS: &[SupportedChain] = &[SEPOLIA, MAINNET];

/// Display name for a chain id, falling back to the numeric id.
#[must_use]
pub fn chain_name(id: u64) -> String {
  SUPPORTED_CHAINS
    .iter()
    .find(|chain| chain.id == id)
    .map_or_else(|| format!("chain {id}"), |chain| chain.name.to_string())
}

fn default_chain_id() -> u64 {
  SEPOLIA.id
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
  pub pool_address: Address,
  pub token_address: Address,
  #[serde(default)]
  pub wallet_connect_project_id: Option<String>,
  #[serde(default = "default_chain_id")]
  pub expected_chain_id: u64,
  #[serde(default, rename = "default_slippage_bps")]
  pub default_slippage: SlippageTolerance,
}

impl ClientConfig {
  #[must_use]
  pub fn new(pool_address: Address, token_address: Address) -> ClientConfig {
    ClientConfig {
      pool_address,
      token_address,
      wallet_connect_project_id: None,
      expected_chain_id: default_chain_id(),
      default_slippage: SlippageTolerance::default(),
    }
  }

  /// Reads configuration from `SWAPX_*` environment variables.
  ///
  /// # Errors
  /// * Missing or malformed contract address
  /// * Malformed chain id or slippage
  pub fn from_env() -> Result<ClientConfig> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Reads configuration through an arbitrary key lookup.
  ///
  /// # Errors
  /// * Missing or malformed contract address
  /// * Malformed chain id or slippage
  pub fn from_lookup<F>(lookup: F) -> Result<ClientConfig>
  where
    F: Fn(&str) -> Option<String>,
  {
    let address = |key: &str| -> Result<Address> {
      let raw = lookup(key).ok_or_else(|| anyhow!("{key} is not set"))?;
      Address::from_str(raw.trim())
        .with_context(|| format!("{key} is not a valid address: {raw}"))
    };
    let pool_address = address(POOL_ADDRESS_VAR)?;
    let token_address = address(TOKEN_ADDRESS_VAR)?;
    let expected_chain_id = match lookup(CHAIN_ID_VAR) {
      Some(raw) => raw
        .trim()
        .parse()
        .with_context(|| format!("{CHAIN_ID_VAR} is not a chain id: {raw}"))?,
      None => default_chain_id(),
    };
    let default_slippage = match lookup(SLIPPAGE_VAR) {
      Some(raw) => {
        let bps: u64 = raw
          .trim()
          .parse()
          .with_context(|| format!("{SLIPPAGE_VAR} is not a number: {raw}"))?;
        SlippageTolerance::from_bps(bps)?
      }
      None => SlippageTolerance::default(),
    };
    Ok(ClientConfig {
      pool_address,
      token_address,
      wallet_connect_project_id: lookup(PROJECT_ID_VAR)
        .filter(|id| !id.trim().is_empty()),
      expected_chain_id,
      default_slippage,
    })
  }

  /// Parses a TOML document.
  ///
  /// # Errors
  /// * Invalid TOML or field values
  pub fn from_toml_str(document: &str) -> Result<ClientConfig> {
    toml::from_str(document).context("Failed to parse client config")
  }

  /// Loads a TOML config file.
  ///
  /// # Errors
  /// * File IO
  /// * Invalid TOML or field values
  pub fn load(path: &Path) -> Result<ClientConfig> {
    let document = fs::read_to_string(path)
      .with_context(|| format!("Failed to read config: {}", path.display()))?;
    Self::from_toml_str(&document)
  }

  #[must_use]
  pub fn expected_chain_name(&self) -> String {
    chain_name(self.expected_chain_id)
  }
}
