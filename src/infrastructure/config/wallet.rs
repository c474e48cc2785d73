//! Wallet pool configuration.
//!
//! Addresses live in the config file. Signing keys are read from the
//! `WALLET_KEYS` environment variable as comma-separated `id:secret` pairs
//! and never come from the config file.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{
    id::WalletId,
    wallet::{SigningKey, WalletEntry},
};
use crate::error::{ConfigError, Result};

/// Environment variable holding wallet signing keys.
pub const WALLET_KEYS_ENV: &str = "WALLET_KEYS";

/// One `[[wallets]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub id: String,
    pub address: String,
}

/// Parse `id:secret,id:secret`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for an entry without a separator or
/// with an empty id or secret.
pub fn parse_wallet_keys(raw: &str) -> Result<HashMap<String, SigningKey>> {
    let mut keys = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((id, secret)) = entry.split_once(':') else {
            return Err(ConfigError::InvalidValue {
                field: WALLET_KEYS_ENV,
                reason: "entries must be id:secret".to_string(),
            }
            .into());
        };
        let (id, secret) = (id.trim(), secret.trim());
        if id.is_empty() || secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: WALLET_KEYS_ENV,
                reason: "wallet id and secret must not be empty".to_string(),
            }
            .into());
        }
        keys.insert(id.to_string(), SigningKey::new(secret));
    }
    Ok(keys)
}

/// Build pool entries, attaching keys by wallet id.
#[must_use]
pub fn wallet_entries(
    wallets: &[WalletConfig],
    keys: &HashMap<String, SigningKey>,
) -> Vec<WalletEntry> {
    wallets
        .iter()
        .map(|w| {
            WalletEntry::new(
                WalletId::new(w.id.as_str()),
                w.address.as_str(),
                keys.get(&w.id).cloned(),
            )
        })
        .collect()
}
