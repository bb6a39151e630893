//! Exchange configuration.
//!
//! Defaults mirror the production seed values: new accounts start with
//! 20 points and a credit score of 80; the honor badge needs 85.

use crate::error::ExchangeResult;
use crate::types::Points;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Points granted to every newly registered account.
    pub seed_balance: Points,
    /// Credit score granted to every newly registered account.
    pub seed_credit_score: i64,
    /// Accounts at or above this credit score carry the honor flag.
    pub honor_threshold: i64,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            seed_balance: 20,
            seed_credit_score: 80,
            honor_threshold: 85,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl ExchangeConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &str) -> ExchangeResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {path}: {e}"))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn default_page(&self) -> crate::types::PageRequest {
        crate::types::PageRequest::first(self.default_page_size)
    }
}
