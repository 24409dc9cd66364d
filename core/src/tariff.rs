//! Tariff records as seen by the subscription core.
//!
//! Tariffs are published and owned by the market component; this core
//! references them by id. State transitions (Active → Revoked,
//! Active → Killed) are performed exclusively by the market.

use crate::types::{TariffId, Tick};
use serde::{Deserialize, Serialize};

/// Power-type classification of tariffs and customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerType {
    Consumption,
    Production,
    Storage,
}

/// Lifecycle state of a published tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffState {
    Active,
    Revoked,
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tariff {
    pub id:           TariffId,
    pub broker:       String,
    pub power_type:   PowerType,
    pub state:        TariffState,
    /// Minimum subscription duration, in ticks.
    pub min_duration: Tick,
    /// Tick at which the tariff expires.
    pub expiration:   Tick,
    /// Published price per kWh. Carried as data only; no price
    /// computation happens in this core.
    pub rate:         f64,
}

impl Tariff {
    pub fn is_active(&self) -> bool {
        self.state == TariffState::Active
    }

    /// Revoked or killed; either way, subscribers must be migrated.
    pub fn is_revoked(&self) -> bool {
        matches!(self.state, TariffState::Revoked | TariffState::Killed)
    }
}
