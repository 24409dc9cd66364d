//! Events surfaced by the engine as the run progresses.
//!
//! Variants are added as behavior grows, never removed or reordered.

use crate::types::{CustomerId, RunId, TariffId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },

    // ── Subscription lifecycle events ──────────────
    DefaultEnrolled {
        tick: Tick,
        customer: CustomerId,
        tariff: TariffId,
        count: u32,
    },
    TariffSwitched {
        tick: Tick,
        customer: CustomerId,
        from: TariffId,
        to: TariffId,
        count: u32,
    },
    RevocationHandled {
        tick: Tick,
        customer: CustomerId,
        from: TariffId,
        to: TariffId,
        count: u32,
    },
}
