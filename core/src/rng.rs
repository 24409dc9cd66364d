//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through ComponentRng instances derived
//! from the single master seed of the run.
//!
//! Each component gets its own RNG stream, seeded deterministically
//! from (master_seed, stream_index). This means:
//!   - Adding a new component never changes existing components' streams.
//!   - Each component's stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single simulation component.
pub struct ComponentRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl ComponentRng {
    /// Create a component RNG from the master seed and a stable
    /// stream index. The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// All component RNGs for a single run, derived from one master seed.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_component(&self, slot: ComponentSlot) -> ComponentRng {
        ComponentRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }

    /// Stream for the n-th agent within a slot. The agent ordinal is
    /// packed into the high bits so agent streams never collide with
    /// component streams or each other.
    pub fn for_agent(&self, slot: ComponentSlot, agent_index: usize) -> ComponentRng {
        let stream = (slot as u64) | ((agent_index as u64 + 1) << 8);
        ComponentRng::new(self.master_seed, stream).with_name(slot.name())
    }
}

/// Stable component slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every component's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum ComponentSlot {
    Market = 0,
    Customer = 1,
    TariffSelection = 2,
    // Add new components here, append only.
}

impl ComponentSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Customer => "customer",
            Self::TariffSelection => "tariff_selection",
        }
    }
}
