//! Tariff selection policies.
//!
//! When a customer must move off a tariff, a policy picks the
//! replacement. Policies are polymorphic over "select one tariff given
//! a power type and the active set"; registry and agent contracts do
//! not change when a smarter policy is plugged in.

use crate::error::{SimError, SimResult};
use crate::market::TariffMarket;
use crate::rng::ComponentRng;
use crate::tariff::{PowerType, Tariff};

pub trait TariffSelectionPolicy {
    /// Choose a replacement tariff of the given power type from the
    /// market's active set.
    fn select(&mut self, market: &dyn TariffMarket, power_type: PowerType) -> SimResult<Tariff>;
}

/// Baseline policy: uniform-random over the active set, excluding the
/// power type's default tariff. Models an indifferent customer,
/// intentionally unweighted by price or quality.
///
/// The default is excluded by filtering, not by redrawing: with zero
/// or one candidate left there is no alternative to pick, and that is
/// reported as an explicit error rather than retried.
pub struct RandomTariffSelector {
    rng: ComponentRng,
}

impl RandomTariffSelector {
    pub fn new(rng: ComponentRng) -> Self {
        Self { rng }
    }
}

impl TariffSelectionPolicy for RandomTariffSelector {
    fn select(&mut self, market: &dyn TariffMarket, power_type: PowerType) -> SimResult<Tariff> {
        let default_id = market.default_tariff(power_type).map(|t| t.id);
        let candidates: Vec<Tariff> = market
            .active_tariff_list(power_type)
            .into_iter()
            .filter(|t| Some(t.id) != default_id)
            .collect();

        if candidates.is_empty() {
            log::warn!("selector: no non-default tariff active for {power_type:?}");
            return Err(SimError::NoAlternativeTariff { power_type });
        }

        let index = self.rng.next_u64_below(candidates.len() as u64) as usize;
        Ok(candidates[index].clone())
    }
}
