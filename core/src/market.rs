//! Market access: the boundary between the subscription core and the
//! tariff market.
//!
//! The market owns tariff publication, pricing and lifecycle; this
//! core consumes it through the narrow [`TariffMarket`] trait. The
//! in-memory [`SimTariffMarket`] is the implementation used by the
//! runner and by tests.

use crate::error::{SimError, SimResult};
use crate::registry::SubscriptionRegistry;
use crate::subscription::Subscription;
use crate::tariff::{PowerType, Tariff, TariffState};
use crate::types::{CustomerId, TariffId, Tick};
use crate::customer::CustomerInfo;
use std::collections::HashMap;

/// Synchronous market operations consumed by customer agents.
/// No retry contract is placed on this core; transport failures are
/// the market component's concern.
pub trait TariffMarket {
    /// The default tariff for a power type, if one has been designated.
    fn default_tariff(&self, power_type: PowerType) -> Option<Tariff>;

    /// All currently active tariffs of the given power type, in stable
    /// id order.
    fn active_tariff_list(&self, power_type: PowerType) -> Vec<Tariff>;

    /// Power-type classification of a published tariff, if known.
    fn tariff_power_type(&self, tariff: TariffId) -> Option<PowerType>;

    /// Subscribe `count` members of the customer's population to the
    /// tariff. Accumulates onto the existing registry entry for the
    /// pair if one is live; otherwise creates it. Returns a copy of
    /// the resulting subscription.
    fn subscribe_to_tariff(
        &mut self,
        registry: &mut SubscriptionRegistry,
        tariff: TariffId,
        customer: &CustomerInfo,
        count: u32,
    ) -> SimResult<Subscription>;

    /// The customer's live subscriptions whose tariff has been revoked
    /// or killed.
    fn revoked_subscriptions(
        &self,
        registry: &SubscriptionRegistry,
        customer: CustomerId,
    ) -> Vec<Subscription>;

    /// Migrate a revoked subscription's population onto the revoked
    /// tariff's designated successor, or failing that the power type's
    /// default tariff. Returns a copy of the replacement subscription.
    fn handle_revoked(
        &mut self,
        registry: &mut SubscriptionRegistry,
        subscription: &Subscription,
    ) -> SimResult<Subscription>;
}

/// In-memory tariff market: tariff table, per-power-type defaults and
/// revocation successor designations.
#[derive(Debug, Default)]
pub struct SimTariffMarket {
    tariffs:    HashMap<TariffId, Tariff>,
    defaults:   HashMap<PowerType, TariffId>,
    successors: HashMap<TariffId, TariffId>,
    /// Gross signup count per tariff, the market's own bookkeeping.
    signups:    HashMap<TariffId, u64>,
    next_id:    u64,
}

impl SimTariffMarket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new active tariff and return its id.
    pub fn publish(
        &mut self,
        broker: &str,
        power_type: PowerType,
        rate: f64,
        min_duration: Tick,
        expiration: Tick,
    ) -> TariffId {
        self.next_id += 1;
        let id = TariffId(self.next_id);
        self.tariffs.insert(
            id,
            Tariff {
                id,
                broker: broker.to_string(),
                power_type,
                state: TariffState::Active,
                min_duration,
                expiration,
                rate,
            },
        );
        log::debug!("market: published {id} ({power_type:?}) by {broker}");
        id
    }

    /// Publish a tariff and designate it as the power type's default.
    pub fn publish_default(
        &mut self,
        broker: &str,
        power_type: PowerType,
        rate: f64,
        min_duration: Tick,
        expiration: Tick,
    ) -> TariffId {
        let id = self.publish(broker, power_type, rate, min_duration, expiration);
        self.defaults.insert(power_type, id);
        id
    }

    pub fn tariff(&self, id: TariffId) -> Option<&Tariff> {
        self.tariffs.get(&id)
    }

    /// Revoke an active tariff, optionally designating a successor
    /// that its subscribers are migrated onto.
    pub fn revoke(&mut self, id: TariffId, successor: Option<TariffId>) -> SimResult<()> {
        let tariff = self
            .tariffs
            .get_mut(&id)
            .ok_or(SimError::TariffNotFound { tariff: id })?;
        tariff.state = TariffState::Revoked;
        if let Some(succ) = successor {
            self.successors.insert(id, succ);
        }
        log::info!("market: revoked {id}, successor {successor:?}");
        Ok(())
    }

    /// Kill a tariff outright. Subscribers are migrated the same way
    /// as for a revocation, minus any successor designation.
    pub fn kill(&mut self, id: TariffId) -> SimResult<()> {
        let tariff = self
            .tariffs
            .get_mut(&id)
            .ok_or(SimError::TariffNotFound { tariff: id })?;
        tariff.state = TariffState::Killed;
        log::info!("market: killed {id}");
        Ok(())
    }

    /// Gross population ever subscribed to the tariff.
    pub fn total_signups(&self, id: TariffId) -> u64 {
        self.signups.get(&id).copied().unwrap_or(0)
    }
}

impl TariffMarket for SimTariffMarket {
    fn default_tariff(&self, power_type: PowerType) -> Option<Tariff> {
        self.defaults
            .get(&power_type)
            .and_then(|id| self.tariffs.get(id))
            .cloned()
    }

    fn active_tariff_list(&self, power_type: PowerType) -> Vec<Tariff> {
        let mut active: Vec<Tariff> = self
            .tariffs
            .values()
            .filter(|t| t.power_type == power_type && t.is_active())
            .cloned()
            .collect();
        // Stable order: map iteration order must never leak into
        // selection behavior.
        active.sort_by_key(|t| t.id);
        active
    }

    fn tariff_power_type(&self, tariff: TariffId) -> Option<PowerType> {
        self.tariffs.get(&tariff).map(|t| t.power_type)
    }

    fn subscribe_to_tariff(
        &mut self,
        registry: &mut SubscriptionRegistry,
        tariff: TariffId,
        customer: &CustomerInfo,
        count: u32,
    ) -> SimResult<Subscription> {
        if !self.tariffs.contains_key(&tariff) {
            return Err(SimError::TariffNotFound { tariff });
        }
        let subscription = registry.get_or_create(customer.id, tariff);
        subscription.subscribe(count);
        *self.signups.entry(tariff).or_insert(0) += count as u64;
        Ok(subscription.clone())
    }

    fn revoked_subscriptions(
        &self,
        registry: &SubscriptionRegistry,
        customer: CustomerId,
    ) -> Vec<Subscription> {
        registry
            .find_by_customer(customer)
            .into_iter()
            .filter(|s| {
                self.tariffs
                    .get(&s.tariff())
                    .is_some_and(|t| t.is_revoked())
            })
            .collect()
    }

    fn handle_revoked(
        &mut self,
        registry: &mut SubscriptionRegistry,
        subscription: &Subscription,
    ) -> SimResult<Subscription> {
        let revoked = subscription.tariff();
        let power_type = self
            .tariffs
            .get(&revoked)
            .ok_or(SimError::TariffNotFound { tariff: revoked })?
            .power_type;

        let replacement = self
            .successors
            .get(&revoked)
            .copied()
            .filter(|succ| self.tariffs.get(succ).is_some_and(|t| t.is_active()))
            .or_else(|| {
                self.defaults
                    .get(&power_type)
                    .copied()
                    .filter(|d| *d != revoked)
            })
            .ok_or(SimError::NoReplacementTariff { tariff: revoked })?;

        let count = subscription.customers_committed();
        let replacement_sub = registry.get_or_create(subscription.customer(), replacement);
        replacement_sub.subscribe(count);
        *self.signups.entry(replacement).or_insert(0) += count as u64;
        Ok(replacement_sub.clone())
    }
}
