//! Customer model and per-customer subscription behavior.
//!
//! A customer is a population of a given size, not a simulated person.
//! The agent drives that population's enrollment, tariff switching and
//! revocation recovery against the shared registry. Registry and market
//! are passed in explicitly rather than looked up, so tests wire their
//! own instances.

use crate::error::{SimError, SimResult};
use crate::event::SimEvent;
use crate::market::TariffMarket;
use crate::registry::SubscriptionRegistry;
use crate::selector::TariffSelectionPolicy;
use crate::subscription::Subscription;
use crate::tariff::PowerType;
use crate::types::{CustomerId, TariffId, Tick};
use serde::{Deserialize, Serialize};

/// Static customer specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub id:          CustomerId,
    pub name:        String,
    /// Upper bound on the aggregate commitment per power type.
    pub population:  u32,
    pub power_types: Vec<PowerType>,

    /// >0: max power consumption (fuse limit); <0: min power production.
    pub upper_power_cap:      f64,
    /// >0: min power consumption (refrigerator); <0: max power production.
    pub lower_power_cap:      f64,
    /// >=0, gram CO2 per kWh.
    pub carbon_emission_rate: f64,
    /// How wind changes translate into load / generation changes.
    pub wind_to_power:        f64,
    /// How temperature changes translate into load / generation changes.
    pub temp_to_power:        f64,
    /// How sun intensity changes translate into load / generation changes.
    pub sun_to_power:         f64,
}

impl CustomerInfo {
    pub fn new(id: CustomerId, name: &str, population: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            population,
            power_types: Vec::new(),
            upper_power_cap: 100.0,
            lower_power_cap: 0.0,
            carbon_emission_rate: 0.0,
            wind_to_power: 0.0,
            temp_to_power: 0.0,
            sun_to_power: 0.0,
        }
    }

    pub fn with_power_type(mut self, power_type: PowerType) -> Self {
        self.power_types.push(power_type);
        self
    }
}

/// Per-customer behavior: enrollment, switching, revocation recovery.
pub struct CustomerAgent {
    info:   CustomerInfo,
    policy: Box<dyn TariffSelectionPolicy>,
}

impl CustomerAgent {
    pub fn new(info: CustomerInfo, policy: Box<dyn TariffSelectionPolicy>) -> Self {
        Self { info, policy }
    }

    pub fn id(&self) -> CustomerId {
        self.info.id
    }

    pub fn info(&self) -> &CustomerInfo {
        &self.info
    }

    /// Initial enrollment: subscribe the full population to the default
    /// tariff of every power type the customer participates in. A power
    /// type without a default is skipped; that is not an error, some
    /// types legitimately have none.
    pub fn subscribe_default(
        &mut self,
        market: &mut dyn TariffMarket,
        registry: &mut SubscriptionRegistry,
    ) -> SimResult<()> {
        for power_type in self.info.power_types.clone() {
            match market.default_tariff(power_type) {
                None => {
                    log::info!(
                        "{}: no default tariff for {power_type:?}, skipping",
                        self.info.name
                    );
                }
                Some(default) => {
                    self.subscribe(market, registry, default.id, self.info.population)?;
                    log::info!(
                        "{}: enrolled on default {} ({power_type:?})",
                        self.info.name,
                        default.id
                    );
                }
            }
        }
        Ok(())
    }

    /// Subscribe `count` population members to the tariff and store the
    /// resulting subscription in the registry.
    ///
    /// Panics if the commitment would exceed the customer's population
    /// for the tariff's power type: a bookkeeping bug upstream, not a
    /// recoverable condition.
    pub fn subscribe(
        &mut self,
        market: &mut dyn TariffMarket,
        registry: &mut SubscriptionRegistry,
        tariff: TariffId,
        count: u32,
    ) -> SimResult<()> {
        let power_type = market
            .tariff_power_type(tariff)
            .ok_or(SimError::TariffNotFound { tariff })?;
        let committed = self.committed_for_type(market, registry, power_type);
        assert!(
            committed + count <= self.info.population,
            "{}: committing {count} on top of {committed} exceeds population {}",
            self.info.name,
            self.info.population,
        );

        let subscription = market.subscribe_to_tariff(registry, tariff, &self.info, count)?;
        registry.add(subscription);
        log::info!(
            "{}: subscribed {count} to {tariff}",
            self.info.name
        );
        Ok(())
    }

    /// Release `count` population members from the customer's
    /// subscription to the tariff. When the committed count reaches
    /// zero the subscription is removed from the registry.
    pub fn unsubscribe(
        &mut self,
        registry: &mut SubscriptionRegistry,
        tariff: TariffId,
        count: u32,
    ) -> SimResult<()> {
        let subscription = registry
            .get_mut(self.info.id, tariff)
            .ok_or(SimError::SubscriptionNotFound {
                customer: self.info.id,
                tariff,
            })?;
        subscription.unsubscribe(count);
        let remaining = subscription.customers_committed();
        log::info!(
            "{}: unsubscribed {count} from {tariff}, {remaining} remain",
            self.info.name
        );
        if remaining == 0 {
            registry.remove(self.info.id, tariff);
        }
        Ok(())
    }

    /// Full switch: move the whole committed population off `old_tariff`
    /// onto a tariff chosen by the selection policy.
    pub fn change_subscription(
        &mut self,
        market: &mut dyn TariffMarket,
        registry: &mut SubscriptionRegistry,
        old_tariff: TariffId,
    ) -> SimResult<TariffId> {
        let subscription = self.existing_subscription(registry, old_tariff)?;
        let count = subscription.customers_committed();
        let power_type = market
            .tariff_power_type(old_tariff)
            .ok_or(SimError::TariffNotFound { tariff: old_tariff })?;

        // Pick the replacement before touching the registry so a
        // degenerate active set leaves the old subscription intact.
        let new_tariff = self.policy.select(&*market, power_type)?;

        self.unsubscribe(registry, old_tariff, count)?;
        self.subscribe(market, registry, new_tariff.id, count)?;
        Ok(new_tariff.id)
    }

    /// Full switch to a caller-specified tariff, bypassing the policy.
    pub fn change_subscription_to(
        &mut self,
        market: &mut dyn TariffMarket,
        registry: &mut SubscriptionRegistry,
        old_tariff: TariffId,
        new_tariff: TariffId,
    ) -> SimResult<()> {
        let subscription = self.existing_subscription(registry, old_tariff)?;
        let count = subscription.customers_committed();
        self.unsubscribe(registry, old_tariff, count)?;
        self.subscribe(market, registry, new_tariff, count)
    }

    /// Partial switch: move only `count` of the population to
    /// `new_tariff`, leaving the remainder on `old_tariff`.
    pub fn change_subscription_partial(
        &mut self,
        market: &mut dyn TariffMarket,
        registry: &mut SubscriptionRegistry,
        old_tariff: TariffId,
        new_tariff: TariffId,
        count: u32,
    ) -> SimResult<()> {
        self.existing_subscription(registry, old_tariff)?;
        self.unsubscribe(registry, old_tariff, count)?;
        self.subscribe(market, registry, new_tariff, count)
    }

    /// Recover from tariff revocations: for every live subscription
    /// whose tariff has been revoked, ask the market for a replacement,
    /// drop the revoked entry and register the replacement. Returns the
    /// (revoked, replacement) pairs that were handled.
    pub fn check_revoked_subscriptions(
        &mut self,
        market: &mut dyn TariffMarket,
        registry: &mut SubscriptionRegistry,
    ) -> SimResult<Vec<(Subscription, Subscription)>> {
        let revoked = market.revoked_subscriptions(registry, self.info.id);
        let mut handled = Vec::with_capacity(revoked.len());
        for subscription in revoked {
            let replacement = market.handle_revoked(registry, &subscription)?;
            registry.remove(subscription.customer(), subscription.tariff());
            registry.add(replacement.clone());
            log::info!(
                "{}: migrated {} committed from revoked {} to {}",
                self.info.name,
                replacement.customers_committed(),
                subscription.tariff(),
                replacement.tariff()
            );
            handled.push((subscription, replacement));
        }
        Ok(handled)
    }

    /// Per-tick entry point, invoked by the scheduler in its serialized
    /// customer phase. Returns the events this customer produced.
    pub fn step(
        &mut self,
        tick: Tick,
        market: &mut dyn TariffMarket,
        registry: &mut SubscriptionRegistry,
    ) -> SimResult<Vec<SimEvent>> {
        let handled = self.check_revoked_subscriptions(market, registry)?;
        Ok(handled
            .into_iter()
            .map(|(revoked, replacement)| SimEvent::RevocationHandled {
                tick,
                customer: self.info.id,
                from: revoked.tariff(),
                to: replacement.tariff(),
                count: replacement.customers_committed(),
            })
            .collect())
    }

    fn existing_subscription(
        &self,
        registry: &SubscriptionRegistry,
        tariff: TariffId,
    ) -> SimResult<Subscription> {
        registry
            .find_by_customer_and_tariff(self.info.id, tariff)
            .ok_or(SimError::SubscriptionNotFound {
                customer: self.info.id,
                tariff,
            })
    }

    /// Population committed across the customer's subscriptions to
    /// tariffs of the given power type.
    fn committed_for_type(
        &self,
        market: &dyn TariffMarket,
        registry: &SubscriptionRegistry,
        power_type: PowerType,
    ) -> u32 {
        registry
            .find_by_customer(self.info.id)
            .iter()
            .filter(|s| market.tariff_power_type(s.tariff()) == Some(power_type))
            .map(|s| s.customers_committed())
            .sum()
    }
}
