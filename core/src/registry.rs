//! Dual-indexed subscription registry.
//!
//! RULE: The registry is the single source of truth for "who is
//! subscribed to what, how many". Agents and the market hold only
//! transient copies of subscription records, never private caches.
//!
//! Subscriptions are keyed by the (customer, tariff) id pair; the two
//! secondary indexes let "all subscriptions for a tariff" and "all
//! subscriptions for a customer" be answered without scanning.
//! Every mutation keeps all three maps consistent.

use crate::subscription::Subscription;
use crate::types::{CustomerId, TariffId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: HashMap<(CustomerId, TariffId), Subscription>,
    by_tariff:     HashMap<TariffId, Vec<CustomerId>>,
    by_customer:   HashMap<CustomerId, Vec<TariffId>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the subscription for the pair, creating an empty one if
    /// no live entry exists. Repeated calls for the same pair always
    /// resolve to the same entry, never a duplicate.
    pub fn get_or_create(&mut self, customer: CustomerId, tariff: TariffId) -> &mut Subscription {
        let key = (customer, tariff);
        if !self.subscriptions.contains_key(&key) {
            self.index(customer, tariff);
            log::debug!("registry: created subscription {customer} / {tariff}");
        }
        self.subscriptions
            .entry(key)
            .or_insert_with(|| Subscription::new(customer, tariff))
    }

    /// Subscriptions for a tariff, as owned copies. Mutating the
    /// result never affects registry state.
    pub fn find_by_tariff(&self, tariff: TariffId) -> Vec<Subscription> {
        match self.by_tariff.get(&tariff) {
            None => Vec::new(),
            Some(customers) => customers
                .iter()
                .filter_map(|c| self.subscriptions.get(&(*c, tariff)).cloned())
                .collect(),
        }
    }

    /// Subscriptions for a customer, as owned copies.
    pub fn find_by_customer(&self, customer: CustomerId) -> Vec<Subscription> {
        match self.by_customer.get(&customer) {
            None => Vec::new(),
            Some(tariffs) => tariffs
                .iter()
                .filter_map(|t| self.subscriptions.get(&(customer, *t)).cloned())
                .collect(),
        }
    }

    /// The subscription for the pair, if one exists. Does not create.
    pub fn find_by_customer_and_tariff(
        &self,
        customer: CustomerId,
        tariff: TariffId,
    ) -> Option<Subscription> {
        self.subscriptions.get(&(customer, tariff)).cloned()
    }

    /// Mutable access to a live subscription, for in-place
    /// committed-count changes.
    pub fn get_mut(&mut self, customer: CustomerId, tariff: TariffId) -> Option<&mut Subscription> {
        self.subscriptions.get_mut(&(customer, tariff))
    }

    /// Insert a subscription constructed elsewhere (typically returned
    /// by the market's subscribe operation). If an entry for the pair
    /// already exists it is replaced, preserving pair uniqueness.
    pub fn add(&mut self, subscription: Subscription) {
        let customer = subscription.customer();
        let tariff = subscription.tariff();
        if !self.subscriptions.contains_key(&(customer, tariff)) {
            self.index(customer, tariff);
        }
        self.subscriptions.insert((customer, tariff), subscription);
    }

    /// Remove the subscription for the pair from all indexes.
    /// Silently does nothing if the pair is not present. Removing an
    /// already-removed subscription is not an error.
    pub fn remove(&mut self, customer: CustomerId, tariff: TariffId) {
        self.subscriptions.remove(&(customer, tariff));
        if let Some(customers) = self.by_tariff.get_mut(&tariff) {
            customers.retain(|c| *c != customer);
        }
        if let Some(tariffs) = self.by_customer.get_mut(&customer) {
            tariffs.retain(|t| *t != tariff);
        }
    }

    /// Clear all indexes in preparation for another simulation run.
    /// Leaves the registry as freshly constructed.
    pub fn recycle(&mut self) {
        self.subscriptions.clear();
        self.by_tariff.clear();
        self.by_customer.clear();
    }

    /// Number of live subscriptions across all customers.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Total population the customer has committed across all of its
    /// live subscriptions.
    pub fn committed_for_customer(&self, customer: CustomerId) -> u32 {
        self.find_by_customer(customer)
            .iter()
            .map(|s| s.customers_committed())
            .sum()
    }

    fn index(&mut self, customer: CustomerId, tariff: TariffId) {
        self.by_tariff.entry(tariff).or_default().push(customer);
        self.by_customer.entry(customer).or_default().push(tariff);
    }
}
