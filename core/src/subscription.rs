//! The subscription join record: how much of one customer's population
//! is committed to one tariff.

use crate::types::{CustomerId, TariffId};
use serde::{Deserialize, Serialize};

/// One live (customer, tariff) commitment.
///
/// Identity is the id pair; at most one live subscription may exist
/// for a given pair, and the registry maintains that invariant.
/// A subscription is never stored with zero commitment: it is created
/// through a subscribe that adds population, and removed by the owning
/// agent the moment an unsubscribe drives the count to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    customer:  CustomerId,
    tariff:    TariffId,
    committed: u32,
}

impl Subscription {
    pub fn new(customer: CustomerId, tariff: TariffId) -> Self {
        Self {
            customer,
            tariff,
            committed: 0,
        }
    }

    pub fn customer(&self) -> CustomerId {
        self.customer
    }

    pub fn tariff(&self) -> TariffId {
        self.tariff
    }

    /// Population currently committed to the tariff.
    pub fn customers_committed(&self) -> u32 {
        self.committed
    }

    /// Commit `count` more population members to the tariff.
    pub fn subscribe(&mut self, count: u32) {
        self.committed += count;
    }

    /// Release `count` population members.
    /// Panics if `count` exceeds the committed count; callers must
    /// only ever unsubscribe counts they previously confirmed.
    pub fn unsubscribe(&mut self, count: u32) {
        assert!(
            count <= self.committed,
            "unsubscribe({count}) exceeds committed count {} on {} / {}",
            self.committed,
            self.customer,
            self.tariff,
        );
        self.committed -= count;
    }
}
