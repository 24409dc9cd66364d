//! tariffsim-core: the tariff subscription core of the energy-market
//! simulation.
//!
//! A population of simulated customers holds subscriptions to tariffs
//! published by competing brokers. The [`registry::SubscriptionRegistry`]
//! is the single source of truth for "who is subscribed to what, how
//! many"; [`customer::CustomerAgent`] drives one customer's enrollment,
//! switching and revocation recovery; [`selector::TariffSelectionPolicy`]
//! picks replacement tariffs.

pub mod clock;
pub mod config;
pub mod customer;
pub mod engine;
pub mod error;
pub mod event;
pub mod market;
pub mod registry;
pub mod rng;
pub mod selector;
pub mod subscription;
pub mod tariff;
pub mod types;
