//! Default-tariff enrollment and direct subscribe behavior.

use tariffsim_core::customer::{CustomerAgent, CustomerInfo};
use tariffsim_core::market::SimTariffMarket;
use tariffsim_core::registry::SubscriptionRegistry;
use tariffsim_core::rng::{ComponentSlot, RngBank};
use tariffsim_core::selector::RandomTariffSelector;
use tariffsim_core::tariff::PowerType;
use tariffsim_core::types::CustomerId;

fn make_agent(info: CustomerInfo) -> CustomerAgent {
    let rng = RngBank::new(42).for_agent(ComponentSlot::TariffSelection, info.id.0 as usize);
    CustomerAgent::new(info, Box::new(RandomTariffSelector::new(rng)))
}

#[test]
fn default_enrollment_commits_full_population() {
    let mut market = SimTariffMarket::new();
    let default = market.publish_default("DefaultBroker", PowerType::Consumption, 0.222, 168, 10_000);
    let mut registry = SubscriptionRegistry::new();

    let info = CustomerInfo::new(CustomerId(1), "Podunk", 100)
        .with_power_type(PowerType::Consumption);
    let mut agent = make_agent(info);

    agent.subscribe_default(&mut market, &mut registry).unwrap();

    let subs = registry.find_by_customer(CustomerId(1));
    assert_eq!(subs.len(), 1, "exactly one subscription after enrollment");
    assert_eq!(subs[0].tariff(), default, "customer must sit on the default");
    assert_eq!(subs[0].customers_committed(), 100,
        "full population must be committed");
}

#[test]
fn power_type_without_default_is_skipped_not_an_error() {
    let mut market = SimTariffMarket::new();
    market.publish_default("DefaultBroker", PowerType::Consumption, 0.222, 168, 10_000);
    let mut registry = SubscriptionRegistry::new();

    // Production participant, but no production default exists.
    let info = CustomerInfo::new(CustomerId(1), "Wind Farm", 30)
        .with_power_type(PowerType::Production);
    let mut agent = make_agent(info);

    agent.subscribe_default(&mut market, &mut registry).unwrap();
    assert!(registry.find_by_customer(CustomerId(1)).is_empty(),
        "no default means no subscription, silently");
}

#[test]
fn multi_type_customer_enrolls_once_per_type() {
    let mut market = SimTariffMarket::new();
    let cons = market.publish_default("DefaultBroker", PowerType::Consumption, 0.222, 168, 10_000);
    let prod = market.publish_default("DefaultBroker", PowerType::Production, 0.015, 168, 10_000);
    let mut registry = SubscriptionRegistry::new();

    let info = CustomerInfo::new(CustomerId(7), "Mill", 40)
        .with_power_type(PowerType::Consumption)
        .with_power_type(PowerType::Production);
    let mut agent = make_agent(info);

    agent.subscribe_default(&mut market, &mut registry).unwrap();

    let subs = registry.find_by_customer(CustomerId(7));
    assert_eq!(subs.len(), 2);
    for sub in &subs {
        assert!(sub.tariff() == cons || sub.tariff() == prod);
        assert_eq!(sub.customers_committed(), 40);
    }
}

#[test]
fn subscribing_twice_accumulates_onto_one_entry() {
    let mut market = SimTariffMarket::new();
    let tariff = market.publish("Joe", PowerType::Consumption, 0.121, 168, 4_000);
    let mut registry = SubscriptionRegistry::new();

    let info = CustomerInfo::new(CustomerId(1), "Podunk", 100)
        .with_power_type(PowerType::Consumption);
    let mut agent = make_agent(info);

    agent.subscribe(&mut market, &mut registry, tariff, 30).unwrap();
    agent.subscribe(&mut market, &mut registry, tariff, 20).unwrap();

    let subs = registry.find_by_customer(CustomerId(1));
    assert_eq!(subs.len(), 1, "one pair, never two entries");
    assert_eq!(subs[0].customers_committed(), 50);
    assert_eq!(market.total_signups(tariff), 50);
}

#[test]
fn subscribing_an_unknown_tariff_errors() {
    let mut market = SimTariffMarket::new();
    let mut registry = SubscriptionRegistry::new();

    let info = CustomerInfo::new(CustomerId(1), "Podunk", 100)
        .with_power_type(PowerType::Consumption);
    let mut agent = make_agent(info);

    let result = agent.subscribe(
        &mut market,
        &mut registry,
        tariffsim_core::types::TariffId(404),
        10,
    );
    assert!(result.is_err(), "unknown tariff must propagate as an error");
}

#[test]
#[should_panic(expected = "exceeds population")]
fn committing_more_than_population_panics() {
    let mut market = SimTariffMarket::new();
    let tariff = market.publish("Joe", PowerType::Consumption, 0.121, 168, 4_000);
    let other = market.publish("Anna", PowerType::Consumption, 0.118, 168, 4_000);
    let mut registry = SubscriptionRegistry::new();

    let info = CustomerInfo::new(CustomerId(1), "Podunk", 100)
        .with_power_type(PowerType::Consumption);
    let mut agent = make_agent(info);

    agent.subscribe(&mut market, &mut registry, tariff, 80).unwrap();
    agent.subscribe(&mut market, &mut registry, other, 30).unwrap();
}
