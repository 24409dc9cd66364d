//! Configuration loading and the in-code demo fixture.

use tariffsim_core::config::SimConfig;
use tariffsim_core::engine::SimEngine;
use tariffsim_core::tariff::PowerType;

#[test]
fn demo_fixture_builds_a_working_engine() {
    let config = SimConfig::default_demo();
    assert_eq!(config.customers.len(), 3);
    assert_eq!(config.tariffs.iter().filter(|t| t.is_default).count(), 1);

    let mut engine = SimEngine::build("demo".into(), 42, &config);
    engine.run_ticks(1).unwrap();
    assert_eq!(engine.agent_count(), 3);
}

#[test]
fn data_dir_catalogs_deserialize() {
    // Integration tests run from the package root; the shared data
    // directory sits one level up.
    let config = SimConfig::load("../data").unwrap();

    assert_eq!(config.customers.len(), 4);
    assert_eq!(config.tariffs.len(), 6);
    assert_eq!(
        config
            .tariffs
            .iter()
            .filter(|t| t.is_default && t.power_type == PowerType::Consumption)
            .count(),
        1,
        "exactly one consumption default"
    );

    let mill = config
        .customers
        .iter()
        .find(|c| c.name == "Brookside Mill")
        .unwrap();
    assert_eq!(mill.power_types.len(), 2);
    assert_eq!(mill.upper_power_cap, Some(180.0));
}

#[test]
fn missing_data_dir_reports_the_path() {
    let err = SimConfig::load("/nonexistent/dir").unwrap_err();
    assert!(err.to_string().contains("customers.json"));
}
