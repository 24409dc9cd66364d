//! Run configuration: customer population and tariff catalog.
//!
//! Loaded from JSON files in a data directory, or built in code via
//! [`SimConfig::default_demo`] for tests and the runner's no-argument
//! mode.

use crate::tariff::PowerType;
use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerConfig {
    pub name:        String,
    pub population:  u32,
    pub power_types: Vec<PowerType>,
    #[serde(default)]
    pub upper_power_cap:      Option<f64>,
    #[serde(default)]
    pub lower_power_cap:      Option<f64>,
    #[serde(default)]
    pub carbon_emission_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffConfig {
    pub broker:       String,
    pub power_type:   PowerType,
    pub rate:         f64,
    pub min_duration: Tick,
    pub expiration:   Tick,
    /// Marks the power type's default tariff. At most one per type.
    #[serde(default)]
    pub is_default:   bool,
}

#[derive(Debug, Clone, Deserialize)]
struct CustomersFile {
    customers: Vec<CustomerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct TariffsFile {
    tariffs: Vec<TariffConfig>,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub customers: Vec<CustomerConfig>,
    pub tariffs:   Vec<TariffConfig>,
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_demo().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/customers.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let customers_file: CustomersFile = serde_json::from_str(&content)?;

        let path = format!("{data_dir}/tariffs.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let tariffs_file: TariffsFile = serde_json::from_str(&content)?;

        Ok(Self {
            customers: customers_file.customers,
            tariffs:   tariffs_file.tariffs,
        })
    }

    /// Small in-code fixture: three consumption customers, a default
    /// consumption tariff plus three alternatives, and one production
    /// customer with no production default published.
    pub fn default_demo() -> Self {
        let tariff = |broker: &str, power_type, rate, is_default| TariffConfig {
            broker: broker.to_string(),
            power_type,
            rate,
            min_duration: 168,
            expiration: 10_000,
            is_default,
        };
        Self {
            customers: vec![
                CustomerConfig {
                    name: "Village A".into(),
                    population: 100,
                    power_types: vec![PowerType::Consumption],
                    upper_power_cap: None,
                    lower_power_cap: None,
                    carbon_emission_rate: None,
                },
                CustomerConfig {
                    name: "Village B".into(),
                    population: 250,
                    power_types: vec![PowerType::Consumption],
                    upper_power_cap: None,
                    lower_power_cap: None,
                    carbon_emission_rate: None,
                },
                CustomerConfig {
                    name: "Wind Farm".into(),
                    population: 30,
                    power_types: vec![PowerType::Production],
                    upper_power_cap: Some(-150.0),
                    lower_power_cap: Some(-10.0),
                    carbon_emission_rate: Some(0.0),
                },
            ],
            tariffs: vec![
                tariff("DefaultBroker", PowerType::Consumption, 0.222, true),
                tariff("Joe", PowerType::Consumption, 0.121, false),
                tariff("Joe", PowerType::Consumption, 0.135, false),
                tariff("Anna", PowerType::Consumption, 0.118, false),
            ],
        }
    }
}
