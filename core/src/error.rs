use crate::tariff::PowerType;
use crate::types::{CustomerId, TariffId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("No subscription for {customer} on {tariff}")]
    SubscriptionNotFound {
        customer: CustomerId,
        tariff: TariffId,
    },

    #[error("Tariff {tariff} is not known to the market")]
    TariffNotFound { tariff: TariffId },

    #[error("No alternative tariff available for power type {power_type:?}")]
    NoAlternativeTariff { power_type: PowerType },

    #[error("No replacement tariff for revoked {tariff}: no successor and no default")]
    NoReplacementTariff { tariff: TariffId },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
