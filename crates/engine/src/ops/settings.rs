use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*, sea_query::OnConflict,
};

use crate::{
    PricingConfig, ResultEngine,
    system_config::{self, MARGIN_PERCENTAGE_KEY, PRICE_PER_M2_KEY},
    util::{require_non_negative, require_percentage},
};

use super::{Engine, with_tx};

/// Read a numeric setting; missing or unparsable values yield `None`.
fn parse_setting(models: &[system_config::Model], key: &str) -> Option<f64> {
    models
        .iter()
        .find(|model| model.config_key == key)
        .and_then(|model| model.config_value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

pub(super) async fn load_pricing_config<C: ConnectionTrait>(conn: &C) -> ResultEngine<PricingConfig> {
    let models = system_config::Entity::find()
        .filter(
            system_config::Column::ConfigKey.is_in([PRICE_PER_M2_KEY, MARGIN_PERCENTAGE_KEY]),
        )
        .all(conn)
        .await?;

    let defaults = PricingConfig::default();
    Ok(PricingConfig {
        price_per_m2: parse_setting(&models, PRICE_PER_M2_KEY).unwrap_or(defaults.price_per_m2),
        margin_percentage: parse_setting(&models, MARGIN_PERCENTAGE_KEY)
            .unwrap_or(defaults.margin_percentage),
    })
}

impl Engine {
    /// Current pricing defaults, falling back to 800/m² and 25 %.
    pub async fn pricing_config(&self) -> ResultEngine<PricingConfig> {
        load_pricing_config(&self.database).await
    }

    pub async fn update_pricing_config(&self, config: PricingConfig) -> ResultEngine<PricingConfig> {
        let price_per_m2 = require_non_negative(config.price_per_m2, "price per m2")?;
        let margin_percentage = require_percentage(config.margin_percentage, "margin percentage")?;

        with_tx!(self, |db_tx| {
            let now = Utc::now();
            for (key, value) in [
                (PRICE_PER_M2_KEY, price_per_m2),
                (MARGIN_PERCENTAGE_KEY, margin_percentage),
            ] {
                let row = system_config::ActiveModel {
                    config_key: ActiveValue::Set(key.to_string()),
                    config_value: ActiveValue::Set(value.to_string()),
                    description: ActiveValue::NotSet,
                    updated_at: ActiveValue::Set(now),
                };
                system_config::Entity::insert(row)
                    .on_conflict(
                        OnConflict::column(system_config::Column::ConfigKey)
                            .update_columns([
                                system_config::Column::ConfigValue,
                                system_config::Column::UpdatedAt,
                            ])
                            .to_owned(),
                    )
                    .exec(&db_tx)
                    .await?;
            }
            load_pricing_config(&db_tx).await
        })
    }
}
