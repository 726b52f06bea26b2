//! Key/value application settings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub(crate) const PRICE_PER_M2_KEY: &str = "price_per_m2";
pub(crate) const MARGIN_PERCENTAGE_KEY: &str = "margin_percentage";

/// Default selling price per square meter.
pub const DEFAULT_PRICE_PER_M2: f64 = 800.0;
/// Default margin applied to new budgets, in percent.
pub const DEFAULT_MARGIN_PERCENTAGE: f64 = 25.0;

/// Contractor-wide pricing defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub price_per_m2: f64,
    pub margin_percentage: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_per_m2: DEFAULT_PRICE_PER_M2,
            margin_percentage: DEFAULT_MARGIN_PERCENTAGE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "system_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub config_key: String,
    pub config_value: String,
    pub description: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
