//! Pricing settings endpoints.

use api_types::settings::PricingSettings;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

fn map_pricing(config: engine::PricingConfig) -> PricingSettings {
    PricingSettings {
        price_per_m2: config.price_per_m2,
        margin_percentage: config.margin_percentage,
    }
}

pub async fn get_pricing(
    State(state): State<ServerState>,
) -> Result<Json<PricingSettings>, ServerError> {
    let config = state.engine.pricing_config().await?;
    Ok(Json(map_pricing(config)))
}

pub async fn put_pricing(
    State(state): State<ServerState>,
    Json(payload): Json<PricingSettings>,
) -> Result<Json<PricingSettings>, ServerError> {
    let config = state
        .engine
        .update_pricing_config(engine::PricingConfig {
            price_per_m2: payload.price_per_m2,
            margin_percentage: payload.margin_percentage,
        })
        .await?;
    tracing::info!(
        "pricing settings updated: {}/m2, {}% margin",
        config.price_per_m2,
        config.margin_percentage
    );
    Ok(Json(map_pricing(config)))
}
