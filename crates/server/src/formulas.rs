//! Express formula endpoints.

use api_types::formula::{
    FormulaList, FormulaListResponse, FormulaNew, FormulaUpdate, FormulaView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    mapping::{house_type_in, house_type_out, quality_in, quality_out},
    server::ServerState,
};

fn map_formula(formula: engine::ExpressFormula, resolved: Option<&engine::FormulaView>) -> FormulaView {
    let material = resolved.and_then(|view| view.material.as_ref());
    FormulaView {
        id: formula.id,
        name: formula.name,
        description: formula.description,
        category_id: formula.category_id,
        category_label: resolved.and_then(|view| view.category_label.clone()),
        material_id: formula.material_id,
        material_name: material.map(|material| material.name.clone()),
        unit: material.map(|material| material.unit.clone()),
        unit_cost: material.map(|material| material.unit_cost),
        quantity_per_m2: formula.quantity_per_m2,
        house_type: house_type_out(formula.house_type),
        quality_level: quality_out(formula.quality_level),
        is_optional: formula.is_optional,
        position: formula.position,
        is_active: formula.is_active,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<FormulaList>,
) -> Result<Json<FormulaListResponse>, ServerError> {
    let formulas = state
        .engine
        .list_formulas(query.include_inactive.unwrap_or(false))
        .await?
        .into_iter()
        .map(|view| map_formula(view.formula.clone(), Some(&view)))
        .collect();
    Ok(Json(FormulaListResponse { formulas }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FormulaNew>,
) -> Result<(StatusCode, Json<FormulaView>), ServerError> {
    let formula = state
        .engine
        .create_formula(engine::NewFormula {
            name: payload.name,
            description: payload.description,
            category_id: payload.category_id,
            material_id: payload.material_id,
            quantity_per_m2: payload.quantity_per_m2,
            house_type: payload
                .house_type
                .map_or(engine::HouseType::Any, house_type_in),
            quality_level: payload
                .quality_level
                .map_or(engine::QualityLevel::Any, quality_in),
            is_optional: payload.is_optional,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_formula(formula, None))))
}

/// Enable or disable a formula for future quotes.
pub async fn update(
    State(state): State<ServerState>,
    Path(formula_id): Path<Uuid>,
    Json(payload): Json<FormulaUpdate>,
) -> Result<Json<FormulaView>, ServerError> {
    let formula = state
        .engine
        .set_formula_active(formula_id, payload.is_active)
        .await?;
    Ok(Json(map_formula(formula, None)))
}
