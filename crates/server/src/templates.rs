//! House template endpoints.

use api_types::template::{
    EstimateLine, EstimateQuery, EstimateResponse, TemplateItemNew, TemplateItemView,
    TemplateItemsResponse, TemplateList, TemplateListResponse, TemplateNew, TemplateView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    mapping::{item_type_in, item_type_out},
    server::ServerState,
};

fn map_template(template: engine::HouseTemplate) -> TemplateView {
    TemplateView {
        id: template.id,
        name: template.name,
        description: template.description,
        total_area_m2: template.total_area_m2,
        bedrooms: template.bedrooms,
        bathrooms: template.bathrooms,
        floors: template.floors,
        is_active: template.is_active,
    }
}

fn map_item(item: engine::TemplateItem) -> TemplateItemView {
    TemplateItemView {
        id: item.id,
        category_id: item.category_id,
        material_id: item.material_id,
        item_type: item_type_out(item.item_type),
        name: item.name,
        unit: item.unit,
        quantity_per_m2: item.quantity_per_m2,
        base_quantity: item.base_quantity,
        estimated_unit_cost: item.estimated_unit_cost,
        position: item.position,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TemplateList>,
) -> Result<Json<TemplateListResponse>, ServerError> {
    let templates = state
        .engine
        .list_templates(query.include_inactive.unwrap_or(false))
        .await?
        .into_iter()
        .map(map_template)
        .collect();
    Ok(Json(TemplateListResponse { templates }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TemplateNew>,
) -> Result<(StatusCode, Json<TemplateView>), ServerError> {
    let template = state
        .engine
        .create_template(engine::NewTemplate {
            name: payload.name,
            description: payload.description,
            total_area_m2: payload.total_area_m2,
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            floors: payload.floors.unwrap_or(1),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_template(template))))
}

pub async fn list_items(
    State(state): State<ServerState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplateItemsResponse>, ServerError> {
    let items = state
        .engine
        .template_items(template_id)
        .await?
        .into_iter()
        .map(map_item)
        .collect();
    Ok(Json(TemplateItemsResponse { items }))
}

pub async fn add_item(
    State(state): State<ServerState>,
    Path(template_id): Path<Uuid>,
    Json(payload): Json<TemplateItemNew>,
) -> Result<(StatusCode, Json<TemplateItemView>), ServerError> {
    let item = state
        .engine
        .add_template_item(
            template_id,
            engine::NewTemplateItem {
                category_id: payload.category_id,
                material_id: payload.material_id,
                item_type: item_type_in(payload.item_type),
                name: payload.name,
                unit: payload.unit,
                quantity_per_m2: payload.quantity_per_m2,
                base_quantity: payload.base_quantity,
                estimated_unit_cost: payload.estimated_unit_cost,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_item(item))))
}

/// Price a template with current catalog costs and the default margin.
pub async fn estimate(
    State(state): State<ServerState>,
    Path(template_id): Path<Uuid>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<EstimateResponse>, ServerError> {
    let estimate = state
        .engine
        .template_estimate(template_id, query.area)
        .await?;
    let summary = estimate.summary;
    Ok(Json(EstimateResponse {
        template: map_template(estimate.template),
        area: estimate.area,
        items: estimate
            .items
            .into_iter()
            .map(|line| EstimateLine {
                name: line.name,
                item_type: item_type_out(line.item_type),
                quantity: line.quantity,
                unit: line.unit,
                unit_cost: line.unit_cost,
                line_total: line.line_total,
                category_id: line.category_id,
                material_id: line.material_id,
            })
            .collect(),
        total_cost: summary.total_cost,
        margin_percentage: summary.margin_percentage,
        margin_amount: summary.margin_amount,
        final_price: summary.final_price,
    }))
}
