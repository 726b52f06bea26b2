//! Price catalog endpoints: categories, materials and price history.

use api_types::catalog::{
    CategoryListResponse, CategoryNew, CategoryView, MaterialGroupView, MaterialGroupsResponse,
    MaterialList, MaterialListResponse, MaterialNew, MaterialUpdate, MaterialView,
    PriceChangeView, PriceHistoryResponse, PriceUpdate,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    mapping::{category_view, material_view},
    server::ServerState,
};

fn material_filter(query: MaterialList) -> engine::MaterialFilter {
    engine::MaterialFilter {
        search: query.search,
        category_id: query.category_id,
        include_inactive: query.include_inactive.unwrap_or(false),
    }
}

fn map_price_change(change: engine::PriceChange) -> PriceChangeView {
    PriceChangeView {
        id: change.id,
        material_id: change.material_id,
        old_price: change.old_price,
        new_price: change.new_price,
        changed_at: change.changed_at,
        notes: change.notes,
    }
}

pub async fn list_categories(
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(category_view)
        .collect();
    Ok(Json(CategoryListResponse { categories }))
}

pub async fn create_category(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(engine::NewCategory {
            name: payload.name,
            description: payload.description,
            icon: payload.icon,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(category_view(category))))
}

pub async fn list_materials(
    State(state): State<ServerState>,
    Query(query): Query<MaterialList>,
) -> Result<Json<MaterialListResponse>, ServerError> {
    let materials = state
        .engine
        .list_materials(&material_filter(query))
        .await?
        .into_iter()
        .map(material_view)
        .collect();
    Ok(Json(MaterialListResponse { materials }))
}

/// Materials grouped under their category, categories in display order.
pub async fn grouped_materials(
    State(state): State<ServerState>,
    Query(query): Query<MaterialList>,
) -> Result<Json<MaterialGroupsResponse>, ServerError> {
    let groups = state
        .engine
        .materials_by_category(&material_filter(query))
        .await?
        .into_iter()
        .map(|group| MaterialGroupView {
            category: category_view(group.category),
            materials: group.materials.into_iter().map(material_view).collect(),
        })
        .collect();
    Ok(Json(MaterialGroupsResponse { groups }))
}

pub async fn create_material(
    State(state): State<ServerState>,
    Json(payload): Json<MaterialNew>,
) -> Result<(StatusCode, Json<MaterialView>), ServerError> {
    let material = state
        .engine
        .create_material(engine::NewMaterial {
            category_id: payload.category_id,
            name: payload.name,
            description: payload.description,
            unit: payload.unit,
            unit_cost: payload.unit_cost,
            supplier: payload.supplier,
            supplier_code: payload.supplier_code,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(material_view(material))))
}

pub async fn get_material(
    State(state): State<ServerState>,
    Path(material_id): Path<Uuid>,
) -> Result<Json<MaterialView>, ServerError> {
    let material = state.engine.material(material_id).await?;
    Ok(Json(material_view(material)))
}

pub async fn update_material(
    State(state): State<ServerState>,
    Path(material_id): Path<Uuid>,
    Json(payload): Json<MaterialUpdate>,
) -> Result<Json<MaterialView>, ServerError> {
    let material = state
        .engine
        .set_material_active(material_id, payload.is_active)
        .await?;
    Ok(Json(material_view(material)))
}

/// Change a unit cost. Saved projects keep the price they were saved with.
pub async fn update_price(
    State(state): State<ServerState>,
    Path(material_id): Path<Uuid>,
    Json(payload): Json<PriceUpdate>,
) -> Result<Json<PriceChangeView>, ServerError> {
    let change = state
        .engine
        .update_material_price(material_id, payload.unit_cost, payload.notes.as_deref())
        .await?;
    Ok(Json(map_price_change(change)))
}

pub async fn price_history(
    State(state): State<ServerState>,
    Path(material_id): Path<Uuid>,
) -> Result<Json<PriceHistoryResponse>, ServerError> {
    let changes = state
        .engine
        .price_history(material_id)
        .await?
        .into_iter()
        .map(map_price_change)
        .collect();
    Ok(Json(PriceHistoryResponse { changes }))
}
