//! Saved project endpoints.

use api_types::project::{
    BudgetItemNew, CategoryCost, ProjectDetailResponse, ProjectList, ProjectListResponse,
    ProjectTotalsResponse, ProjectView, StatusUpdate, TypeCost,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    mapping::{budget_item_view, item_type_in, item_type_out, project_view, status_in},
    server::ServerState,
};

fn map_detail(detail: engine::ProjectDetail) -> ProjectDetailResponse {
    ProjectDetailResponse {
        project: project_view(detail.project),
        items: detail.items.into_iter().map(budget_item_view).collect(),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProjectList>,
) -> Result<Json<ProjectListResponse>, ServerError> {
    let projects = state
        .engine
        .list_projects(query.search.as_deref())
        .await?
        .into_iter()
        .map(project_view)
        .collect();
    Ok(Json(ProjectListResponse { projects }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectDetailResponse>, ServerError> {
    let detail = state.engine.project(project_id).await?;
    Ok(Json(map_detail(detail)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_project(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<ProjectView>, ServerError> {
    let project = state
        .engine
        .set_project_status(project_id, status_in(payload.status))
        .await?;
    Ok(Json(project_view(project)))
}

/// Totals recomputed from the project's own item snapshots.
pub async fn totals(
    State(state): State<ServerState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectTotalsResponse>, ServerError> {
    let project = state.engine.project(project_id).await?.project;
    let totals = state.engine.project_totals(project_id).await?;
    Ok(Json(ProjectTotalsResponse {
        total_cost: totals.total_cost,
        margin_percentage: project.margin_percentage,
        margin_amount: totals.margin_amount,
        final_price: totals.final_price,
        by_category: totals
            .cost_by_category
            .into_iter()
            .map(|(category_id, total_cost)| CategoryCost {
                category_id,
                total_cost,
            })
            .collect(),
        by_type: totals
            .cost_by_type
            .into_iter()
            .map(|(item_type, total_cost)| TypeCost {
                item_type: item_type_out(item_type),
                total_cost,
            })
            .collect(),
    }))
}

pub async fn add_item(
    State(state): State<ServerState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<BudgetItemNew>,
) -> Result<(StatusCode, Json<ProjectDetailResponse>), ServerError> {
    let detail = state
        .engine
        .add_budget_item(
            project_id,
            engine::NewBudgetItem {
                category_id: payload.category_id,
                item_type: item_type_in(payload.item_type),
                name: payload.name,
                description: payload.description,
                unit: payload.unit,
                quantity: payload.quantity,
                unit_cost: payload.unit_cost,
                supplier: payload.supplier,
                notes: payload.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_detail(detail))))
}

pub async fn remove_item(
    State(state): State<ServerState>,
    Path((project_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectDetailResponse>, ServerError> {
    let detail = state
        .engine
        .remove_budget_item(project_id, item_id)
        .await?;
    Ok(Json(map_detail(detail)))
}
