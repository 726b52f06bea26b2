//! Express budget endpoints.

use api_types::{
    express::{QuoteLine, QuoteRequest, QuoteResponse, QuoteSummary, SaveRequest},
    project::{ClientData, ProjectDetailResponse},
};
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    ServerError,
    mapping::{budget_item_view, house_type_in, project_view, quality_in},
    server::ServerState,
};

/// Build the calculator input, taking the margin from settings when omitted.
async fn budget_input(
    state: &ServerState,
    request: QuoteRequest,
) -> Result<engine::BudgetInput, ServerError> {
    let margin_percentage = match request.margin_percentage {
        Some(margin) => margin,
        None => state.engine.pricing_config().await?.margin_percentage,
    };
    Ok(engine::BudgetInput {
        area: request.area,
        house_type: house_type_in(request.house_type),
        quality_level: quality_in(request.quality_level),
        optional_selections: request.optional_selections.into_iter().collect(),
        margin_percentage,
    })
}

fn map_quote(calculation: engine::BudgetCalculation, area: f64) -> QuoteResponse {
    let price_per_m2 = calculation.price_per_m2(area);
    let summary = calculation.summary;
    QuoteResponse {
        items: calculation
            .items
            .into_iter()
            .map(|line| QuoteLine {
                name: line.name,
                formula_name: line.formula_name,
                quantity: line.quantity,
                unit: line.unit,
                unit_cost: line.unit_cost,
                line_total: line.line_total,
                category_id: line.category_id,
                category_label: line.category_label,
                material_id: line.material_id,
            })
            .collect(),
        summary: QuoteSummary {
            total_cost: summary.total_cost,
            margin_percentage: summary.margin_percentage,
            margin_amount: summary.margin_amount,
            final_price: summary.final_price,
            price_per_m2,
        },
    }
}

fn new_project(client: ClientData) -> engine::NewProject {
    engine::NewProject {
        project_name: client.project_name,
        client_name: client.client_name,
        client_email: client.client_email,
        client_phone: client.client_phone,
        location: client.location,
        notes: client.notes,
        house_template_id: client.house_template_id,
    }
}

pub async fn quote(
    State(state): State<ServerState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ServerError> {
    let input = budget_input(&state, payload).await?;
    let calculation = state.engine.express_quote(&input).await?;
    Ok(Json(map_quote(calculation, input.area)))
}

/// Quote with current prices and store the result as a draft project.
pub async fn save(
    State(state): State<ServerState>,
    Json(payload): Json<SaveRequest>,
) -> Result<(StatusCode, Json<ProjectDetailResponse>), ServerError> {
    let input = budget_input(&state, payload.quote).await?;
    let detail = state
        .engine
        .save_express_budget(new_project(payload.client), &input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ProjectDetailResponse {
            project: project_view(detail.project),
            items: detail.items.into_iter().map(budget_item_view).collect(),
        }),
    ))
}
