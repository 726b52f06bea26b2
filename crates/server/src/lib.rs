use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{router, run_with_listener};

mod catalog;
mod express;
mod formulas;
mod mapping;
mod projects;
mod server;
mod settings;
mod templates;

pub mod types {
    pub mod catalog {
        pub use api_types::catalog::{
            CategoryListResponse, CategoryNew, CategoryView, MaterialGroupView,
            MaterialGroupsResponse, MaterialList, MaterialListResponse, MaterialNew,
            MaterialUpdate, MaterialView, PriceChangeView, PriceHistoryResponse, PriceUpdate,
        };
    }

    pub mod formula {
        pub use api_types::formula::{
            FormulaList, FormulaListResponse, FormulaNew, FormulaUpdate, FormulaView,
        };
    }

    pub mod express {
        pub use api_types::express::{
            QuoteLine, QuoteRequest, QuoteResponse, QuoteSummary, SaveRequest,
        };
        pub use api_types::{HouseType, QualityLevel};
    }

    pub mod project {
        pub use api_types::project::{
            BudgetItemNew, BudgetItemView, CategoryCost, ClientData, ItemType,
            ProjectDetailResponse, ProjectList, ProjectListResponse, ProjectStatus, ProjectView,
            ProjectTotalsResponse, StatusUpdate, TypeCost,
        };
    }

    pub mod settings {
        pub use api_types::settings::PricingSettings;
    }

    pub mod template {
        pub use api_types::template::{
            EstimateLine, EstimateQuery, EstimateResponse, TemplateItemNew, TemplateItemView,
            TemplateItemsResponse, TemplateList, TemplateListResponse, TemplateNew, TemplateView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidName("x".to_string()),
            EngineError::InvalidInput("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn database_error_is_hidden() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk full".to_string()));
        assert_eq!(
            message_for_engine_error(err),
            "internal server error".to_string()
        );
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
