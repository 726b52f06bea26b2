use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use std::sync::Arc;

use crate::{catalog, express, formulas, projects, settings, templates};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Every HTTP route, bound to `engine`.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/materials",
            get(catalog::list_materials).post(catalog::create_material),
        )
        .route("/materials/grouped", get(catalog::grouped_materials))
        .route(
            "/materials/{id}",
            get(catalog::get_material).patch(catalog::update_material),
        )
        .route("/materials/{id}/price", patch(catalog::update_price))
        .route("/materials/{id}/price-history", get(catalog::price_history))
        .route(
            "/formulas",
            get(formulas::list).post(formulas::create),
        )
        .route("/formulas/{id}", patch(formulas::update))
        .route("/express/quote", post(express::quote))
        .route("/express/save", post(express::save))
        .route("/projects", get(projects::list))
        .route(
            "/projects/{id}",
            get(projects::get).delete(projects::remove),
        )
        .route("/projects/{id}/status", patch(projects::update_status))
        .route("/projects/{id}/totals", get(projects::totals))
        .route("/projects/{id}/items", post(projects::add_item))
        .route(
            "/projects/{id}/items/{item_id}",
            delete(projects::remove_item),
        )
        .route(
            "/settings/pricing",
            get(settings::get_pricing).put(settings::put_pricing),
        )
        .route(
            "/templates",
            get(templates::list).post(templates::create),
        )
        .route(
            "/templates/{id}/items",
            get(templates::list_items).post(templates::add_item),
        )
        .route("/templates/{id}/estimate", get(templates::estimate))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}
