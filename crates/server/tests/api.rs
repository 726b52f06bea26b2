use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db)
        .build()
        .await
        .unwrap();
    server::router(engine)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Category "Structure" with a 1000/unit panel and one 0.5/m² formula on it.
async fn seed_catalog(app: &Router) -> (String, String) {
    let (status, category) = send(
        app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "Structure" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, material) = send(
        app,
        Method::POST,
        "/materials",
        Some(json!({
            "category_id": category["id"],
            "name": "Steel panel",
            "unit": "unit",
            "unit_cost": 1000.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        app,
        Method::POST,
        "/formulas",
        Some(json!({
            "name": "Wall panels",
            "category_id": category["id"],
            "material_id": material["id"],
            "quantity_per_m2": 0.5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        category["id"].as_str().unwrap().to_string(),
        material["id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn quote_uses_formulas_and_explicit_margin() {
    let app = app().await;
    seed_catalog(&app).await;

    let (status, quote) = send(
        &app,
        Method::POST,
        "/express/quote",
        Some(json!({ "area": 100.0, "margin_percentage": 25.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["items"].as_array().unwrap().len(), 1);
    assert_eq!(quote["items"][0]["quantity"], json!(50.0));
    assert_eq!(quote["items"][0]["category_label"], json!("Structure"));
    assert_eq!(quote["summary"]["total_cost"], json!(50000.0));
    assert_eq!(quote["summary"]["margin_amount"], json!(12500.0));
    assert_eq!(quote["summary"]["final_price"], json!(62500.0));
    assert_eq!(quote["summary"]["price_per_m2"], json!(625.0));
}

#[tokio::test]
async fn quote_falls_back_to_configured_margin() {
    let app = app().await;
    seed_catalog(&app).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/settings/pricing",
        Some(json!({ "price_per_m2": 900.0, "margin_percentage": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, quote) = send(
        &app,
        Method::POST,
        "/express/quote",
        Some(json!({ "area": 100.0 })),
    )
    .await;
    assert_eq!(quote["summary"]["margin_percentage"], json!(10.0));
    assert_eq!(quote["summary"]["final_price"], json!(55000.0));
}

#[tokio::test]
async fn saved_budget_keeps_prices_after_catalog_change() {
    let app = app().await;
    let (_, material_id) = seed_catalog(&app).await;

    let (status, saved) = send(
        &app,
        Method::POST,
        "/express/save",
        Some(json!({
            "area": 100.0,
            "margin_percentage": 25.0,
            "client": { "client_name": "Ana" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["project"]["project_name"], json!("House Ana - 100m²"));
    assert_eq!(saved["project"]["status"], json!("draft"));
    let project_id = saved["project"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/materials/{material_id}/price"),
        Some(json!({ "unit_cost": 2000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, detail) = send(&app, Method::GET, &format!("/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["project"]["final_price"], json!(62500.0));
    assert_eq!(detail["items"][0]["unit_cost"], json!(1000.0));

    let (_, history) = send(
        &app,
        Method::GET,
        &format!("/materials/{material_id}/price-history"),
        None,
    )
    .await;
    assert_eq!(history["changes"][0]["old_price"], json!(1000.0));
    assert_eq!(history["changes"][0]["new_price"], json!(2000.0));
}

#[tokio::test]
async fn project_items_update_totals() {
    let app = app().await;
    seed_catalog(&app).await;

    let (_, saved) = send(
        &app,
        Method::POST,
        "/express/save",
        Some(json!({
            "area": 10.0,
            "margin_percentage": 0.0,
            "client": { "client_name": "Bruno", "project_name": "Garage" },
        })),
    )
    .await;
    let project_id = saved["project"]["id"].as_str().unwrap().to_string();

    let (status, detail) = send(
        &app,
        Method::POST,
        &format!("/projects/{project_id}/items"),
        Some(json!({
            "item_type": "labor",
            "name": "Assembly crew",
            "unit": "day",
            "quantity": 2.0,
            "unit_cost": 500.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["project"]["total_cost"], json!(6000.0));
    let item_id = detail["items"][1]["id"].as_str().unwrap().to_string();

    let (_, totals) = send(
        &app,
        Method::GET,
        &format!("/projects/{project_id}/totals"),
        None,
    )
    .await;
    assert_eq!(totals["total_cost"], json!(6000.0));
    assert_eq!(totals["by_type"].as_array().unwrap().len(), 2);

    let (status, detail) = send(
        &app,
        Method::DELETE,
        &format!("/projects/{project_id}/items/{item_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["project"]["total_cost"], json!(5000.0));
}

#[tokio::test]
async fn project_status_and_delete() {
    let app = app().await;
    seed_catalog(&app).await;

    let (_, saved) = send(
        &app,
        Method::POST,
        "/express/save",
        Some(json!({
            "area": 50.0,
            "client": { "client_name": "Carla" },
        })),
    )
    .await;
    let project_id = saved["project"]["id"].as_str().unwrap().to_string();

    let (status, project) = send(
        &app,
        Method::PATCH,
        &format!("/projects/{project_id}/status"),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(project["status"], json!("approved"));

    let (_, list) = send(&app, Method::GET, "/projects?search=carla", None).await;
    assert_eq!(list["projects"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_errors_map_to_status_codes() {
    let app = app().await;
    seed_catalog(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "structure" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::GET,
        "/materials/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/settings/pricing",
        Some(json!({ "price_per_m2": 800.0, "margin_percentage": 150.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn grouped_materials_follow_categories() {
    let app = app().await;
    seed_catalog(&app).await;

    let (status, grouped) = send(&app, Method::GET, "/materials/grouped", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grouped["groups"][0]["category"]["name"], json!("Structure"));
    assert_eq!(
        grouped["groups"][0]["materials"][0]["name"],
        json!("Steel panel")
    );

    let (_, found) = send(&app, Method::GET, "/materials?search=STEEL", None).await;
    assert_eq!(found["materials"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn template_estimate_prices_items() {
    let app = app().await;
    let (_, material_id) = seed_catalog(&app).await;

    let (status, template) = send(
        &app,
        Method::POST,
        "/templates",
        Some(json!({ "name": "Cabin 40", "total_area_m2": 40.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let template_id = template["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/templates/{template_id}/items"),
        Some(json!({
            "material_id": material_id,
            "item_type": "material",
            "name": "Panels",
            "unit": "unit",
            "quantity_per_m2": 0.5,
            "estimated_unit_cost": 900.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, estimate) = send(
        &app,
        Method::GET,
        &format!("/templates/{template_id}/estimate?area=100"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(estimate["items"][0]["quantity"], json!(50.0));
    assert_eq!(estimate["items"][0]["unit_cost"], json!(1000.0));
    assert_eq!(estimate["total_cost"], json!(50000.0));
    assert_eq!(estimate["margin_percentage"], json!(25.0));
}
