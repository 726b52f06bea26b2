use std::collections::HashSet;

use chrono::{Datelike, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use engine::{
    BudgetInput, Engine, EngineError, HouseType, ItemType, Material, MaterialFilter,
    NewBudgetItem, NewCategory, NewFormula, NewMaterial, NewProject, NewTemplate,
    NewTemplateItem, PricingConfig, ProjectStatus, QualityLevel,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

struct Catalog {
    panel: Material,
    drywall: Material,
    wall_formula: Uuid,
    premium_formula: Uuid,
    insulation_formula: Uuid,
}

/// Structure category with a steel panel (1000) and drywall (50), plus:
/// - "Wall panels": 0.5 panel/m², every house
/// - "Premium lining": 2 drywall/m², two-story premium only
/// - "Insulation": 1 drywall/m², optional
async fn seed_catalog(engine: &Engine) -> Catalog {
    let category = engine
        .create_category(NewCategory {
            name: "Estructura".to_string(),
            description: Some("Steel frame".to_string()),
            icon: None,
        })
        .await
        .unwrap();

    let panel = engine
        .create_material(NewMaterial {
            category_id: category.id,
            name: "Panel acero".to_string(),
            description: None,
            unit: "unit".to_string(),
            unit_cost: 1000.0,
            supplier: Some("Acindar".to_string()),
            supplier_code: None,
        })
        .await
        .unwrap();
    let drywall = engine
        .create_material(NewMaterial {
            category_id: category.id,
            name: "Placa de yeso".to_string(),
            description: None,
            unit: "m2".to_string(),
            unit_cost: 50.0,
            supplier: None,
            supplier_code: None,
        })
        .await
        .unwrap();

    let formula = |name: &str, material: &Material, quantity_per_m2: f64| NewFormula {
        name: name.to_string(),
        description: None,
        category_id: Some(category.id),
        material_id: Some(material.id),
        quantity_per_m2,
        house_type: HouseType::Any,
        quality_level: QualityLevel::Any,
        is_optional: false,
    };

    let wall_formula = engine
        .create_formula(formula("Wall panels", &panel, 0.5))
        .await
        .unwrap()
        .id;
    let premium_formula = engine
        .create_formula(NewFormula {
            house_type: HouseType::TwoStory,
            quality_level: QualityLevel::Premium,
            ..formula("Premium lining", &drywall, 2.0)
        })
        .await
        .unwrap()
        .id;
    let insulation_formula = engine
        .create_formula(NewFormula {
            is_optional: true,
            ..formula("Insulation", &drywall, 1.0)
        })
        .await
        .unwrap()
        .id;

    Catalog {
        panel,
        drywall,
        wall_formula,
        premium_formula,
        insulation_formula,
    }
}

fn input(area: f64, margin_percentage: f64) -> BudgetInput {
    BudgetInput {
        area,
        margin_percentage,
        ..BudgetInput::default()
    }
}

fn client(name: &str) -> NewProject {
    NewProject {
        client_name: name.to_string(),
        ..NewProject::default()
    }
}

#[tokio::test]
async fn material_search_ignores_accents_and_case() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    engine
        .create_material(NewMaterial {
            category_id: catalog.panel.category_id,
            name: "Membrana hidrófuga".to_string(),
            description: None,
            unit: "roll".to_string(),
            unit_cost: 300.0,
            supplier: None,
            supplier_code: None,
        })
        .await
        .unwrap();

    let found = engine
        .list_materials(&MaterialFilter {
            search: Some("  HIDROFUGA ".to_string()),
            ..MaterialFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Membrana hidrófuga");

    let all = engine
        .list_materials(&MaterialFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let groups = engine
        .materials_by_category(&MaterialFilter::default())
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].category.name, "Estructura");
    assert_eq!(groups[0].materials.len(), 3);
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    let err = engine
        .create_category(NewCategory {
            name: " ESTRUCTURA ".to_string(),
            ..NewCategory::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .create_material(NewMaterial {
            category_id: catalog.panel.category_id,
            name: "placa de YESO".to_string(),
            description: None,
            unit: "m2".to_string(),
            unit_cost: 60.0,
            supplier: None,
            supplier_code: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn price_update_records_history() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    let change = engine
        .update_material_price(catalog.panel.id, 1200.0, Some("supplier list"))
        .await
        .unwrap();
    assert_eq!(change.old_price, 1000.0);
    assert_eq!(change.new_price, 1200.0);

    engine
        .update_material_price(catalog.panel.id, 1300.0, None)
        .await
        .unwrap();

    let material = engine.material(catalog.panel.id).await.unwrap();
    assert_eq!(material.unit_cost, 1300.0);

    let history = engine.price_history(catalog.panel.id).await.unwrap();
    assert_eq!(history.len(), 2);
    let latest = history
        .iter()
        .find(|change| change.new_price == 1300.0)
        .unwrap();
    assert_eq!(latest.old_price, 1200.0);

    let err = engine
        .update_material_price(catalog.panel.id, 0.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .update_material_price(Uuid::new_v4(), 10.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn express_quote_filters_scope_and_optionals() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    let budget = engine.express_quote(&input(100.0, 25.0)).await.unwrap();
    assert_eq!(budget.items.len(), 1);
    assert_eq!(budget.items[0].name, "Panel acero");
    assert_eq!(budget.items[0].formula_name, "Wall panels");
    assert_eq!(budget.items[0].category_label, "Estructura");
    assert_eq!(budget.items[0].quantity, 50.0);
    assert_eq!(budget.summary.total_cost, 50000.0);
    assert_eq!(budget.summary.margin_amount, 12500.0);
    assert_eq!(budget.summary.final_price, 62500.0);

    let with_insulation = BudgetInput {
        optional_selections: HashSet::from([catalog.insulation_formula]),
        ..input(100.0, 25.0)
    };
    let budget = engine.express_quote(&with_insulation).await.unwrap();
    assert_eq!(budget.items.len(), 2);
    assert_eq!(budget.summary.total_cost, 55000.0);

    let premium = BudgetInput {
        house_type: HouseType::TwoStory,
        quality_level: QualityLevel::Premium,
        ..input(100.0, 0.0)
    };
    let budget = engine.express_quote(&premium).await.unwrap();
    let names: Vec<&str> = budget
        .items
        .iter()
        .map(|line| line.formula_name.as_str())
        .collect();
    assert_eq!(names, vec!["Wall panels", "Premium lining"]);
    assert_eq!(budget.summary.total_cost, 50000.0 + 200.0 * 50.0);
    assert_eq!(budget.summary.final_price, budget.summary.total_cost);
}

#[tokio::test]
async fn inactive_formulas_are_ignored() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    engine
        .set_formula_active(catalog.wall_formula, false)
        .await
        .unwrap();

    let budget = engine.express_quote(&input(100.0, 25.0)).await.unwrap();
    assert!(budget.is_empty());
    assert_eq!(budget.summary.final_price, 0.0);

    let all = engine.list_formulas(true).await.unwrap();
    assert_eq!(all.len(), 3);
    let active = engine.list_formulas(false).await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|view| view.formula.id != catalog.wall_formula));
    assert!(active.iter().any(|view| view.formula.id == catalog.premium_formula));
}

#[tokio::test]
async fn inactive_material_hidden_from_listing_but_still_quoted() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    engine
        .set_material_active(catalog.drywall.id, false)
        .await
        .unwrap();

    let visible = engine
        .list_materials(&MaterialFilter::default())
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);

    let all = engine
        .list_materials(&MaterialFilter {
            include_inactive: true,
            ..MaterialFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let with_insulation = BudgetInput {
        optional_selections: HashSet::from([catalog.insulation_formula]),
        ..input(100.0, 0.0)
    };
    let budget = engine.express_quote(&with_insulation).await.unwrap();
    let names: Vec<&str> = budget.items.iter().map(|line| line.name.as_str()).collect();
    assert_eq!(names, vec!["Panel acero", "Placa de yeso"]);
    assert_eq!(budget.items[1].unit_cost, catalog.drywall.unit_cost);
}

#[tokio::test]
async fn saved_budget_is_frozen_against_price_changes() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    let saved = engine
        .save_express_budget(client("Ana"), &input(100.0, 25.0))
        .await
        .unwrap();
    assert_eq!(saved.project.total_cost, 50000.0);
    assert_eq!(saved.project.final_price, 62500.0);
    assert_eq!(saved.items.len(), 1);

    engine
        .update_material_price(catalog.panel.id, 2000.0, None)
        .await
        .unwrap();

    let reloaded = engine.project(saved.project.id).await.unwrap();
    assert_eq!(reloaded.project.total_cost, 50000.0);
    assert_eq!(reloaded.project.margin_amount, 12500.0);
    assert_eq!(reloaded.project.final_price, 62500.0);
    assert_eq!(reloaded.items[0].unit_cost, 1000.0);
    assert_eq!(reloaded.items[0].quantity, 50.0);
    assert_eq!(reloaded.items[0].total_cost, 50000.0);

    let totals = engine.project_totals(saved.project.id).await.unwrap();
    assert_eq!(totals.total_cost, 50000.0);

    let fresh = engine.express_quote(&input(100.0, 25.0)).await.unwrap();
    assert_eq!(fresh.summary.total_cost, 100000.0);
}

#[tokio::test]
async fn express_save_fills_defaults() {
    let (engine, _db) = engine_with_db().await;
    seed_catalog(&engine).await;

    let saved = engine
        .save_express_budget(client("Ana"), &input(120.0, 25.0))
        .await
        .unwrap();
    let project = saved.project;

    assert_eq!(project.project_name, "House Ana - 120m²");
    assert_eq!(
        project.notes.as_deref(),
        Some("Express budget - single-story - standard quality")
    );
    assert_eq!(project.status, ProjectStatus::Draft);
    assert_eq!(project.margin_percentage, 25.0);
    let prefix = format!("SF-{}-", Utc::now().year());
    assert!(project.project_code.starts_with(&prefix));
    assert_eq!(project.project_code.len(), prefix.len() + 3);
    assert_eq!(saved.items[0].item_type, ItemType::Material);
    assert_eq!(saved.items[0].description.as_deref(), Some("Wall panels"));
}

#[tokio::test]
async fn failed_item_insert_rolls_back_the_project() {
    let (engine, db) = engine_with_db().await;
    seed_catalog(&engine).await;

    db.execute_unprepared("DROP TABLE budget_items")
        .await
        .unwrap();

    let err = engine
        .save_express_budget(client("Ana"), &input(100.0, 25.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
    assert!(engine.list_projects(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn save_rejects_invalid_client_data() {
    let (engine, _db) = engine_with_db().await;
    seed_catalog(&engine).await;

    let err = engine
        .save_express_budget(client("A"), &input(100.0, 25.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let err = engine
        .save_express_budget(client("Ana"), &input(100.0, 120.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .save_express_budget(client("Ana"), &input(0.0, 25.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let bad_email = NewProject {
        client_email: Some("ana@".to_string()),
        ..client("Ana")
    };
    assert!(
        engine
            .save_express_budget(bad_email, &input(100.0, 25.0))
            .await
            .is_err()
    );

    assert!(engine.list_projects(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn manual_items_recompute_totals() {
    let (engine, _db) = engine_with_db().await;
    seed_catalog(&engine).await;

    let saved = engine
        .save_express_budget(client("Bruno"), &input(10.0, 10.0))
        .await
        .unwrap();
    assert_eq!(saved.project.total_cost, 5000.0);

    let detail = engine
        .add_budget_item(
            saved.project.id,
            NewBudgetItem {
                category_id: None,
                item_type: ItemType::Labor,
                name: "Assembly crew".to_string(),
                description: None,
                unit: "day".to_string(),
                quantity: 2.0,
                unit_cost: 500.0,
                supplier: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[1].total_cost, 1000.0);
    assert_eq!(detail.project.total_cost, 6000.0);
    assert_eq!(detail.project.margin_amount, 600.0);
    assert_eq!(detail.project.final_price, 6600.0);

    let totals = engine.project_totals(saved.project.id).await.unwrap();
    assert_eq!(totals.cost_by_type.get(&ItemType::Labor), Some(&1000.0));
    assert_eq!(totals.cost_by_type.get(&ItemType::Material), Some(&5000.0));
    assert_eq!(totals.cost_by_category.get(&None), Some(&1000.0));

    let labor_id = detail.items[1].id;
    let detail = engine
        .remove_budget_item(saved.project.id, labor_id)
        .await
        .unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.project.final_price, 5500.0);

    let err = engine
        .remove_budget_item(saved.project.id, labor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn projects_list_status_and_delete() {
    let (engine, _db) = engine_with_db().await;
    seed_catalog(&engine).await;

    let first = engine
        .save_express_budget(client("Ana"), &input(100.0, 25.0))
        .await
        .unwrap();
    let second = engine
        .save_express_budget(
            NewProject {
                project_name: Some("Casa Martínez".to_string()),
                ..client("Jorge")
            },
            &input(80.0, 25.0),
        )
        .await
        .unwrap();

    let all = engine.list_projects(None).await.unwrap();
    assert_eq!(all.len(), 2);

    let found = engine.list_projects(Some("martinez")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, second.project.id);

    let by_code = engine
        .list_projects(Some(&first.project.project_code))
        .await
        .unwrap();
    assert!(by_code.iter().any(|project| project.id == first.project.id));

    let approved = engine
        .set_project_status(first.project.id, ProjectStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, ProjectStatus::Approved);
    assert_eq!(approved.final_price, first.project.final_price);

    engine.delete_project(first.project.id).await.unwrap();
    let err = engine.project(first.project.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(engine.list_projects(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn pricing_config_defaults_and_update() {
    let (engine, _db) = engine_with_db().await;

    let config = engine.pricing_config().await.unwrap();
    assert_eq!(config, PricingConfig::default());
    assert_eq!(config.price_per_m2, 800.0);
    assert_eq!(config.margin_percentage, 25.0);

    let updated = engine
        .update_pricing_config(PricingConfig {
            price_per_m2: 950.0,
            margin_percentage: 30.0,
        })
        .await
        .unwrap();
    assert_eq!(updated.price_per_m2, 950.0);
    assert_eq!(engine.pricing_config().await.unwrap(), updated);

    let err = engine
        .update_pricing_config(PricingConfig {
            price_per_m2: 950.0,
            margin_percentage: 101.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn template_estimate_uses_current_prices() {
    let (engine, _db) = engine_with_db().await;
    let catalog = seed_catalog(&engine).await;

    let template = engine
        .create_template(NewTemplate {
            name: "Cabaña 40".to_string(),
            description: None,
            total_area_m2: 40.0,
            bedrooms: Some(1),
            bathrooms: Some(1),
            floors: 1,
        })
        .await
        .unwrap();

    engine
        .add_template_item(
            template.id,
            NewTemplateItem {
                category_id: Some(catalog.panel.category_id),
                material_id: Some(catalog.panel.id),
                item_type: ItemType::Material,
                name: "Panels".to_string(),
                unit: "unit".to_string(),
                quantity_per_m2: Some(0.5),
                base_quantity: Some(2.0),
                estimated_unit_cost: 900.0,
            },
        )
        .await
        .unwrap();
    engine
        .add_template_item(
            template.id,
            NewTemplateItem {
                category_id: None,
                material_id: None,
                item_type: ItemType::Service,
                name: "Permits".to_string(),
                unit: "global".to_string(),
                quantity_per_m2: None,
                base_quantity: Some(1.0),
                estimated_unit_cost: 300.0,
            },
        )
        .await
        .unwrap();

    let items = engine.template_items(template.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].position, 1);

    let estimate = engine.template_estimate(template.id, None).await.unwrap();
    assert_eq!(estimate.area, 40.0);
    assert_eq!(estimate.items[0].quantity, 22.0);
    assert_eq!(estimate.items[0].unit_cost, 1000.0);
    assert_eq!(estimate.items[1].line_total, 300.0);
    assert_eq!(estimate.summary.total_cost, 22300.0);
    assert_eq!(estimate.summary.margin_percentage, 25.0);
    assert_eq!(estimate.summary.final_price, 27875.0);

    let bigger = engine
        .template_estimate(template.id, Some(100.0))
        .await
        .unwrap();
    assert_eq!(bigger.items[0].quantity, 52.0);

    let err = engine
        .add_template_item(
            template.id,
            NewTemplateItem {
                category_id: None,
                material_id: None,
                item_type: ItemType::Equipment,
                name: "Nothing".to_string(),
                unit: "u".to_string(),
                quantity_per_m2: None,
                base_quantity: None,
                estimated_unit_cost: 1.0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let templates = engine.list_templates(false).await.unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name, "Cabaña 40");
}
