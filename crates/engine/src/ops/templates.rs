use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetSummary, EngineError, HouseTemplate, ItemType, ResultEngine, TemplateItem, materials,
    round_up_quantity,
    templates::{house_templates, template_items},
    util::{optional_text, require_non_negative, require_positive, require_text},
};

use super::{Engine, require_material, settings::load_pricing_config, with_tx};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub total_area_m2: f64,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub floors: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTemplateItem {
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub item_type: ItemType,
    pub name: String,
    pub unit: String,
    pub quantity_per_m2: Option<f64>,
    pub base_quantity: Option<f64>,
    pub estimated_unit_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateEstimateLine {
    pub name: String,
    pub item_type: ItemType,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub line_total: f64,
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
}

/// A template priced for a given area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateEstimate {
    pub template: HouseTemplate,
    pub area: f64,
    pub items: Vec<TemplateEstimateLine>,
    pub summary: BudgetSummary,
}

async fn require_template(
    db: &impl ConnectionTrait,
    template_id: Uuid,
) -> ResultEngine<house_templates::Model> {
    house_templates::Entity::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("template {template_id}")))
}

fn validate_optional_quantity(value: Option<f64>, label: &str) -> ResultEngine<Option<f64>> {
    value.map(|v| require_non_negative(v, label)).transpose()
}

impl Engine {
    pub async fn create_template(&self, new: NewTemplate) -> ResultEngine<HouseTemplate> {
        let name = require_text(&new.name, 3, "template name")?;
        let total_area_m2 = require_positive(new.total_area_m2, "total area")?;
        if new.floors < 1 {
            return Err(EngineError::InvalidAmount(
                "a template needs at least 1 floor".to_string(),
            ));
        }
        if new.bedrooms.is_some_and(|n| n < 0) || new.bathrooms.is_some_and(|n| n < 0) {
            return Err(EngineError::InvalidAmount(
                "room counts must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let now = Utc::now();
            let model = house_templates::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(optional_text(new.description.as_deref())),
                total_area_m2: ActiveValue::Set(total_area_m2),
                bedrooms: ActiveValue::Set(new.bedrooms),
                bathrooms: ActiveValue::Set(new.bathrooms),
                floors: ActiveValue::Set(new.floors),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(HouseTemplate::from(model))
        })
    }

    pub async fn list_templates(&self, include_inactive: bool) -> ResultEngine<Vec<HouseTemplate>> {
        let mut query = house_templates::Entity::find();
        if !include_inactive {
            query = query.filter(house_templates::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(house_templates::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(HouseTemplate::from).collect())
    }

    pub async fn add_template_item(
        &self,
        template_id: Uuid,
        new: NewTemplateItem,
    ) -> ResultEngine<TemplateItem> {
        let name = require_text(&new.name, 2, "item name")?;
        let unit = require_text(&new.unit, 1, "unit")?;
        let quantity_per_m2 = validate_optional_quantity(new.quantity_per_m2, "quantity per m2")?;
        let base_quantity = validate_optional_quantity(new.base_quantity, "base quantity")?;
        if quantity_per_m2.is_none() && base_quantity.is_none() {
            return Err(EngineError::InvalidAmount(
                "provide quantity_per_m2 or base_quantity".to_string(),
            ));
        }
        let estimated_unit_cost =
            require_non_negative(new.estimated_unit_cost, "estimated unit cost")?;

        with_tx!(self, |db_tx| {
            require_template(&db_tx, template_id).await?;
            if let Some(material_id) = new.material_id {
                require_material(&db_tx, material_id).await?;
            }
            let position = template_items::Entity::find()
                .filter(template_items::Column::HouseTemplateId.eq(template_id))
                .order_by_desc(template_items::Column::Position)
                .one(&db_tx)
                .await?
                .map_or(0, |last| last.position + 1);

            let model = template_items::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                house_template_id: ActiveValue::Set(template_id),
                category_id: ActiveValue::Set(new.category_id),
                material_id: ActiveValue::Set(new.material_id),
                item_type: ActiveValue::Set(new.item_type.as_str().to_string()),
                name: ActiveValue::Set(name),
                unit: ActiveValue::Set(unit),
                quantity_per_m2: ActiveValue::Set(quantity_per_m2),
                base_quantity: ActiveValue::Set(base_quantity),
                estimated_unit_cost: ActiveValue::Set(estimated_unit_cost),
                position: ActiveValue::Set(position),
            }
            .insert(&db_tx)
            .await?;
            TemplateItem::try_from(model)
        })
    }

    pub async fn template_items(&self, template_id: Uuid) -> ResultEngine<Vec<TemplateItem>> {
        require_template(&self.database, template_id).await?;
        template_items::Entity::find()
            .filter(template_items::Column::HouseTemplateId.eq(template_id))
            .order_by_asc(template_items::Column::Position)
            .all(&self.database)
            .await?
            .into_iter()
            .map(TemplateItem::try_from)
            .collect()
    }

    /// Price a template for `area` (defaults to the template's own area).
    ///
    /// Linked materials use their current catalog price; other lines use the
    /// template's estimated cost. The configured default margin is applied.
    pub async fn template_estimate(
        &self,
        template_id: Uuid,
        area: Option<f64>,
    ) -> ResultEngine<TemplateEstimate> {
        let template = HouseTemplate::from(require_template(&self.database, template_id).await?);
        let area = match area {
            Some(area) => require_positive(area, "area")?,
            None => template.total_area_m2,
        };
        let items = self.template_items(template_id).await?;
        let pricing = load_pricing_config(&self.database).await?;

        let material_ids: Vec<Uuid> = items.iter().filter_map(|item| item.material_id).collect();
        let prices: HashMap<Uuid, f64> = materials::Entity::find()
            .filter(materials::Column::Id.is_in(material_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|material| (material.id, material.unit_cost))
            .collect();

        let lines: Vec<TemplateEstimateLine> = items
            .into_iter()
            .map(|item| {
                let quantity = round_up_quantity(item.raw_quantity(area));
                let unit_cost = item
                    .material_id
                    .and_then(|id| prices.get(&id).copied())
                    .unwrap_or(item.estimated_unit_cost);
                TemplateEstimateLine {
                    quantity,
                    unit_cost,
                    line_total: quantity * unit_cost,
                    name: item.name,
                    item_type: item.item_type,
                    unit: item.unit,
                    category_id: item.category_id,
                    material_id: item.material_id,
                }
            })
            .collect();

        let total_cost = lines.iter().map(|line| line.line_total).sum();
        Ok(TemplateEstimate {
            template,
            area,
            items: lines,
            summary: BudgetSummary::from_total_cost(total_cost, pricing.margin_percentage),
        })
    }
}
