use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Category, EngineError, Material, PriceChange, ResultEngine, categories, materials,
    price_history,
    util::{normalize_search_key, optional_text, require_positive, require_text},
};

use super::{Engine, next_position, require_material, with_tx};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewMaterial {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub unit_cost: f64,
    pub supplier: Option<String>,
    pub supplier_code: Option<String>,
}

/// Catalog listing filter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MaterialFilter {
    /// Accent and case insensitive substring of the material name.
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Materials of one category, as shown on the price list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialGroup {
    pub category: Category,
    pub materials: Vec<Material>,
}

impl Engine {
    /// All categories in display order.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Position)
            .order_by_asc(categories::Column::NameNorm)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    /// Create a category at the end of the display order.
    pub async fn create_category(&self, new: NewCategory) -> ResultEngine<Category> {
        let name = require_text(&new.name, 2, "category name")?;
        let name_norm = normalize_search_key(&name);
        with_tx!(self, |db_tx| {
            let exists = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let position = next_position::<categories::Entity, _>(
                &db_tx,
                categories::Column::Position,
                |model| model.position,
            )
            .await?;
            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(name_norm),
                description: ActiveValue::Set(optional_text(new.description.as_deref())),
                position: ActiveValue::Set(position),
                icon: ActiveValue::Set(optional_text(new.icon.as_deref())),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(Category::from(model))
        })
    }

    /// Catalog materials ordered by name.
    pub async fn list_materials(&self, filter: &MaterialFilter) -> ResultEngine<Vec<Material>> {
        let mut query = materials::Entity::find();
        if !filter.include_inactive {
            query = query.filter(materials::Column::IsActive.eq(true));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(materials::Column::CategoryId.eq(category_id));
        }
        if let Some(search) = filter.search.as_deref() {
            let key = normalize_search_key(search);
            if !key.is_empty() {
                query = query.filter(materials::Column::NameNorm.contains(key.as_str()));
            }
        }

        let models = query
            .order_by_asc(materials::Column::NameNorm)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Material::from).collect())
    }

    /// Filtered materials grouped by category, in category order.
    ///
    /// Categories without matching materials are left out.
    pub async fn materials_by_category(
        &self,
        filter: &MaterialFilter,
    ) -> ResultEngine<Vec<MaterialGroup>> {
        let categories = self.list_categories().await?;
        let mut materials = self.list_materials(filter).await?;

        let mut groups = Vec::new();
        for category in categories {
            let (matching, rest): (Vec<Material>, Vec<Material>) = materials
                .into_iter()
                .partition(|material| material.category_id == category.id);
            materials = rest;
            if !matching.is_empty() {
                groups.push(MaterialGroup {
                    category,
                    materials: matching,
                });
            }
        }
        Ok(groups)
    }

    pub async fn material(&self, material_id: Uuid) -> ResultEngine<Material> {
        require_material(&self.database, material_id)
            .await
            .map(Material::from)
    }

    /// Add a material to the catalog. Names are unique within a category.
    pub async fn create_material(&self, new: NewMaterial) -> ResultEngine<Material> {
        let name = require_text(&new.name, 2, "material name")?;
        let unit = require_text(&new.unit, 1, "unit")?;
        let unit_cost = require_positive(new.unit_cost, "unit cost")?;
        let name_norm = normalize_search_key(&name);

        with_tx!(self, |db_tx| {
            categories::Entity::find_by_id(new.category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("category {}", new.category_id)))?;

            let exists = materials::Entity::find()
                .filter(materials::Column::CategoryId.eq(new.category_id))
                .filter(materials::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let now = Utc::now();
            let model = materials::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                category_id: ActiveValue::Set(new.category_id),
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(name_norm),
                description: ActiveValue::Set(optional_text(new.description.as_deref())),
                unit: ActiveValue::Set(unit),
                unit_cost: ActiveValue::Set(unit_cost),
                supplier: ActiveValue::Set(optional_text(new.supplier.as_deref())),
                supplier_code: ActiveValue::Set(optional_text(new.supplier_code.as_deref())),
                last_update: ActiveValue::Set(now),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(Material::from(model))
        })
    }

    /// Change the current catalog price of a material.
    ///
    /// The old and new price are recorded in the price history. Saved projects
    /// are not touched.
    pub async fn update_material_price(
        &self,
        material_id: Uuid,
        new_cost: f64,
        notes: Option<&str>,
    ) -> ResultEngine<PriceChange> {
        let new_cost = require_positive(new_cost, "unit cost")?;
        let notes = optional_text(notes);

        let change = with_tx!(self, |db_tx| {
            let material = require_material(&db_tx, material_id).await?;
            let now = Utc::now();

            let change = price_history::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                material_id: ActiveValue::Set(material_id),
                old_price: ActiveValue::Set(material.unit_cost),
                new_price: ActiveValue::Set(new_cost),
                changed_at: ActiveValue::Set(now),
                notes: ActiveValue::Set(notes),
            }
            .insert(&db_tx)
            .await?;

            materials::ActiveModel {
                id: ActiveValue::Set(material_id),
                unit_cost: ActiveValue::Set(new_cost),
                last_update: ActiveValue::Set(now),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok::<_, EngineError>(PriceChange::from(change))
        })?;

        tracing::info!(
            "material {material_id} price changed {} -> {}",
            change.old_price,
            change.new_price
        );
        Ok(change)
    }

    /// Price changes of a material, newest first.
    pub async fn price_history(&self, material_id: Uuid) -> ResultEngine<Vec<PriceChange>> {
        require_material(&self.database, material_id).await?;
        let models = price_history::Entity::find()
            .filter(price_history::Column::MaterialId.eq(material_id))
            .order_by_desc(price_history::Column::ChangedAt)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(PriceChange::from).collect())
    }

    /// Hide/show a material in catalog listings.
    ///
    /// Formulas keep pricing an inactive material; retire the formula itself
    /// with [`Engine::set_formula_active`] to drop its quote lines.
    pub async fn set_material_active(&self, material_id: Uuid, active: bool) -> ResultEngine<Material> {
        with_tx!(self, |db_tx| {
            require_material(&db_tx, material_id).await?;
            let model = materials::ActiveModel {
                id: ActiveValue::Set(material_id),
                is_active: ActiveValue::Set(active),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(Material::from(model))
        })
    }
}
