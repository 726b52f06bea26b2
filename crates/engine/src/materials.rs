//! Catalog materials and their current reference price.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MaterialRef;

/// A material of the price catalog.
///
/// `unit_cost` is the *current* price: express quotes read it, saved projects
/// never do (they keep their own snapshot).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub unit_cost: f64,
    pub supplier: Option<String>,
    pub supplier_code: Option<String>,
    pub last_update: DateTime<Utc>,
    pub is_active: bool,
}

impl Material {
    /// The slice of the material a formula row needs.
    pub fn as_ref_row(&self) -> MaterialRef {
        MaterialRef {
            id: self.id,
            name: self.name.clone(),
            unit: self.unit.clone(),
            unit_cost: self.unit_cost,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub description: Option<String>,
    pub unit: String,
    pub unit_cost: f64,
    pub supplier: Option<String>,
    pub supplier_code: Option<String>,
    pub last_update: DateTimeUtc,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(has_many = "super::price_history::Entity")]
    PriceHistory,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Material {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            description: model.description,
            unit: model.unit,
            unit_cost: model.unit_cost,
            supplier: model.supplier,
            supplier_code: model.supplier_code,
            last_update: model.last_update,
            is_active: model.is_active,
        }
    }
}
