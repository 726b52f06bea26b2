//! Saved budget lines.
//!
//! A budget item is a snapshot: name, unit, quantity and unit cost are copied
//! when the project is saved and never follow later catalog edits.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Material,
    Labor,
    Equipment,
    Service,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Labor => "labor",
            Self::Equipment => "equipment",
            Self::Service => "service",
        }
    }
}

impl TryFrom<&str> for ItemType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "material" => Ok(Self::Material),
            "labor" => Ok(Self::Labor),
            "equipment" => Ok(Self::Equipment),
            "service" => Ok(Self::Service),
            other => Err(EngineError::InvalidInput(format!(
                "invalid item type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub category_id: Option<Uuid>,
    pub item_type: ItemType,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub category_id: Option<Uuid>,
    pub item_type: String,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub position: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for BudgetItem {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            project_id: model.project_id,
            category_id: model.category_id,
            item_type: ItemType::try_from(model.item_type.as_str())?,
            name: model.name,
            description: model.description,
            unit: model.unit,
            quantity: model.quantity,
            unit_cost: model.unit_cost,
            total_cost: model.total_cost,
            supplier: model.supplier,
            notes: model.notes,
            position: model.position,
            created_at: model.created_at,
        })
    }
}
