//! Stored express formulas.
//!
//! A stored formula becomes a [`FormulaRow`] once joined with its material and
//! category; see [`ExpressFormula::into_row`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FormulaRow, HouseType, Material, QualityLevel, ResultEngine};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressFormula {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub quantity_per_m2: f64,
    pub house_type: HouseType,
    pub quality_level: QualityLevel,
    pub is_optional: bool,
    pub position: i32,
    pub is_active: bool,
}

impl ExpressFormula {
    /// Join with the material's current price. `category_label` falls back to the formula name.
    pub fn into_row(self, material: Option<&Material>, category_label: Option<&str>) -> FormulaRow {
        FormulaRow {
            id: self.id,
            category_id: self.category_id,
            category_label: category_label.unwrap_or(&self.name).to_string(),
            name: self.name,
            quantity_per_m2: self.quantity_per_m2,
            house_type: self.house_type,
            quality_level: self.quality_level,
            is_optional: self.is_optional,
            material: material.map(Material::as_ref_row),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "express_formulas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub quantity_per_m2: f64,
    pub house_type: String,
    pub quality_level: String,
    pub is_optional: bool,
    pub position: i32,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::materials::Entity",
        from = "Column::MaterialId",
        to = "super::materials::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Material,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::materials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ExpressFormula {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            house_type: HouseType::try_from(model.house_type.as_str())?,
            quality_level: QualityLevel::try_from(model.quality_level.as_str())?,
            name: model.name,
            description: model.description,
            category_id: model.category_id,
            material_id: model.material_id,
            quantity_per_m2: model.quantity_per_m2,
            is_optional: model.is_optional,
            position: model.position,
            is_active: model.is_active,
        })
    }
}
