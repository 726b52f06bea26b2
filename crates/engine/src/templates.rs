//! Reusable house templates and their item lists.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ItemType, ResultEngine};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_area_m2: f64,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub floors: i32,
    pub is_active: bool,
}

/// One line of a template.
///
/// The quantity for an area is `base_quantity + quantity_per_m2 * area`; a
/// missing term counts as zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub id: Uuid,
    pub template_id: Uuid,
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub item_type: ItemType,
    pub name: String,
    pub unit: String,
    pub quantity_per_m2: Option<f64>,
    pub base_quantity: Option<f64>,
    pub estimated_unit_cost: f64,
    pub position: i32,
}

impl TemplateItem {
    #[must_use]
    pub fn raw_quantity(&self, area: f64) -> f64 {
        self.base_quantity.unwrap_or(0.0) + self.quantity_per_m2.unwrap_or(0.0) * area
    }
}

pub mod house_templates {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "house_templates")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub total_area_m2: f64,
        pub bedrooms: Option<i32>,
        pub bathrooms: Option<i32>,
        pub floors: i32,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::template_items::Entity")]
        Items,
    }

    impl Related<super::template_items::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for HouseTemplate {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
                description: model.description,
                total_area_m2: model.total_area_m2,
                bedrooms: model.bedrooms,
                bathrooms: model.bathrooms,
                floors: model.floors,
                is_active: model.is_active,
            }
        }
    }
}

pub mod template_items {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "template_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub house_template_id: Uuid,
        pub category_id: Option<Uuid>,
        pub material_id: Option<Uuid>,
        pub item_type: String,
        pub name: String,
        pub unit: String,
        pub quantity_per_m2: Option<f64>,
        pub base_quantity: Option<f64>,
        pub estimated_unit_cost: f64,
        pub position: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::house_templates::Entity",
            from = "Column::HouseTemplateId",
            to = "super::house_templates::Column::Id",
            on_update = "NoAction",
            on_delete = "Cascade"
        )]
        Template,
        #[sea_orm(
            belongs_to = "crate::materials::Entity",
            from = "Column::MaterialId",
            to = "crate::materials::Column::Id",
            on_update = "NoAction",
            on_delete = "SetNull"
        )]
        Material,
    }

    impl Related<super::house_templates::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Template.def()
        }
    }

    impl Related<crate::materials::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Material.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl TryFrom<Model> for TemplateItem {
        type Error = EngineError;

        fn try_from(model: Model) -> ResultEngine<Self> {
            Ok(Self {
                id: model.id,
                template_id: model.house_template_id,
                category_id: model.category_id,
                material_id: model.material_id,
                item_type: ItemType::try_from(model.item_type.as_str())?,
                name: model.name,
                unit: model.unit,
                quantity_per_m2: model.quantity_per_m2,
                base_quantity: model.base_quantity,
                estimated_unit_cost: model.estimated_unit_cost,
                position: model.position,
            })
        }
    }
}
