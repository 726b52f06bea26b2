use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ExpressFormula, FormulaRow, HouseType, Material, QualityLevel, ResultEngine,
    categories, formulas, materials,
    util::{optional_text, require_non_negative, require_text},
};

use super::{Engine, next_position, require_material, with_tx};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewFormula {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub quantity_per_m2: f64,
    pub house_type: HouseType,
    pub quality_level: QualityLevel,
    #[serde(default)]
    pub is_optional: bool,
}

/// A stored formula with the material and category label it resolves to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormulaView {
    pub formula: ExpressFormula,
    pub material: Option<Material>,
    pub category_label: Option<String>,
}

impl FormulaView {
    /// The calculator input for this formula, priced with the current catalog.
    pub fn row(&self) -> FormulaRow {
        self.formula
            .clone()
            .into_row(self.material.as_ref(), self.category_label.as_deref())
    }
}

/// Load formulas ordered by position, joined with their material and category name.
pub(super) async fn load_formulas<C: ConnectionTrait>(
    conn: &C,
    include_inactive: bool,
) -> ResultEngine<Vec<FormulaView>> {
    let mut query = formulas::Entity::find();
    if !include_inactive {
        query = query.filter(formulas::Column::IsActive.eq(true));
    }
    let rows = query
        .order_by_asc(formulas::Column::Position)
        .find_also_related(materials::Entity)
        .all(conn)
        .await?;

    let labels: HashMap<Uuid, String> = categories::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    rows.into_iter()
        .map(|(model, material)| -> ResultEngine<FormulaView> {
            let formula = ExpressFormula::try_from(model)?;
            let category_label = formula
                .category_id
                .and_then(|id| labels.get(&id).cloned());
            Ok(FormulaView {
                formula,
                material: material.map(Material::from),
                category_label,
            })
        })
        .collect()
}

impl Engine {
    /// Stored formulas in evaluation order.
    pub async fn list_formulas(&self, include_inactive: bool) -> ResultEngine<Vec<FormulaView>> {
        load_formulas(&self.database, include_inactive).await
    }

    /// Calculator rows for every active formula.
    pub async fn formula_rows(&self) -> ResultEngine<Vec<FormulaRow>> {
        Ok(self
            .list_formulas(false)
            .await?
            .iter()
            .map(FormulaView::row)
            .collect())
    }

    /// Append a formula to the evaluation order.
    pub async fn create_formula(&self, new: NewFormula) -> ResultEngine<ExpressFormula> {
        let name = require_text(&new.name, 1, "formula name")?;
        let quantity_per_m2 = require_non_negative(new.quantity_per_m2, "quantity per m2")?;

        with_tx!(self, |db_tx| {
            if let Some(material_id) = new.material_id {
                require_material(&db_tx, material_id).await?;
            }
            if let Some(category_id) = new.category_id {
                categories::Entity::find_by_id(category_id)
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound(format!("category {category_id}")))?;
            }

            let position = next_position::<formulas::Entity, _>(
                &db_tx,
                formulas::Column::Position,
                |model| model.position,
            )
            .await?;
            let model = formulas::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(optional_text(new.description.as_deref())),
                category_id: ActiveValue::Set(new.category_id),
                material_id: ActiveValue::Set(new.material_id),
                quantity_per_m2: ActiveValue::Set(quantity_per_m2),
                house_type: ActiveValue::Set(new.house_type.as_str().to_string()),
                quality_level: ActiveValue::Set(new.quality_level.as_str().to_string()),
                is_optional: ActiveValue::Set(new.is_optional),
                position: ActiveValue::Set(position),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            ExpressFormula::try_from(model)
        })
    }

    /// Enable/disable a formula. Inactive formulas are ignored by express quotes.
    pub async fn set_formula_active(
        &self,
        formula_id: Uuid,
        active: bool,
    ) -> ResultEngine<ExpressFormula> {
        with_tx!(self, |db_tx| {
            formulas::Entity::find_by_id(formula_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("formula {formula_id}")))?;
            let model = formulas::ActiveModel {
                id: ActiveValue::Set(formula_id),
                is_active: ActiveValue::Set(active),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            ExpressFormula::try_from(model)
        })
    }
}
