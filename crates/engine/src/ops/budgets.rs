use chrono::{Datelike, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetCalculation, BudgetInput, BudgetItem, EngineError, ItemType, Project, ProjectDetail,
    ProjectStatus, ResultEngine, budget_items, calculate_budget, projects,
    util::{optional_email, optional_text, require_percentage, require_positive, require_text},
};

use super::{Engine, with_tx};

const PROJECT_CODE_PREFIX: &str = "SF";
const PROJECT_CODE_ATTEMPTS: usize = 20;

/// Client data of a project about to be saved.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewProject {
    /// Falls back to `House <client> - <area>m²` for express budgets.
    pub project_name: Option<String>,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub house_template_id: Option<Uuid>,
}

/// `SF-<year>-<NNN>` with a 3 digit suffix taken from `seed`.
pub(crate) fn format_project_code(year: i32, seed: u128) -> String {
    format!("{PROJECT_CODE_PREFIX}-{year}-{:03}", seed % 1000)
}

impl Engine {
    /// Quote an express budget with the active formulas and current catalog prices.
    pub async fn express_quote(&self, input: &BudgetInput) -> ResultEngine<BudgetCalculation> {
        let rows = self.formula_rows().await?;
        Ok(calculate_budget(input, &rows))
    }

    /// Quote and save an express budget in one go.
    pub async fn save_express_budget(
        &self,
        mut project: NewProject,
        input: &BudgetInput,
    ) -> ResultEngine<ProjectDetail> {
        require_positive(input.area, "area")?;
        let client = project.client_name.trim().to_string();
        if project
            .project_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty())
        {
            project.project_name = Some(format!("House {client} - {}m²", input.area));
        }
        if project.notes.is_none() {
            project.notes = Some(format!(
                "Express budget - {} - {} quality",
                input.house_type, input.quality_level
            ));
        }

        let calculation = self.express_quote(input).await?;
        self.save_project(project, &calculation).await
    }

    /// Persist a computed budget as a new draft project.
    ///
    /// The project stores the calculation's totals and one item per line,
    /// copying name, unit, quantity and unit cost. Later catalog changes do not
    /// affect them.
    pub async fn save_project(
        &self,
        project: NewProject,
        calculation: &BudgetCalculation,
    ) -> ResultEngine<ProjectDetail> {
        let project_name = require_text(
            project.project_name.as_deref().unwrap_or_default(),
            3,
            "project name",
        )?;
        let client_name = require_text(&project.client_name, 2, "client name")?;
        let client_email = optional_email(project.client_email.as_deref())?;
        let summary = calculation.summary;
        require_percentage(summary.margin_percentage, "margin percentage")?;

        let detail = with_tx!(self, |db_tx| {
            let project_code = self.unused_project_code(&db_tx).await?;
            let now = Utc::now();
            let project_id = Uuid::new_v4();

            let model = projects::ActiveModel {
                id: ActiveValue::Set(project_id),
                project_name: ActiveValue::Set(project_name),
                project_code: ActiveValue::Set(project_code),
                house_template_id: ActiveValue::Set(project.house_template_id),
                client_name: ActiveValue::Set(client_name),
                client_email: ActiveValue::Set(client_email),
                client_phone: ActiveValue::Set(optional_text(project.client_phone.as_deref())),
                location: ActiveValue::Set(optional_text(project.location.as_deref())),
                status: ActiveValue::Set(ProjectStatus::Draft.as_str().to_string()),
                total_cost: ActiveValue::Set(summary.total_cost),
                margin_percentage: ActiveValue::Set(summary.margin_percentage),
                margin_amount: ActiveValue::Set(summary.margin_amount),
                final_price: ActiveValue::Set(summary.final_price),
                notes: ActiveValue::Set(optional_text(project.notes.as_deref())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            let mut items = Vec::with_capacity(calculation.items.len());
            for (position, line) in calculation.items.iter().enumerate() {
                let item = budget_items::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    project_id: ActiveValue::Set(project_id),
                    category_id: ActiveValue::Set(line.category_id),
                    item_type: ActiveValue::Set(ItemType::Material.as_str().to_string()),
                    name: ActiveValue::Set(line.name.clone()),
                    description: ActiveValue::Set(Some(line.formula_name.clone())),
                    unit: ActiveValue::Set(line.unit.clone()),
                    quantity: ActiveValue::Set(line.quantity),
                    unit_cost: ActiveValue::Set(line.unit_cost),
                    total_cost: ActiveValue::Set(line.line_total),
                    supplier: ActiveValue::Set(None),
                    notes: ActiveValue::Set(None),
                    position: ActiveValue::Set(i32::try_from(position).unwrap_or(i32::MAX)),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
                items.push(BudgetItem::try_from(item)?);
            }

            Ok::<_, EngineError>(ProjectDetail {
                project: Project::try_from(model)?,
                items,
            })
        })?;

        tracing::info!(
            "saved project {} ({} items, final price {})",
            detail.project.project_code,
            detail.items.len(),
            detail.project.final_price
        );
        Ok(detail)
    }

    async fn unused_project_code(&self, db_tx: &DatabaseTransaction) -> ResultEngine<String> {
        let year = Utc::now().year();
        for _ in 0..PROJECT_CODE_ATTEMPTS {
            let code = format_project_code(year, Uuid::new_v4().as_u128());
            let taken = projects::Entity::find()
                .filter(projects::Column::ProjectCode.eq(code.clone()))
                .one(db_tx)
                .await?
                .is_some();
            if !taken {
                return Ok(code);
            }
        }
        Err(EngineError::ExistingKey(format!(
            "no free project code left for {year}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_code_is_zero_padded() {
        assert_eq!(format_project_code(2026, 7), "SF-2026-007");
        assert_eq!(format_project_code(2026, 123_456), "SF-2026-456");
    }
}
