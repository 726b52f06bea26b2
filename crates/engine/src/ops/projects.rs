use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetItem, EngineError, ItemType, Project, ProjectDetail, ProjectStatus, ProjectTotals,
    ResultEngine, budget_items, calculate_item_total, calculate_project_totals, projects,
    util::{normalize_search_key, optional_text, require_positive, require_text},
};

use super::{Engine, with_tx};

/// A manually added budget line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewBudgetItem {
    pub category_id: Option<Uuid>,
    pub item_type: ItemType,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

async fn require_project(db: &impl ConnectionTrait, project_id: Uuid) -> ResultEngine<projects::Model> {
    projects::Entity::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("project {project_id}")))
}

async fn project_items(db: &impl ConnectionTrait, project_id: Uuid) -> ResultEngine<Vec<BudgetItem>> {
    budget_items::Entity::find()
        .filter(budget_items::Column::ProjectId.eq(project_id))
        .order_by_asc(budget_items::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(BudgetItem::try_from)
        .collect()
}

fn matches_search(project: &Project, key: &str) -> bool {
    [
        project.project_name.as_str(),
        project.client_name.as_str(),
        project.project_code.as_str(),
    ]
    .iter()
    .any(|field| normalize_search_key(field).contains(key))
}

impl Engine {
    /// Saved projects, newest first, optionally filtered by name, client or code.
    pub async fn list_projects(&self, search: Option<&str>) -> ResultEngine<Vec<Project>> {
        let projects: Vec<Project> = projects::Entity::find()
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Project::try_from)
            .collect::<ResultEngine<_>>()?;

        let key = search.map(normalize_search_key).unwrap_or_default();
        if key.is_empty() {
            return Ok(projects);
        }
        Ok(projects
            .into_iter()
            .filter(|project| matches_search(project, &key))
            .collect())
    }

    pub async fn project(&self, project_id: Uuid) -> ResultEngine<ProjectDetail> {
        let model = require_project(&self.database, project_id).await?;
        let items = project_items(&self.database, project_id).await?;
        Ok(ProjectDetail {
            project: Project::try_from(model)?,
            items,
        })
    }

    /// Delete a project and its items.
    pub async fn delete_project(&self, project_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_project(&db_tx, project_id).await?;
            budget_items::Entity::delete_many()
                .filter(budget_items::Column::ProjectId.eq(project_id))
                .exec(&db_tx)
                .await?;
            projects::Entity::delete_by_id(project_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn set_project_status(
        &self,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> ResultEngine<Project> {
        with_tx!(self, |db_tx| {
            require_project(&db_tx, project_id).await?;
            let model = projects::ActiveModel {
                id: ActiveValue::Set(project_id),
                status: ActiveValue::Set(status.as_str().to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Project::try_from(model)
        })
    }

    /// Append a manual line and refresh the project's totals from its items.
    pub async fn add_budget_item(
        &self,
        project_id: Uuid,
        new: NewBudgetItem,
    ) -> ResultEngine<ProjectDetail> {
        let name = require_text(&new.name, 2, "item name")?;
        let unit = require_text(&new.unit, 1, "unit")?;
        let quantity = require_positive(new.quantity, "quantity")?;
        let unit_cost = require_positive(new.unit_cost, "unit cost")?;

        with_tx!(self, |db_tx| {
            let project = require_project(&db_tx, project_id).await?;
            let position = budget_items::Entity::find()
                .filter(budget_items::Column::ProjectId.eq(project_id))
                .order_by_desc(budget_items::Column::Position)
                .one(&db_tx)
                .await?
                .map_or(0, |last| last.position + 1);

            let now = Utc::now();
            budget_items::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                project_id: ActiveValue::Set(project_id),
                category_id: ActiveValue::Set(new.category_id),
                item_type: ActiveValue::Set(new.item_type.as_str().to_string()),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(optional_text(new.description.as_deref())),
                unit: ActiveValue::Set(unit),
                quantity: ActiveValue::Set(quantity),
                unit_cost: ActiveValue::Set(unit_cost),
                total_cost: ActiveValue::Set(calculate_item_total(quantity, unit_cost)),
                supplier: ActiveValue::Set(optional_text(new.supplier.as_deref())),
                notes: ActiveValue::Set(optional_text(new.notes.as_deref())),
                position: ActiveValue::Set(position),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            Self::refresh_project_totals(&db_tx, project).await
        })
    }

    /// Remove a line and refresh the project's totals from the remaining items.
    pub async fn remove_budget_item(
        &self,
        project_id: Uuid,
        item_id: Uuid,
    ) -> ResultEngine<ProjectDetail> {
        with_tx!(self, |db_tx| {
            let project = require_project(&db_tx, project_id).await?;
            let result = budget_items::Entity::delete_many()
                .filter(budget_items::Column::Id.eq(item_id))
                .filter(budget_items::Column::ProjectId.eq(project_id))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(format!("budget item {item_id}")));
            }
            Self::refresh_project_totals(&db_tx, project).await
        })
    }

    /// Cost breakdown of a saved project, from its own item snapshots.
    pub async fn project_totals(&self, project_id: Uuid) -> ResultEngine<ProjectTotals> {
        let project = require_project(&self.database, project_id).await?;
        let items = project_items(&self.database, project_id).await?;
        Ok(calculate_project_totals(&items, project.margin_percentage))
    }

    async fn refresh_project_totals(
        db_tx: &DatabaseTransaction,
        project: projects::Model,
    ) -> ResultEngine<ProjectDetail> {
        let items = project_items(db_tx, project.id).await?;
        let totals = calculate_project_totals(&items, project.margin_percentage);

        let model = projects::ActiveModel {
            id: ActiveValue::Set(project.id),
            total_cost: ActiveValue::Set(totals.total_cost),
            margin_amount: ActiveValue::Set(totals.margin_amount),
            final_price: ActiveValue::Set(totals.final_price),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .update(db_tx)
        .await?;

        Ok(ProjectDetail {
            project: Project::try_from(model)?,
            items,
        })
    }
}
