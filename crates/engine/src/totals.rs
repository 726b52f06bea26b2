//! Project-level arithmetic over saved budget items.
//!
//! Unlike [`crate::express`], these helpers work on the frozen item snapshots
//! of a project and never look at current catalog prices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BudgetItem, ItemType};

/// Totals and breakdowns of a saved project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub total_cost: f64,
    pub margin_amount: f64,
    pub final_price: f64,
    /// Cost per category id; items without a category are keyed by `None`.
    pub cost_by_category: BTreeMap<Option<Uuid>, f64>,
    pub cost_by_type: BTreeMap<ItemType, f64>,
}

#[must_use]
pub fn calculate_item_total(quantity: f64, unit_cost: f64) -> f64 {
    quantity * unit_cost
}

/// Margin (in percent) that turns `cost` into `price`. `0` when `cost` is `0`.
#[must_use]
pub fn calculate_profit_margin(cost: f64, price: f64) -> f64 {
    if cost == 0.0 {
        return 0.0;
    }
    (price - cost) / cost * 100.0
}

#[must_use]
pub fn calculate_price_from_margin(cost: f64, margin_percentage: f64) -> f64 {
    cost * (1.0 + margin_percentage / 100.0)
}

pub fn calculate_project_totals(items: &[BudgetItem], margin_percentage: f64) -> ProjectTotals {
    let mut cost_by_category: BTreeMap<Option<Uuid>, f64> = BTreeMap::new();
    let mut cost_by_type: BTreeMap<ItemType, f64> = BTreeMap::new();
    let mut total_cost = 0.0;

    for item in items {
        total_cost += item.total_cost;
        *cost_by_category.entry(item.category_id).or_insert(0.0) += item.total_cost;
        *cost_by_type.entry(item.item_type).or_insert(0.0) += item.total_cost;
    }

    let margin_amount = total_cost * margin_percentage / 100.0;
    ProjectTotals {
        total_cost,
        margin_amount,
        final_price: total_cost + margin_amount,
        cost_by_category,
        cost_by_type,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(category_id: Option<Uuid>, item_type: ItemType, total_cost: f64) -> BudgetItem {
        BudgetItem {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            category_id,
            item_type,
            name: "Item".to_string(),
            description: None,
            unit: "u".to_string(),
            quantity: 1.0,
            unit_cost: total_cost,
            total_cost,
            supplier: None,
            notes: None,
            position: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn totals_group_by_category_and_type() {
        let structure = Some(Uuid::new_v4());
        let items = vec![
            item(structure, ItemType::Material, 100.0),
            item(structure, ItemType::Labor, 50.0),
            item(None, ItemType::Material, 25.0),
        ];

        let totals = calculate_project_totals(&items, 20.0);
        assert_eq!(totals.total_cost, 175.0);
        assert_eq!(totals.margin_amount, 35.0);
        assert_eq!(totals.final_price, 210.0);
        assert_eq!(totals.cost_by_category[&structure], 150.0);
        assert_eq!(totals.cost_by_category[&None], 25.0);
        assert_eq!(totals.cost_by_type[&ItemType::Material], 125.0);
        assert_eq!(totals.cost_by_type[&ItemType::Labor], 50.0);
    }

    #[test]
    fn empty_project_has_zero_totals() {
        let totals = calculate_project_totals(&[], 25.0);
        assert_eq!(totals, ProjectTotals::default());
    }

    #[test]
    fn margin_helpers_are_inverse() {
        assert_eq!(calculate_profit_margin(0.0, 10.0), 0.0);
        assert_eq!(calculate_profit_margin(100.0, 125.0), 25.0);
        assert_eq!(calculate_price_from_margin(100.0, 25.0), 125.0);
        assert_eq!(calculate_item_total(2.5, 4.0), 10.0);
    }
}
