//! Express budget calculator.
//!
//! An express budget turns a floor area into a list of materials by walking
//! the configured formula rows. Each row maps square meters to a quantity of
//! one catalog material and may be restricted to a house type, a quality
//! level, or be an optional extra the user toggles on.
//!
//! [`calculate_budget`] is a pure function: it never touches the database and
//! callers invoke it again whenever any input changes.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashSet;
//! use engine::{BudgetInput, FormulaRow, HouseType, MaterialRef, QualityLevel, calculate_budget};
//! use uuid::Uuid;
//!
//! let row = FormulaRow {
//!     id: Uuid::new_v4(),
//!     name: "Steel frame".to_string(),
//!     category_id: None,
//!     category_label: "Structure".to_string(),
//!     quantity_per_m2: 0.5,
//!     house_type: HouseType::Any,
//!     quality_level: QualityLevel::Any,
//!     is_optional: false,
//!     material: Some(MaterialRef {
//!         id: Uuid::new_v4(),
//!         name: "PGC 100".to_string(),
//!         unit: "m".to_string(),
//!         unit_cost: 1000.0,
//!     }),
//! };
//! let input = BudgetInput {
//!     area: 100.0,
//!     house_type: HouseType::SingleStory,
//!     quality_level: QualityLevel::Standard,
//!     optional_selections: HashSet::new(),
//!     margin_percentage: 25.0,
//! };
//!
//! let budget = calculate_budget(&input, &[row]);
//! assert_eq!(budget.items[0].quantity, 50.0);
//! assert_eq!(budget.summary.final_price, 62_500.0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Number of stories a formula row applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HouseType {
    #[default]
    SingleStory,
    TwoStory,
    /// Wildcard: the row applies to every house type.
    Any,
}

impl HouseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleStory => "single-story",
            Self::TwoStory => "two-story",
            Self::Any => "any",
        }
    }

    /// Returns `true` when a row scoped to `self` applies to the `selected` house.
    #[must_use]
    pub fn matches(self, selected: HouseType) -> bool {
        self == HouseType::Any || self == selected
    }
}

impl core::fmt::Display for HouseType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HouseType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single-story" => Ok(Self::SingleStory),
            "two-story" => Ok(Self::TwoStory),
            "any" => Ok(Self::Any),
            other => Err(EngineError::InvalidInput(format!(
                "invalid house type: {other}"
            ))),
        }
    }
}

/// Finish quality a formula row applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityLevel {
    Basic,
    #[default]
    Standard,
    Premium,
    /// Wildcard: the row applies to every quality level.
    Any,
}

impl QualityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Any => "any",
        }
    }

    /// Returns `true` when a row scoped to `self` applies to the `selected` quality.
    #[must_use]
    pub fn matches(self, selected: QualityLevel) -> bool {
        self == QualityLevel::Any || self == selected
    }
}

impl core::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for QualityLevel {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            "any" => Ok(Self::Any),
            other => Err(EngineError::InvalidInput(format!(
                "invalid quality level: {other}"
            ))),
        }
    }
}

/// The catalog material a formula row points at, as seen at calculation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialRef {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
}

/// One express formula, joined with its material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormulaRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub category_label: String,
    /// Material quantity required per square meter of floor area.
    pub quantity_per_m2: f64,
    pub house_type: HouseType,
    pub quality_level: QualityLevel,
    pub is_optional: bool,
    /// `None` when the formula has no material attached; such rows are skipped.
    pub material: Option<MaterialRef>,
}

impl FormulaRow {
    /// Selection rule: enabled (mandatory or toggled on), scope matches, material present.
    fn applies_to(&self, input: &BudgetInput) -> bool {
        (!self.is_optional || input.optional_selections.contains(&self.id))
            && self.house_type.matches(input.house_type)
            && self.quality_level.matches(input.quality_level)
            && self.material.is_some()
    }
}

/// Parameters of an express budget.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetInput {
    /// Total floor area in square meters.
    pub area: f64,
    pub house_type: HouseType,
    pub quality_level: QualityLevel,
    /// Ids of the optional formula rows currently enabled.
    pub optional_selections: HashSet<Uuid>,
    /// Margin in percent, normally within `0..=100` (not clamped here).
    pub margin_percentage: f64,
}

/// A computed material line of a budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationLineItem {
    /// Material name.
    pub name: String,
    /// Name of the formula that produced this line.
    pub formula_name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub line_total: f64,
    pub category_id: Option<Uuid>,
    pub category_label: String,
    pub material_id: Uuid,
}

/// Totals of a budget.
///
/// `final_price == total_cost + margin_amount` always holds; totals are never rounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_cost: f64,
    pub margin_percentage: f64,
    pub margin_amount: f64,
    pub final_price: f64,
}

impl BudgetSummary {
    /// Applies `margin_percentage` on top of `total_cost`.
    #[must_use]
    pub fn from_total_cost(total_cost: f64, margin_percentage: f64) -> Self {
        let margin_amount = total_cost * margin_percentage / 100.0;
        Self {
            total_cost,
            margin_percentage,
            margin_amount,
            final_price: total_cost + margin_amount,
        }
    }
}

/// Line items plus summary, the full output of [`calculate_budget`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetCalculation {
    pub items: Vec<CalculationLineItem>,
    pub summary: BudgetSummary,
}

impl BudgetCalculation {
    fn empty(margin_percentage: f64) -> Self {
        Self {
            items: Vec::new(),
            summary: BudgetSummary {
                margin_percentage,
                ..BudgetSummary::default()
            },
        }
    }

    /// Final price per square meter, `0` for a non-positive area.
    #[must_use]
    pub fn price_per_m2(&self, area: f64) -> f64 {
        if area > 0.0 && area.is_finite() {
            self.summary.final_price / area
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Rounds a quantity up to two decimals.
#[must_use]
pub fn round_up_quantity(raw: f64) -> f64 {
    (raw * 100.0).ceil() / 100.0
}

/// Computes an express budget from `rows` for the given `input`.
///
/// Rows are evaluated in order. A missing or non-positive area, or an empty row
/// set, yields an empty calculation with zero totals.
pub fn calculate_budget(input: &BudgetInput, rows: &[FormulaRow]) -> BudgetCalculation {
    if !(input.area.is_finite() && input.area > 0.0) || rows.is_empty() {
        return BudgetCalculation::empty(input.margin_percentage);
    }

    let items: Vec<CalculationLineItem> = rows
        .iter()
        .filter(|row| row.applies_to(input))
        .filter_map(|row| {
            let material = row.material.as_ref()?;
            let quantity = round_up_quantity(input.area * row.quantity_per_m2);
            Some(CalculationLineItem {
                name: material.name.clone(),
                formula_name: row.name.clone(),
                quantity,
                unit: material.unit.clone(),
                unit_cost: material.unit_cost,
                line_total: quantity * material.unit_cost,
                category_id: row.category_id,
                category_label: row.category_label.clone(),
                material_id: material.id,
            })
        })
        .collect();

    let total_cost = items.iter().map(|item| item.line_total).sum();

    BudgetCalculation {
        items,
        summary: BudgetSummary::from_total_cost(total_cost, input.margin_percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(unit_cost: f64) -> MaterialRef {
        MaterialRef {
            id: Uuid::new_v4(),
            name: "PGC 100x40".to_string(),
            unit: "m".to_string(),
            unit_cost,
        }
    }

    fn row(quantity_per_m2: f64, unit_cost: f64) -> FormulaRow {
        FormulaRow {
            id: Uuid::new_v4(),
            name: "Steel frame".to_string(),
            category_id: None,
            category_label: "Structure".to_string(),
            quantity_per_m2,
            house_type: HouseType::Any,
            quality_level: QualityLevel::Any,
            is_optional: false,
            material: Some(material(unit_cost)),
        }
    }

    fn input(area: f64, margin_percentage: f64) -> BudgetInput {
        BudgetInput {
            area,
            house_type: HouseType::SingleStory,
            quality_level: QualityLevel::Standard,
            optional_selections: HashSet::new(),
            margin_percentage,
        }
    }

    #[test]
    fn single_row_with_margin() {
        let budget = calculate_budget(&input(100.0, 25.0), &[row(0.5, 1000.0)]);

        assert_eq!(budget.items.len(), 1);
        assert_eq!(budget.items[0].quantity, 50.0);
        assert_eq!(budget.items[0].line_total, 50_000.0);
        assert_eq!(budget.summary.total_cost, 50_000.0);
        assert_eq!(budget.summary.margin_amount, 12_500.0);
        assert_eq!(budget.summary.final_price, 62_500.0);
    }

    #[test]
    fn unselected_optional_row_is_skipped() {
        let mut optional = row(0.5, 1000.0);
        optional.is_optional = true;

        let budget = calculate_budget(&input(100.0, 25.0), &[optional]);
        assert!(budget.is_empty());
        assert_eq!(budget.summary.final_price, 0.0);
    }

    #[test]
    fn toggling_optional_row_moves_exactly_its_line_total() {
        let base = row(0.5, 1000.0);
        let mut extra = row(0.1, 300.0);
        extra.is_optional = true;
        let rows = vec![base, extra.clone()];

        let mut params = input(120.0, 20.0);
        let without = calculate_budget(&params, &rows);
        params.optional_selections.insert(extra.id);
        let with = calculate_budget(&params, &rows);

        let extra_total = with.items[1].line_total;
        assert_eq!(with.items.len(), 2);
        assert!((with.summary.total_cost - without.summary.total_cost - extra_total).abs() < 1e-9);
        assert!((with.summary.margin_amount - with.summary.total_cost * 0.2).abs() < 1e-9);
    }

    #[test]
    fn house_type_scope() {
        let mut two_story = row(1.0, 10.0);
        two_story.house_type = HouseType::TwoStory;
        let any = row(1.0, 10.0);

        let budget = calculate_budget(&input(10.0, 0.0), &[two_story.clone(), any]);
        assert_eq!(budget.items.len(), 1);

        let mut params = input(10.0, 0.0);
        params.house_type = HouseType::TwoStory;
        let budget = calculate_budget(&params, &[two_story]);
        assert_eq!(budget.items.len(), 1);
    }

    #[test]
    fn quality_scope() {
        let mut premium = row(1.0, 10.0);
        premium.quality_level = QualityLevel::Premium;

        let budget = calculate_budget(&input(10.0, 0.0), std::slice::from_ref(&premium));
        assert!(budget.is_empty());

        let mut params = input(10.0, 0.0);
        params.quality_level = QualityLevel::Premium;
        assert_eq!(calculate_budget(&params, &[premium]).items.len(), 1);
    }

    #[test]
    fn rows_without_material_are_skipped() {
        let mut orphan = row(1.0, 10.0);
        orphan.material = None;

        let budget = calculate_budget(&input(10.0, 10.0), &[orphan, row(1.0, 10.0)]);
        assert_eq!(budget.items.len(), 1);
        assert_eq!(budget.summary.total_cost, 100.0);
    }

    #[test]
    fn zero_or_invalid_area_yields_empty_budget() {
        for area in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let budget = calculate_budget(&input(area, 25.0), &[row(0.5, 1000.0)]);
            assert!(budget.is_empty());
            assert_eq!(budget.summary.total_cost, 0.0);
            assert_eq!(budget.summary.final_price, 0.0);
        }
        assert!(calculate_budget(&input(100.0, 25.0), &[]).is_empty());
    }

    #[test]
    fn quantity_rounds_up_to_two_decimals() {
        let budget = calculate_budget(&input(33.0, 0.0), &[row(0.0333, 1.0)]);
        // 33 * 0.0333 = 1.0989
        assert_eq!(budget.items[0].quantity, 1.1);
        assert_eq!(round_up_quantity(0.0), 0.0);
        assert_eq!(round_up_quantity(2.001), 2.01);
    }

    #[test]
    fn final_price_matches_margin_formula() {
        let rows = vec![row(0.37, 812.5), row(1.13, 77.1), row(0.05, 15_300.0)];
        let budget = calculate_budget(&input(87.5, 17.5), &rows);
        let s = budget.summary;

        assert_eq!(s.final_price, s.total_cost + s.margin_amount);
        assert!((s.final_price - s.total_cost * 1.175).abs() < 1e-6);
    }

    #[test]
    fn rows_are_not_mutated_and_results_are_deterministic() {
        let rows = vec![row(0.5, 1000.0), row(0.2, 10.0)];
        let before = rows.clone();
        let first = calculate_budget(&input(50.0, 10.0), &rows);
        let second = calculate_budget(&input(50.0, 10.0), &rows);

        assert_eq!(rows, before);
        assert_eq!(first, second);
    }

    #[test]
    fn price_per_m2() {
        let budget = calculate_budget(&input(100.0, 25.0), &[row(0.5, 1000.0)]);
        assert_eq!(budget.price_per_m2(100.0), 625.0);
        assert_eq!(budget.price_per_m2(0.0), 0.0);
    }

    #[test]
    fn parse_scopes() {
        assert_eq!(HouseType::try_from("Two-Story").unwrap(), HouseType::TwoStory);
        assert_eq!(QualityLevel::try_from("any").unwrap(), QualityLevel::Any);
        assert!(HouseType::try_from("three-story").is_err());
    }
}
