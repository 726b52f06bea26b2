//! Budgeting engine for steel-framing contractors.
//!
//! The engine owns the price catalog, the express formulas, house templates
//! and saved projects, all persisted through `sea-orm`. The express
//! calculator itself ([`calculate_budget`]) is a pure function and can be used
//! without a database.

pub use budget_items::{BudgetItem, ItemType};
pub use categories::Category;
pub use error::EngineError;
pub use express::{
    BudgetCalculation, BudgetInput, BudgetSummary, CalculationLineItem, FormulaRow, HouseType,
    MaterialRef, QualityLevel, calculate_budget, round_up_quantity,
};
pub use formulas::ExpressFormula;
pub use materials::Material;
pub use ops::{
    Engine, EngineBuilder, FormulaView, MaterialFilter, MaterialGroup, NewBudgetItem,
    NewCategory, NewFormula, NewMaterial, NewProject, NewTemplate, NewTemplateItem,
    TemplateEstimate, TemplateEstimateLine,
};
pub use price_history::PriceChange;
pub use projects::{Project, ProjectDetail, ProjectStatus};
pub use system_config::{DEFAULT_MARGIN_PERCENTAGE, DEFAULT_PRICE_PER_M2, PricingConfig};
pub use templates::{HouseTemplate, TemplateItem};
pub use totals::{
    ProjectTotals, calculate_item_total, calculate_price_from_margin, calculate_profit_margin,
    calculate_project_totals,
};
pub use util::normalize_search_key;

mod budget_items;
mod categories;
mod error;
mod express;
mod formulas;
mod materials;
mod ops;
mod price_history;
mod projects;
mod system_config;
mod templates;
mod totals;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
