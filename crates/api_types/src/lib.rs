use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Construction type a formula or quote targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HouseType {
    #[default]
    SingleStory,
    TwoStory,
    Any,
}

/// Finish quality a formula or quote targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityLevel {
    Basic,
    #[default]
    Standard,
    Premium,
    Any,
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub position: i32,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }

    /// Query string of `GET /materials` and `GET /materials/grouped`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MaterialList {
        /// Accent and case insensitive name filter.
        pub search: Option<String>,
        pub category_id: Option<Uuid>,
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialNew {
        pub category_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub unit: String,
        pub unit_cost: f64,
        pub supplier: Option<String>,
        pub supplier_code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub unit: String,
        pub unit_cost: f64,
        pub supplier: Option<String>,
        pub supplier_code: Option<String>,
        /// RFC3339 timestamp of the last price change.
        pub last_update: DateTime<Utc>,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialListResponse {
        pub materials: Vec<MaterialView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialGroupView {
        pub category: CategoryView,
        pub materials: Vec<MaterialView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialGroupsResponse {
        pub groups: Vec<MaterialGroupView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialUpdate {
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PriceUpdate {
        /// Must be > 0.
        pub unit_cost: f64,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PriceChangeView {
        pub id: Uuid,
        pub material_id: Uuid,
        pub old_price: f64,
        pub new_price: f64,
        pub changed_at: DateTime<Utc>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PriceHistoryResponse {
        pub changes: Vec<PriceChangeView>,
    }
}

pub mod formula {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FormulaList {
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FormulaNew {
        pub name: String,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub material_id: Option<Uuid>,
        pub quantity_per_m2: f64,
        pub house_type: Option<HouseType>,
        pub quality_level: Option<QualityLevel>,
        #[serde(default)]
        pub is_optional: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FormulaUpdate {
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FormulaView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub category_label: Option<String>,
        pub material_id: Option<Uuid>,
        pub material_name: Option<String>,
        pub unit: Option<String>,
        /// Current catalog price of the linked material.
        pub unit_cost: Option<f64>,
        pub quantity_per_m2: f64,
        pub house_type: HouseType,
        pub quality_level: QualityLevel,
        pub is_optional: bool,
        pub position: i32,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FormulaListResponse {
        pub formulas: Vec<FormulaView>,
    }
}

pub mod express {
    use super::*;

    /// Parameters of an express quote.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteRequest {
        pub area: f64,
        #[serde(default)]
        pub house_type: HouseType,
        #[serde(default)]
        pub quality_level: QualityLevel,
        /// Ids of the optional formulas to include.
        #[serde(default)]
        pub optional_selections: Vec<Uuid>,
        /// Falls back to the configured default margin.
        pub margin_percentage: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteLine {
        pub name: String,
        pub formula_name: String,
        pub quantity: f64,
        pub unit: String,
        pub unit_cost: f64,
        pub line_total: f64,
        pub category_id: Option<Uuid>,
        pub category_label: String,
        pub material_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteSummary {
        pub total_cost: f64,
        pub margin_percentage: f64,
        pub margin_amount: f64,
        pub final_price: f64,
        pub price_per_m2: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteResponse {
        pub items: Vec<QuoteLine>,
        pub summary: QuoteSummary,
    }

    /// Quote and save as a draft project in one request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaveRequest {
        #[serde(flatten)]
        pub quote: QuoteRequest,
        pub client: crate::project::ClientData,
    }
}

pub mod project {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ProjectStatus {
        Draft,
        InReview,
        Approved,
        Rejected,
        Completed,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ItemType {
        Material,
        Labor,
        Equipment,
        Service,
    }

    /// Client fields entered when saving a budget.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ClientData {
        /// Defaults to `House <client> - <area>m²`.
        pub project_name: Option<String>,
        pub client_name: String,
        pub client_email: Option<String>,
        pub client_phone: Option<String>,
        pub location: Option<String>,
        pub notes: Option<String>,
        pub house_template_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectList {
        /// Matches project name, client name or project code.
        pub search: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectView {
        pub id: Uuid,
        pub project_name: String,
        pub project_code: String,
        pub house_template_id: Option<Uuid>,
        pub client_name: String,
        pub client_email: Option<String>,
        pub client_phone: Option<String>,
        pub location: Option<String>,
        pub status: ProjectStatus,
        pub total_cost: f64,
        pub margin_percentage: f64,
        pub margin_amount: f64,
        pub final_price: f64,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectListResponse {
        pub projects: Vec<ProjectView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetItemView {
        pub id: Uuid,
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
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectDetailResponse {
        pub project: ProjectView,
        pub items: Vec<BudgetItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub status: ProjectStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetItemNew {
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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCost {
        /// `None` for items without a category.
        pub category_id: Option<Uuid>,
        pub total_cost: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TypeCost {
        pub item_type: ItemType,
        pub total_cost: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectTotalsResponse {
        pub total_cost: f64,
        pub margin_percentage: f64,
        pub margin_amount: f64,
        pub final_price: f64,
        pub by_category: Vec<CategoryCost>,
        pub by_type: Vec<TypeCost>,
    }
}

pub mod settings {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PricingSettings {
        pub price_per_m2: f64,
        /// Percent, `0..=100`.
        pub margin_percentage: f64,
    }
}

pub mod template {
    use super::*;
    use crate::project::ItemType;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TemplateList {
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateNew {
        pub name: String,
        pub description: Option<String>,
        pub total_area_m2: f64,
        pub bedrooms: Option<i32>,
        pub bathrooms: Option<i32>,
        pub floors: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub total_area_m2: f64,
        pub bedrooms: Option<i32>,
        pub bathrooms: Option<i32>,
        pub floors: i32,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateListResponse {
        pub templates: Vec<TemplateView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateItemNew {
        pub category_id: Option<Uuid>,
        pub material_id: Option<Uuid>,
        pub item_type: ItemType,
        pub name: String,
        pub unit: String,
        pub quantity_per_m2: Option<f64>,
        pub base_quantity: Option<f64>,
        pub estimated_unit_cost: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateItemView {
        pub id: Uuid,
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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateItemsResponse {
        pub items: Vec<TemplateItemView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EstimateQuery {
        /// Defaults to the template's own area.
        pub area: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EstimateLine {
        pub name: String,
        pub item_type: ItemType,
        pub quantity: f64,
        pub unit: String,
        pub unit_cost: f64,
        pub line_total: f64,
        pub category_id: Option<Uuid>,
        pub material_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EstimateResponse {
        pub template: TemplateView,
        pub area: f64,
        pub items: Vec<EstimateLine>,
        pub total_cost: f64,
        pub margin_percentage: f64,
        pub margin_amount: f64,
        pub final_price: f64,
    }
}
