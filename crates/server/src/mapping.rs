//! Conversions between engine values and their wire representation.

use api_types::{
    HouseType, QualityLevel,
    catalog::{CategoryView, MaterialView},
    project::{BudgetItemView, ItemType, ProjectStatus, ProjectView},
};

pub fn house_type_in(value: HouseType) -> engine::HouseType {
    match value {
        HouseType::SingleStory => engine::HouseType::SingleStory,
        HouseType::TwoStory => engine::HouseType::TwoStory,
        HouseType::Any => engine::HouseType::Any,
    }
}

pub fn house_type_out(value: engine::HouseType) -> HouseType {
    match value {
        engine::HouseType::SingleStory => HouseType::SingleStory,
        engine::HouseType::TwoStory => HouseType::TwoStory,
        engine::HouseType::Any => HouseType::Any,
    }
}

pub fn quality_in(value: QualityLevel) -> engine::QualityLevel {
    match value {
        QualityLevel::Basic => engine::QualityLevel::Basic,
        QualityLevel::Standard => engine::QualityLevel::Standard,
        QualityLevel::Premium => engine::QualityLevel::Premium,
        QualityLevel::Any => engine::QualityLevel::Any,
    }
}

pub fn quality_out(value: engine::QualityLevel) -> QualityLevel {
    match value {
        engine::QualityLevel::Basic => QualityLevel::Basic,
        engine::QualityLevel::Standard => QualityLevel::Standard,
        engine::QualityLevel::Premium => QualityLevel::Premium,
        engine::QualityLevel::Any => QualityLevel::Any,
    }
}

pub fn status_in(value: ProjectStatus) -> engine::ProjectStatus {
    match value {
        ProjectStatus::Draft => engine::ProjectStatus::Draft,
        ProjectStatus::InReview => engine::ProjectStatus::InReview,
        ProjectStatus::Approved => engine::ProjectStatus::Approved,
        ProjectStatus::Rejected => engine::ProjectStatus::Rejected,
        ProjectStatus::Completed => engine::ProjectStatus::Completed,
    }
}

pub fn status_out(value: engine::ProjectStatus) -> ProjectStatus {
    match value {
        engine::ProjectStatus::Draft => ProjectStatus::Draft,
        engine::ProjectStatus::InReview => ProjectStatus::InReview,
        engine::ProjectStatus::Approved => ProjectStatus::Approved,
        engine::ProjectStatus::Rejected => ProjectStatus::Rejected,
        engine::ProjectStatus::Completed => ProjectStatus::Completed,
    }
}

pub fn item_type_in(value: ItemType) -> engine::ItemType {
    match value {
        ItemType::Material => engine::ItemType::Material,
        ItemType::Labor => engine::ItemType::Labor,
        ItemType::Equipment => engine::ItemType::Equipment,
        ItemType::Service => engine::ItemType::Service,
    }
}

pub fn item_type_out(value: engine::ItemType) -> ItemType {
    match value {
        engine::ItemType::Material => ItemType::Material,
        engine::ItemType::Labor => ItemType::Labor,
        engine::ItemType::Equipment => ItemType::Equipment,
        engine::ItemType::Service => ItemType::Service,
    }
}

pub fn category_view(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        description: category.description,
        position: category.position,
        icon: category.icon,
    }
}

pub fn material_view(material: engine::Material) -> MaterialView {
    MaterialView {
        id: material.id,
        category_id: material.category_id,
        name: material.name,
        description: material.description,
        unit: material.unit,
        unit_cost: material.unit_cost,
        supplier: material.supplier,
        supplier_code: material.supplier_code,
        last_update: material.last_update,
        is_active: material.is_active,
    }
}

pub fn project_view(project: engine::Project) -> ProjectView {
    ProjectView {
        id: project.id,
        project_name: project.project_name,
        project_code: project.project_code,
        house_template_id: project.house_template_id,
        client_name: project.client_name,
        client_email: project.client_email,
        client_phone: project.client_phone,
        location: project.location,
        status: status_out(project.status),
        total_cost: project.total_cost,
        margin_percentage: project.margin_percentage,
        margin_amount: project.margin_amount,
        final_price: project.final_price,
        notes: project.notes,
        created_at: project.created_at,
        updated_at: project.updated_at,
    }
}

pub fn budget_item_view(item: engine::BudgetItem) -> BudgetItemView {
    BudgetItemView {
        id: item.id,
        category_id: item.category_id,
        item_type: item_type_out(item.item_type),
        name: item.name,
        description: item.description,
        unit: item.unit,
        quantity: item.quantity,
        unit_cost: item.unit_cost,
        total_cost: item.total_cost,
        supplier: item.supplier,
        notes: item.notes,
        position: item.position,
    }
}
