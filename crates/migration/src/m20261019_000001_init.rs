//! Initial schema.
//!
//! - `categories`: groups of the price catalog
//! - `materials`: catalog entries with their current unit cost
//! - `price_history`: one row per unit cost change
//! - `express_formulas`: quantity-per-m² rules used by express quotes
//! - `house_templates` / `template_items`: reusable house models
//! - `projects` / `budget_items`: saved budgets with frozen line prices
//! - `system_config`: key/value pricing settings

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    Description,
    Position,
    Icon,
    CreatedAt,
}

#[derive(Iden)]
enum Materials {
    Table,
    Id,
    CategoryId,
    Name,
    NameNorm,
    Description,
    Unit,
    UnitCost,
    Supplier,
    SupplierCode,
    LastUpdate,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum PriceHistory {
    Table,
    Id,
    MaterialId,
    OldPrice,
    NewPrice,
    ChangedAt,
    Notes,
}

#[derive(Iden)]
enum ExpressFormulas {
    Table,
    Id,
    Name,
    Description,
    CategoryId,
    MaterialId,
    QuantityPerM2,
    HouseType,
    QualityLevel,
    IsOptional,
    Position,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum HouseTemplates {
    Table,
    Id,
    Name,
    Description,
    TotalAreaM2,
    Bedrooms,
    Bathrooms,
    Floors,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TemplateItems {
    Table,
    Id,
    HouseTemplateId,
    CategoryId,
    MaterialId,
    ItemType,
    Name,
    Unit,
    QuantityPerM2,
    BaseQuantity,
    EstimatedUnitCost,
    Position,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    ProjectName,
    ProjectCode,
    HouseTemplateId,
    ClientName,
    ClientEmail,
    ClientPhone,
    Location,
    Status,
    TotalCost,
    MarginPercentage,
    MarginAmount,
    FinalPrice,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BudgetItems {
    Table,
    Id,
    ProjectId,
    CategoryId,
    ItemType,
    Name,
    Description,
    Unit,
    Quantity,
    UnitCost,
    TotalCost,
    Supplier,
    Notes,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SystemConfig {
    Table,
    ConfigKey,
    ConfigValue,
    Description,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Catalog
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::Description).string())
                    .col(
                        ColumnDef::new(Categories::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Categories::Icon).string())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Materials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Materials::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Materials::CategoryId).blob().not_null())
                    .col(ColumnDef::new(Materials::Name).string().not_null())
                    .col(ColumnDef::new(Materials::NameNorm).string().not_null())
                    .col(ColumnDef::new(Materials::Description).string())
                    .col(ColumnDef::new(Materials::Unit).string().not_null())
                    .col(ColumnDef::new(Materials::UnitCost).double().not_null())
                    .col(ColumnDef::new(Materials::Supplier).string())
                    .col(ColumnDef::new(Materials::SupplierCode).string())
                    .col(
                        ColumnDef::new(Materials::LastUpdate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Materials::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Materials::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-materials-category_id")
                            .from(Materials::Table, Materials::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-materials-category_id")
                    .table(Materials::Table)
                    .col(Materials::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PriceHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceHistory::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PriceHistory::MaterialId).blob().not_null())
                    .col(ColumnDef::new(PriceHistory::OldPrice).double().not_null())
                    .col(ColumnDef::new(PriceHistory::NewPrice).double().not_null())
                    .col(
                        ColumnDef::new(PriceHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PriceHistory::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-price_history-material_id")
                            .from(PriceHistory::Table, PriceHistory::MaterialId)
                            .to(Materials::Table, Materials::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-price_history-material_id")
                    .table(PriceHistory::Table)
                    .col(PriceHistory::MaterialId)
                    .col(PriceHistory::ChangedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Express formulas
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpressFormulas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpressFormulas::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpressFormulas::Name).string().not_null())
                    .col(ColumnDef::new(ExpressFormulas::Description).string())
                    .col(ColumnDef::new(ExpressFormulas::CategoryId).blob())
                    .col(ColumnDef::new(ExpressFormulas::MaterialId).blob())
                    .col(
                        ColumnDef::new(ExpressFormulas::QuantityPerM2)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpressFormulas::HouseType)
                            .string()
                            .not_null()
                            .default("any"),
                    )
                    .col(
                        ColumnDef::new(ExpressFormulas::QualityLevel)
                            .string()
                            .not_null()
                            .default("any"),
                    )
                    .col(
                        ColumnDef::new(ExpressFormulas::IsOptional)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ExpressFormulas::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ExpressFormulas::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ExpressFormulas::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-express_formulas-category_id")
                            .from(ExpressFormulas::Table, ExpressFormulas::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-express_formulas-material_id")
                            .from(ExpressFormulas::Table, ExpressFormulas::MaterialId)
                            .to(Materials::Table, Materials::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. House templates
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(HouseTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HouseTemplates::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HouseTemplates::Name).string().not_null())
                    .col(ColumnDef::new(HouseTemplates::Description).string())
                    .col(
                        ColumnDef::new(HouseTemplates::TotalAreaM2)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HouseTemplates::Bedrooms).integer())
                    .col(ColumnDef::new(HouseTemplates::Bathrooms).integer())
                    .col(
                        ColumnDef::new(HouseTemplates::Floors)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(HouseTemplates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(HouseTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HouseTemplates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplateItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TemplateItems::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TemplateItems::HouseTemplateId)
                            .blob()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TemplateItems::CategoryId).blob())
                    .col(ColumnDef::new(TemplateItems::MaterialId).blob())
                    .col(ColumnDef::new(TemplateItems::ItemType).string().not_null())
                    .col(ColumnDef::new(TemplateItems::Name).string().not_null())
                    .col(ColumnDef::new(TemplateItems::Unit).string().not_null())
                    .col(ColumnDef::new(TemplateItems::QuantityPerM2).double())
                    .col(ColumnDef::new(TemplateItems::BaseQuantity).double())
                    .col(
                        ColumnDef::new(TemplateItems::EstimatedUnitCost)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateItems::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-template_items-house_template_id")
                            .from(TemplateItems::Table, TemplateItems::HouseTemplateId)
                            .to(HouseTemplates::Table, HouseTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-template_items-category_id")
                            .from(TemplateItems::Table, TemplateItems::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-template_items-material_id")
                            .from(TemplateItems::Table, TemplateItems::MaterialId)
                            .to(Materials::Table, Materials::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Projects
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::ProjectName).string().not_null())
                    .col(
                        ColumnDef::new(Projects::ProjectCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Projects::HouseTemplateId).blob())
                    .col(ColumnDef::new(Projects::ClientName).string().not_null())
                    .col(ColumnDef::new(Projects::ClientEmail).string())
                    .col(ColumnDef::new(Projects::ClientPhone).string())
                    .col(ColumnDef::new(Projects::Location).string())
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Projects::TotalCost)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Projects::MarginPercentage)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Projects::MarginAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Projects::FinalPrice)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Projects::Notes).string())
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-house_template_id")
                            .from(Projects::Table, Projects::HouseTemplateId)
                            .to(HouseTemplates::Table, HouseTemplates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-projects-created_at")
                    .table(Projects::Table)
                    .col(Projects::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Items carry their own copy of name, unit and price; no FK to materials.
        manager
            .create_table(
                Table::create()
                    .table(BudgetItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetItems::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetItems::ProjectId).blob().not_null())
                    .col(ColumnDef::new(BudgetItems::CategoryId).blob())
                    .col(ColumnDef::new(BudgetItems::ItemType).string().not_null())
                    .col(ColumnDef::new(BudgetItems::Name).string().not_null())
                    .col(ColumnDef::new(BudgetItems::Description).string())
                    .col(ColumnDef::new(BudgetItems::Unit).string().not_null())
                    .col(ColumnDef::new(BudgetItems::Quantity).double().not_null())
                    .col(ColumnDef::new(BudgetItems::UnitCost).double().not_null())
                    .col(ColumnDef::new(BudgetItems::TotalCost).double().not_null())
                    .col(ColumnDef::new(BudgetItems::Supplier).string())
                    .col(ColumnDef::new(BudgetItems::Notes).string())
                    .col(
                        ColumnDef::new(BudgetItems::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BudgetItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_items-project_id")
                            .from(BudgetItems::Table, BudgetItems::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_items-project_id")
                    .table(BudgetItems::Table)
                    .col(BudgetItems::ProjectId)
                    .col(BudgetItems::Position)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Settings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SystemConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemConfig::ConfigKey)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SystemConfig::ConfigValue).string().not_null())
                    .col(ColumnDef::new(SystemConfig::Description).string())
                    .col(
                        ColumnDef::new(SystemConfig::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(SystemConfig::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TemplateItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HouseTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpressFormulas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PriceHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Materials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
