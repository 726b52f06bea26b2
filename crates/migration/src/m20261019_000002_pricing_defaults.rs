use chrono::Utc;
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use sea_orm_migration::{SchemaManagerConnection, prelude::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

const DEFAULTS: [(&str, &str, &str); 2] = [
    ("price_per_m2", "800", "Reference selling price per square meter"),
    (
        "margin_percentage",
        "25",
        "Default margin applied to new budgets, in percent",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        for (key, value, description) in DEFAULTS {
            insert_setting(db, backend, key, value, description).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        for (key, _, _) in DEFAULTS {
            db.execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM system_config WHERE config_key = ?;",
                [key.into()],
            ))
            .await?;
        }
        Ok(())
    }
}

/// Insert a setting unless the key is already present.
async fn insert_setting(
    db: &SchemaManagerConnection<'_>,
    backend: DbBackend,
    key: &str,
    value: &str,
    description: &str,
) -> Result<(), DbErr> {
    let values = vec![
        key.to_string().into(),
        value.to_string().into(),
        description.to_string().into(),
        Utc::now().into(),
    ];
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO system_config (config_key, config_value, description, updated_at) \
         VALUES (?, ?, ?, ?) ON CONFLICT (config_key) DO NOTHING;",
        values,
    ))
    .await?;
    Ok(())
}
