//! Schema tool for the Steelframe database.
//!
//! `steelframe-migrate [up|down|fresh|status]`, `up` when omitted. The target
//! database is taken from `DATABASE_URL`, falling back to the local SQLite file
//! the `steelframe` server uses by default.
use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./steelframe.db?mode=rwc";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let action = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let db = Database::connect(&database_url).await?;
    match action.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        // Rolls back the pricing seed first, then drops the catalog and project tables.
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        unknown => {
            eprintln!("unknown action `{unknown}`");
            eprintln!("usage: steelframe-migrate [up|down|fresh|status]");
            std::process::exit(2);
        }
    }

    Ok(())
}
