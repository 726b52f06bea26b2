use std::{
    collections::HashMap,
    error::Error,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use engine::{
    BudgetInput, Engine, EngineError, HouseType, MaterialFilter, NewCategory, NewFormula,
    NewMaterial, QualityLevel, normalize_search_key,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "steelframe_admin")]
#[command(about = "Admin utilities for Steelframe (catalog import, formulas, quick quotes)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./steelframe.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Category(Category),
    Material(Material),
    Formula(Formula),
    /// Print an express quote with the current catalog.
    Quote(QuoteArgs),
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create(CategoryCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct CategoryCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct Material {
    #[command(subcommand)]
    command: MaterialCommand,
}

#[derive(Subcommand, Debug)]
enum MaterialCommand {
    /// Import a price list: `category,name,unit,unit_cost[,supplier]`.
    Import(MaterialImportArgs),
    SetPrice(MaterialSetPriceArgs),
    List(MaterialListArgs),
}

#[derive(Args, Debug)]
struct MaterialImportArgs {
    /// CSV file with a header row.
    path: PathBuf,
}

#[derive(Args, Debug)]
struct MaterialSetPriceArgs {
    #[arg(long)]
    id: Uuid,
    #[arg(long)]
    unit_cost: f64,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct MaterialListArgs {
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args, Debug)]
struct Formula {
    #[command(subcommand)]
    command: FormulaCommand,
}

#[derive(Subcommand, Debug)]
enum FormulaCommand {
    Create(FormulaCreateArgs),
}

#[derive(Args, Debug)]
struct FormulaCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    material_id: Uuid,
    #[arg(long)]
    quantity_per_m2: f64,
    #[arg(long, default_value = "any", value_parser = parse_house_type)]
    house_type: HouseType,
    #[arg(long, default_value = "any", value_parser = parse_quality)]
    quality: QualityLevel,
    #[arg(long)]
    optional: bool,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Floor area in m².
    #[arg(long)]
    area: f64,
    #[arg(long, default_value = "single-story", value_parser = parse_house_type)]
    house_type: HouseType,
    #[arg(long, default_value = "standard", value_parser = parse_quality)]
    quality: QualityLevel,
    /// Defaults to the configured margin.
    #[arg(long)]
    margin: Option<f64>,
    /// Optional formula ids to include.
    #[arg(long = "optional")]
    optionals: Vec<Uuid>,
}

/// One row of a price list.
#[derive(Debug, Deserialize)]
struct PriceRow {
    category: String,
    name: String,
    unit: String,
    unit_cost: f64,
    supplier: Option<String>,
}

fn parse_house_type(raw: &str) -> Result<HouseType, String> {
    HouseType::try_from(raw).map_err(|_| format!("unsupported house type: {raw}"))
}

fn parse_quality(raw: &str) -> Result<QualityLevel, String> {
    QualityLevel::try_from(raw).map_err(|_| format!("unsupported quality level: {raw}"))
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Import a CSV price list, creating missing categories on the way.
///
/// Materials already present in their category are skipped.
async fn import_materials(
    engine: &Engine,
    path: &Path,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut categories: HashMap<String, Uuid> = engine
        .list_categories()
        .await?
        .into_iter()
        .map(|category| (normalize_search_key(&category.name), category.id))
        .collect();

    let mut reader = csv::Reader::from_path(path)?;
    let (mut created, mut skipped) = (0usize, 0usize);
    for row in reader.deserialize() {
        let row: PriceRow = row?;
        let key = normalize_search_key(&row.category);
        let category_id = match categories.get(&key) {
            Some(id) => *id,
            None => {
                let category = engine
                    .create_category(NewCategory {
                        name: row.category.clone(),
                        ..NewCategory::default()
                    })
                    .await?;
                println!("created category: {}", category.name);
                categories.insert(key, category.id);
                category.id
            }
        };

        let result = engine
            .create_material(NewMaterial {
                category_id,
                name: row.name.clone(),
                description: None,
                unit: row.unit,
                unit_cost: row.unit_cost,
                supplier: row.supplier,
                supplier_code: None,
            })
            .await;
        match result {
            Ok(_) => created += 1,
            Err(EngineError::ExistingKey(_)) => {
                eprintln!("skipped existing material: {}", row.name);
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    println!("imported {created} materials ({skipped} skipped)");
    Ok(())
}

async fn print_quote(engine: &Engine, args: QuoteArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let margin_percentage = match args.margin {
        Some(margin) => margin,
        None => engine.pricing_config().await?.margin_percentage,
    };
    let input = BudgetInput {
        area: args.area,
        house_type: args.house_type,
        quality_level: args.quality,
        optional_selections: args.optionals.into_iter().collect(),
        margin_percentage,
    };

    let budget = engine.express_quote(&input).await?;
    if budget.is_empty() {
        println!("no formula applies to this selection");
        return Ok(());
    }

    for line in &budget.items {
        println!(
            "{:<20} {:<30} {:>10.2} {:<6} x {:>10.2} = {:>12.2}",
            line.category_label, line.name, line.quantity, line.unit, line.unit_cost, line.line_total
        );
    }
    let summary = budget.summary;
    println!("total cost:   {:>12.2}", summary.total_cost);
    println!(
        "margin {:>5.1}%: {:>12.2}",
        summary.margin_percentage, summary.margin_amount
    );
    println!("final price:  {:>12.2}", summary.final_price);
    println!("price per m²: {:>12.2}", budget.price_per_m2(input.area));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Category(Category {
            command: CategoryCommand::Create(args),
        }) => {
            let category = engine
                .create_category(NewCategory {
                    name: args.name,
                    description: args.description,
                    icon: None,
                })
                .await?;
            println!("created category: {} ({})", category.name, category.id);
        }
        Command::Category(Category {
            command: CategoryCommand::List,
        }) => {
            for category in engine.list_categories().await? {
                println!("{}  {}", category.id, category.name);
            }
        }
        Command::Material(Material {
            command: MaterialCommand::Import(args),
        }) => {
            import_materials(&engine, &args.path).await?;
        }
        Command::Material(Material {
            command: MaterialCommand::SetPrice(args),
        }) => {
            let change = engine
                .update_material_price(args.id, args.unit_cost, args.notes.as_deref())
                .await?;
            println!(
                "price updated: {:.2} -> {:.2}",
                change.old_price, change.new_price
            );
        }
        Command::Material(Material {
            command: MaterialCommand::List(args),
        }) => {
            let filter = MaterialFilter {
                search: args.search,
                ..MaterialFilter::default()
            };
            for material in engine.list_materials(&filter).await? {
                println!(
                    "{}  {:<30} {:>10.2} / {}",
                    material.id, material.name, material.unit_cost, material.unit
                );
            }
        }
        Command::Formula(Formula {
            command: FormulaCommand::Create(args),
        }) => {
            let material = engine.material(args.material_id).await?;
            let formula = engine
                .create_formula(NewFormula {
                    name: args.name,
                    description: None,
                    category_id: Some(material.category_id),
                    material_id: Some(material.id),
                    quantity_per_m2: args.quantity_per_m2,
                    house_type: args.house_type,
                    quality_level: args.quality,
                    is_optional: args.optional,
                })
                .await?;
            println!("created formula: {} ({})", formula.name, formula.id);
        }
        Command::Quote(args) => print_quote(&engine, args).await?,
    }

    Ok(())
}
