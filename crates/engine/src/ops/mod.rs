use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, materials};

mod budgets;
mod catalog;
mod formulas;
mod projects;
mod settings;
mod templates;

pub use budgets::NewProject;
pub use catalog::{MaterialFilter, MaterialGroup, NewCategory, NewMaterial};
pub use formulas::{FormulaView, NewFormula};
pub use projects::NewBudgetItem;
pub use templates::{NewTemplate, NewTemplateItem, TemplateEstimate, TemplateEstimateLine};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every catalog, formula and project operation.
///
/// The engine holds no state besides the connection; every call reads the
/// database, so concurrent callers always see committed data.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

async fn require_material<C: ConnectionTrait>(
    conn: &C,
    material_id: Uuid,
) -> ResultEngine<materials::Model> {
    materials::Entity::find_by_id(material_id)
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("material {material_id}")))
}

/// Next free `position` of an ordered table (0 when empty).
async fn next_position<E, C>(conn: &C, column: E::Column, read: fn(&E::Model) -> i32) -> ResultEngine<i32>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let last = E::find().order_by_desc(column).one(conn).await?;
    Ok(last.map_or(0, |model| read(&model) + 1))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
