use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, trace};

use crate::config::{connect, Settings};

/// Brings the ledger schema of the configured database up to date.
///
/// The open connection is handed back so callers can keep using it, which
/// matters for in-memory SQLite where a second connection sees an empty store.
pub async fn init_database(settings: &Settings) -> Result<DatabaseConnection> {
    trace!("Entering init_database function");
    let db = connect(settings).await?;
    let applied = apply_migrations(&db).await?;
    info!("Ledger schema ready, {} migrations applied", applied);
    Ok(db)
}

/// Applies pending migrations and returns how many ran.
pub(crate) async fn apply_migrations(db: &DatabaseConnection) -> Result<usize> {
    let pending = Migrator::get_pending_migrations(db).await?;
    if pending.is_empty() {
        debug!("No pending migrations");
        return Ok(0);
    }
    for migration in &pending {
        debug!("Pending migration {}", migration.name());
    }

    if let Err(e) = Migrator::up(db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::entities::tax_return;
    use sea_orm::EntityTrait;

    fn memory_settings() -> Settings {
        Settings::default().with_overrides(Some("sqlite::memory:".to_string()), None)
    }

    #[tokio::test]
    async fn test_init_database_creates_schema() {
        let db = init_database(&memory_settings()).await.unwrap();

        let returns = tax_return::Entity::find().all(&db).await.unwrap();
        assert!(returns.is_empty());
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_migrations_is_idempotent() {
        let db = connect(&memory_settings()).await.unwrap();

        let first = apply_migrations(&db).await.unwrap();
        assert_eq!(first, Migrator::migrations().len());
        assert_eq!(apply_migrations(&db).await.unwrap(), 0);
    }
}
