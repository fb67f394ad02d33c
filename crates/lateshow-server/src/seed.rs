//! Development fixture loader: wipes the database and inserts a known set
//! of users, guests, episodes and appearances.

use std::sync::Arc;

use anyhow::bail;
use tracing::info;

use lateshow_api::config::{Config, DatabaseLocation, Environment};
use lateshow_api::credentials::CredentialStore;
use lateshow_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lateshow_seed=info,lateshow_db=info,lateshow_api=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.environment == Environment::Production {
        bail!("Refusing to reset a production database");
    }

    let path = match &config.database {
        DatabaseLocation::File(path) => path.clone(),
        DatabaseLocation::Memory => bail!("Seeding an in-memory database has no effect; set DATABASE_URI to a file"),
    };

    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let db = Arc::new(Database::open(&path)?);
        db.reset()?;

        let credentials = CredentialStore::new(db.clone())?;
        credentials.register("admin", "password")?;

        let summary = db.seed_fixtures()?;
        info!(
            "Database seeded: 1 user, {} guests, {} episodes, {} appearances",
            summary.guests, summary.episodes, summary.appearances
        );
        Ok(())
    })
    .await??;

    Ok(())
}
