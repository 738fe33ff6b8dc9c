use std::{path::Path, sync::Arc};

use anyhow::Context;
use tracing::{info, warn};

use super::{
    config::{Config, StoreKind},
    database::RedisStore,
    error::AppError,
    game::Game,
    store::{MemoryStore, Store},
    utils::read_persons,
};

pub struct AppState {
    pub config: Config,
    pub game: Game,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Arc<Self>> {
        let config = Config::load()?;

        let store: Arc<dyn Store> = match config.store {
            StoreKind::Redis => Arc::new(
                RedisStore::connect(&config.redis_url)
                    .await
                    .with_context(|| format!("Failed to connect to {}", config.redis_url))?,
            ),
            StoreKind::Memory => {
                warn!("Using in-memory store, history is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        seed_roster(store.as_ref(), &config.seed_path).await?;

        let game = Game::new(store);
        match game.ensure_selection().await {
            Ok(selection) => info!("Round {} ready for {}", selection.id, selection.date),
            Err(AppError::EmptyRoster) => warn!("Roster is empty, no person of the day yet"),
            Err(e) => return Err(e).context("Failed to select person of the day"),
        }

        Ok(Arc::new(Self { config, game }))
    }
}

/// Fills an empty roster from the seed file. A populated roster is left alone.
pub async fn seed_roster(store: &dyn Store, seed_path: &Path) -> anyhow::Result<usize> {
    if !store.list_persons().await?.is_empty() {
        info!("Roster already populated, skipping seed");
        return Ok(0);
    }

    if !seed_path.exists() {
        warn!("Seed file {} not found, roster stays empty", seed_path.display());
        return Ok(0);
    }

    let persons = read_persons(seed_path)
        .with_context(|| format!("Failed to load {}", seed_path.display()))?;
    store.insert_persons(&persons).await?;

    info!("Seeded {} persons from {}", persons.len(), seed_path.display());
    Ok(persons.len())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SEED: &str = r#"[
        {"firstname":"Ada","lastname":"Lovelace","gender":"F"},
        {"firstname":"Alan","lastname":"Turing","gender":"M"}
    ]"#;

    #[tokio::test]
    async fn test_seed_empty_store() {
        let store = MemoryStore::new();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        assert_eq!(seed_roster(&store, file.path()).await.unwrap(), 2);
        assert_eq!(store.list_persons().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seed_skipped_when_populated() {
        let store = MemoryStore::new();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        seed_roster(&store, file.path()).await.unwrap();
        assert_eq!(seed_roster(&store, file.path()).await.unwrap(), 0);
        assert_eq!(store.list_persons().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seed_missing_file() {
        let store = MemoryStore::new();
        let dir = tempfile::tempdir().unwrap();

        let seeded = seed_roster(&store, &dir.path().join("persons.json"))
            .await
            .unwrap();
        assert_eq!(seeded, 0);
    }

    #[tokio::test]
    async fn test_seed_malformed_file() {
        let store = MemoryStore::new();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ nope").unwrap();

        assert!(seed_roster(&store, file.path()).await.is_err());
        assert!(store.list_persons().await.unwrap().is_empty());
    }
}
