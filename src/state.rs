use std::sync::Arc;

use anyhow::Context;

use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::{AppConfig, StorageKind};
use crate::db;
use crate::fitness::repo::{GoalsRepo, PgGoalsRepo};
use crate::generator::RecipeGenerator;
use crate::recipes::repo::{PgRecipeRepo, RecipeRepo};
use crate::store::memory::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub goals: Arc<dyn GoalsRepo>,
    pub recipes: Arc<dyn RecipeRepo>,
    pub generator: Arc<RecipeGenerator>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let generator = Arc::new(
            RecipeGenerator::from_config(&config.generator).context("build recipe generator")?,
        );

        match config.storage {
            StorageKind::Postgres => {
                let db = db::connect(&config).await?;
                Ok(Self {
                    users: Arc::new(PgUserRepo::new(db.clone())),
                    goals: Arc::new(PgGoalsRepo::new(db.clone())),
                    recipes: Arc::new(PgRecipeRepo::new(db)),
                    config,
                    generator,
                })
            }
            StorageKind::Memory => {
                tracing::warn!("using in-memory storage; data is lost on restart");
                Ok(Self::in_memory(config, generator))
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        goals: Arc<dyn GoalsRepo>,
        recipes: Arc<dyn RecipeRepo>,
        generator: Arc<RecipeGenerator>,
    ) -> Self {
        Self {
            config,
            users,
            goals,
            recipes,
            generator,
        }
    }

    /// All repositories backed by one shared [`MemoryStore`].
    pub fn in_memory(config: Arc<AppConfig>, generator: Arc<RecipeGenerator>) -> Self {
        let store = Arc::new(MemoryStore::default());
        Self::from_parts(config, store.clone(), store.clone(), store, generator)
    }
}
