use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::db;
use crate::documents::{DocumentExtractor, TextExtractor};
use crate::scoring::{OpenAiScorer, Scorer};
use crate::store::{PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub scorer: Arc<dyn Scorer>,
    pub started_at: Instant,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config).await?;
        let scorer = Arc::new(OpenAiScorer::new(&config.scorer)?) as Arc<dyn Scorer>;

        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(PgStore::new(pool)),
            Arc::new(TextExtractor),
            scorer,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn Store>,
        extractor: Arc<dyn DocumentExtractor>,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self {
            config,
            store,
            extractor,
            scorer,
            started_at: Instant::now(),
        }
    }
}
