use anyhow::{Context, Result};
use extract::{DependencyParser, Extractor};
use graph::HtmlRenderer;
use ingest::{ArticleFetcher, Ingestor, UploadStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::metrics::Metrics;

/// Everything a request needs, built once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub extractor: Extractor,
    pub ingestor: Ingestor,
    pub renderer: HtmlRenderer,
    pub metrics: Arc<Metrics>,
    /// Held for the whole of a submission so requests run one at a time.
    pub(crate) pipeline: Mutex<()>,
}

impl AppState {
    /// Create the storage directories and wire the collaborators together.
    pub async fn init(config: AppConfig, parser: Arc<dyn DependencyParser>) -> Result<Self> {
        let storage = &config.storage;
        for dir in [&storage.upload_dir, &storage.static_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory {:?}", dir))?;
        }

        let fetcher = ArticleFetcher::new(
            Duration::from_secs(config.fetch.timeout_secs),
            &config.fetch.user_agent,
        )?;
        let ingestor = Ingestor::new(fetcher, UploadStore::new(&storage.upload_dir));

        let renderer = HtmlRenderer::new(&storage.static_dir, storage.naming)
            .with_filename(storage.graph_filename.clone());

        let extractor = Extractor::new(parser, config.extraction.entity_match);

        Ok(Self {
            config,
            extractor,
            ingestor,
            renderer,
            metrics: Metrics::new(),
            pipeline: Mutex::new(()),
        })
    }
}
