use crate::core::fetch::WindowedFetcher;
use crate::core::load::WarehouseLoader;
use crate::core::normalize::RecordNormalizer;
use crate::domain::model::{FetchWindow, LoadBatch, PipelineResult, RunStatus};
use crate::domain::ports::{PipelineConfig, Warehouse};
use crate::utils::error::Result;

/// One unit of work for the orchestrator: fetch -> normalize -> load, no
/// branching. Any stage failure aborts the run and surfaces the originating
/// error unchanged; retry and backoff live with the caller.
pub struct PipelineRunner<C: PipelineConfig, W: Warehouse> {
    config: C,
    fetcher: WindowedFetcher,
    normalizer: RecordNormalizer,
    loader: WarehouseLoader<W>,
}

impl<C: PipelineConfig, W: Warehouse> PipelineRunner<C, W> {
    pub fn new(config: C, warehouse: W) -> Self {
        let fetcher = WindowedFetcher::new(config.api_endpoint());
        Self {
            config,
            fetcher,
            normalizer: RecordNormalizer::default(),
            loader: WarehouseLoader::new(warehouse),
        }
    }

    pub async fn run(&self) -> Result<PipelineResult> {
        let window = FetchWindow::new(self.config.lookback_days());
        tracing::info!(
            start_date = %window.start_date,
            page_limit = self.config.page_limit(),
            "Starting EL run"
        );

        let raw = self.fetcher.fetch(&window, self.config.page_limit()).await?;
        tracing::info!(count = raw.len(), "Extracted records");

        let normalized = self.normalizer.normalize(raw)?;

        let batch = LoadBatch {
            schema: self.config.schema_name().to_string(),
            table: self.config.table_name().to_string(),
            records: normalized,
        };
        let record_count = self.loader.load(&batch).await?;
        tracing::info!(
            count = record_count,
            schema = %batch.schema,
            table = %batch.table,
            "Loaded records"
        );

        Ok(PipelineResult {
            record_count,
            status: RunStatus::Success,
        })
    }

    /// Orchestrator contract: retry the whole run up to `retries` times with
    /// a fixed delay, then give up so downstream stages are never triggered
    /// against a failed load. The last error is surfaced unchanged.
    pub async fn run_with_retries(
        &self,
        retries: u32,
        retry_delay: std::time::Duration,
    ) -> Result<PipelineResult> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.run().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt <= retries => {
                    tracing::warn!(error = %e, attempt, "Run failed, retrying after delay");
                    tokio::time::sleep(retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
