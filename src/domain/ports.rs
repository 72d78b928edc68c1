use crate::domain::model::{ColumnSpec, Record};
use crate::utils::error::LoadError;
use async_trait::async_trait;

/// Warehouse port. The production implementation talks to Postgres; tests use
/// an in-memory double so no global connection state is involved.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Create the schema if it does not exist. Must not error when it does.
    async fn ensure_schema(&self, schema: &str) -> Result<(), LoadError>;

    /// Full refresh: after success the table contains exactly `rows` and
    /// nothing else, typed per `columns`. All-or-nothing; on failure the
    /// previous contents must survive.
    async fn replace_table(
        &self,
        schema: &str,
        table: &str,
        columns: &[ColumnSpec],
        rows: &[Record],
    ) -> Result<u64, LoadError>;
}

pub trait PipelineConfig: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn lookback_days(&self) -> u32;
    fn page_limit(&self) -> u32;
    fn schema_name(&self) -> &str;
    fn table_name(&self) -> &str;
}
