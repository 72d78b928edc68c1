use crate::domain::model::{ColumnSpec, Record};
use crate::domain::ports::Warehouse;
use crate::utils::error::LoadError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What a table looks like after a full refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTable {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Record>,
}

#[derive(Debug, Default)]
struct State {
    schemas: HashSet<String>,
    tables: HashMap<(String, String), StoredTable>,
    load_count: u64,
}

/// In-memory warehouse double. Mirrors the Postgres adapter's observable
/// behavior: schema creation is idempotent, a replace against a missing
/// schema fails, and a successful replace leaves exactly the given rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryWarehouse {
    state: Arc<Mutex<State>>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn has_schema(&self, schema: &str) -> bool {
        self.state.lock().await.schemas.contains(schema)
    }

    pub async fn table(&self, schema: &str, table: &str) -> Option<StoredTable> {
        self.state
            .lock()
            .await
            .tables
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
    }

    /// Number of successful `replace_table` calls, for asserting that failed
    /// runs never touch the warehouse.
    pub async fn load_count(&self) -> u64 {
        self.state.lock().await.load_count
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn ensure_schema(&self, schema: &str) -> Result<(), LoadError> {
        self.state.lock().await.schemas.insert(schema.to_string());
        Ok(())
    }

    async fn replace_table(
        &self,
        schema: &str,
        table: &str,
        columns: &[ColumnSpec],
        rows: &[Record],
    ) -> Result<u64, LoadError> {
        let mut state = self.state.lock().await;
        if !state.schemas.contains(schema) {
            return Err(LoadError::MissingSchema {
                schema: schema.to_string(),
            });
        }

        state.tables.insert(
            (schema.to_string(), table.to_string()),
            StoredTable {
                columns: columns.to_vec(),
                rows: rows.to_vec(),
            },
        );
        state.load_count += 1;
        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let warehouse = MemoryWarehouse::new();
        warehouse.ensure_schema("raw").await.unwrap();
        warehouse.ensure_schema("raw").await.unwrap();
        assert!(warehouse.has_schema("raw").await);
    }

    #[tokio::test]
    async fn replace_without_schema_fails() {
        let warehouse = MemoryWarehouse::new();
        let err = warehouse
            .replace_table("raw", "t", &[], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingSchema { .. }));
    }
}
