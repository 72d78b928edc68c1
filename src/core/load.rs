use crate::domain::model::{ColumnSpec, ColumnType, LoadBatch, Record};
use crate::domain::ports::Warehouse;
use crate::utils::error::LoadError;
use std::collections::BTreeMap;

/// Full-refresh loader. Ensures the target schema exists, infers column types
/// from the batch (the source schema is not fixed in advance) and hands the
/// whole batch to the warehouse port as one unit.
#[derive(Debug, Clone)]
pub struct WarehouseLoader<W: Warehouse> {
    warehouse: W,
}

impl<W: Warehouse> WarehouseLoader<W> {
    pub fn new(warehouse: W) -> Self {
        Self { warehouse }
    }

    pub async fn load(&self, batch: &LoadBatch) -> Result<u64, LoadError> {
        self.warehouse.ensure_schema(&batch.schema).await?;

        let columns = infer_columns(&batch.records);
        tracing::debug!(
            schema = %batch.schema,
            table = %batch.table,
            columns = columns.len(),
            rows = batch.records.len(),
            "Replacing warehouse table"
        );

        // An empty batch still replaces the table: absence of new data in
        // the window is represented, not skipped.
        self.warehouse
            .replace_table(&batch.schema, &batch.table, &columns, &batch.records)
            .await
    }
}

/// Infer one column per field observed anywhere in the batch, in sorted
/// order. Mixed int/float widens to Double; any other mixture widens to
/// Text. Columns observed only as null fall back to Text.
pub fn infer_columns(records: &[Record]) -> Vec<ColumnSpec> {
    let mut seen: BTreeMap<&str, Option<ColumnType>> = BTreeMap::new();

    for record in records {
        for (name, value) in &record.fields {
            let observed = match value {
                serde_json::Value::Null => None,
                serde_json::Value::Bool(_) => Some(ColumnType::Boolean),
                serde_json::Value::Number(n) if n.as_i64().is_some() => Some(ColumnType::BigInt),
                serde_json::Value::Number(_) => Some(ColumnType::Double),
                _ => Some(ColumnType::Text),
            };

            let slot = seen.entry(name.as_str()).or_insert(None);
            *slot = match (*slot, observed) {
                (current, None) => current,
                (None, next) => next,
                (Some(a), Some(b)) if a == b => Some(a),
                (Some(ColumnType::BigInt), Some(ColumnType::Double))
                | (Some(ColumnType::Double), Some(ColumnType::BigInt)) => Some(ColumnType::Double),
                _ => Some(ColumnType::Text),
            };
        }
    }

    seen.into_iter()
        .map(|(name, ty)| ColumnSpec {
            name: name.to_string(),
            ty: ty.unwrap_or(ColumnType::Text),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryWarehouse;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn batch(records: Vec<Record>) -> LoadBatch {
        LoadBatch {
            schema: "raw".to_string(),
            table: "raw_fire_incidents".to_string(),
            records,
        }
    }

    #[test]
    fn infers_types_from_values() {
        let records = vec![record(serde_json::json!({
            "count": 3,
            "ratio": 0.5,
            "active": true,
            "city": "SF"
        }))];
        let columns = infer_columns(&records);
        assert_eq!(
            columns,
            vec![
                ColumnSpec { name: "active".into(), ty: ColumnType::Boolean },
                ColumnSpec { name: "city".into(), ty: ColumnType::Text },
                ColumnSpec { name: "count".into(), ty: ColumnType::BigInt },
                ColumnSpec { name: "ratio".into(), ty: ColumnType::Double },
            ]
        );
    }

    #[test]
    fn columns_are_the_union_of_fields_across_the_batch() {
        let records = vec![
            record(serde_json::json!({"a": 1})),
            record(serde_json::json!({"b": "x"})),
        ];
        let names: Vec<String> = infer_columns(&records).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn int_and_float_widen_to_double() {
        let records = vec![
            record(serde_json::json!({"v": 1})),
            record(serde_json::json!({"v": 1.5})),
        ];
        assert_eq!(infer_columns(&records)[0].ty, ColumnType::Double);
    }

    #[test]
    fn mixed_types_widen_to_text() {
        let records = vec![
            record(serde_json::json!({"v": 1})),
            record(serde_json::json!({"v": "one"})),
        ];
        assert_eq!(infer_columns(&records)[0].ty, ColumnType::Text);
    }

    #[test]
    fn null_only_column_defaults_to_text() {
        let records = vec![record(serde_json::json!({"v": null}))];
        assert_eq!(infer_columns(&records)[0].ty, ColumnType::Text);
    }

    #[test]
    fn nulls_do_not_disturb_an_inferred_type() {
        let records = vec![
            record(serde_json::json!({"v": null})),
            record(serde_json::json!({"v": 7})),
            record(serde_json::json!({"v": null})),
        ];
        assert_eq!(infer_columns(&records)[0].ty, ColumnType::BigInt);
    }

    #[tokio::test]
    async fn load_replaces_prior_table_contents() {
        let warehouse = MemoryWarehouse::new();
        let loader = WarehouseLoader::new(warehouse.clone());

        let first = batch(vec![record(serde_json::json!({"incident_number": "1"}))]);
        loader.load(&first).await.unwrap();

        let second = batch(vec![
            record(serde_json::json!({"incident_number": "2"})),
            record(serde_json::json!({"incident_number": "3"})),
        ]);
        let count = loader.load(&second).await.unwrap();

        assert_eq!(count, 2);
        let table = warehouse.table("raw", "raw_fire_incidents").await.unwrap();
        assert_eq!(table.rows, second.records);
    }

    #[tokio::test]
    async fn empty_batch_yields_an_empty_queryable_table() {
        let warehouse = MemoryWarehouse::new();
        let loader = WarehouseLoader::new(warehouse.clone());

        loader
            .load(&batch(vec![record(serde_json::json!({"incident_number": "1"}))]))
            .await
            .unwrap();
        let count = loader.load(&batch(vec![])).await.unwrap();

        assert_eq!(count, 0);
        let table = warehouse.table("raw", "raw_fire_incidents").await.unwrap();
        assert!(table.rows.is_empty());
        assert!(table.columns.is_empty());
    }

    #[tokio::test]
    async fn load_creates_the_schema_if_absent() {
        let warehouse = MemoryWarehouse::new();
        let loader = WarehouseLoader::new(warehouse.clone());

        loader.load(&batch(vec![])).await.unwrap();
        assert!(warehouse.has_schema("raw").await);
    }
}
