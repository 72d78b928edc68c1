use crate::domain::model::{ColumnSpec, ColumnType, Record};
use crate::domain::ports::Warehouse;
use crate::utils::error::LoadError;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Postgres bind-parameter limit per statement.
const BIND_LIMIT: usize = 65_535;
const MAX_ROWS_PER_INSERT: usize = 1_000;

/// sqlx-backed warehouse. The full refresh writes into `<table>__staging`
/// and swaps it in with DROP + RENAME inside one transaction; Postgres DDL
/// is transactional, so readers see either the old or the new table, and a
/// failed load leaves the previous contents untouched.
#[derive(Debug, Clone)]
pub struct PostgresWarehouse {
    pool: PgPool,
}

impl PostgresWarehouse {
    pub async fn connect(database_url: &str) -> Result<Self, LoadError> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Warehouse for PostgresWarehouse {
    async fn ensure_schema(&self, schema: &str) -> Result<(), LoadError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace_table(
        &self,
        schema: &str,
        table: &str,
        columns: &[ColumnSpec],
        rows: &[Record],
    ) -> Result<u64, LoadError> {
        let staging = format!("{table}__staging");
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "DROP TABLE IF EXISTS {}",
            qualified(schema, &staging)
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&create_table_sql(schema, &staging, columns))
            .execute(&mut *tx)
            .await?;

        if columns.is_empty() {
            // Zero-column table; only empty records can land here.
            for _ in rows {
                sqlx::query(&format!(
                    "INSERT INTO {} DEFAULT VALUES",
                    qualified(schema, &staging)
                ))
                .execute(&mut *tx)
                .await?;
            }
        } else {
            let insert_prefix = format!(
                "INSERT INTO {} ({}) ",
                qualified(schema, &staging),
                column_list(columns)
            );
            for chunk in rows.chunks(rows_per_insert(columns.len())) {
                let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(insert_prefix.as_str());
                builder.push_values(chunk, |mut b, row| {
                    for column in columns {
                        let value = row.fields.get(&column.name).filter(|v| !v.is_null());
                        match column.ty {
                            ColumnType::BigInt => {
                                b.push_bind(value.and_then(serde_json::Value::as_i64));
                            }
                            ColumnType::Double => {
                                b.push_bind(value.and_then(serde_json::Value::as_f64));
                            }
                            ColumnType::Boolean => {
                                b.push_bind(value.and_then(serde_json::Value::as_bool));
                            }
                            ColumnType::Text => {
                                b.push_bind(value.map(text_value));
                            }
                        }
                    }
                });
                builder.build().execute(&mut *tx).await?;
            }
        }

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", qualified(schema, table)))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "ALTER TABLE {} RENAME TO {}",
            qualified(schema, &staging),
            quote_ident(table)
        ))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows.len() as u64)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

fn sql_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::BigInt => "BIGINT",
        ColumnType::Double => "DOUBLE PRECISION",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Text => "TEXT",
    }
}

fn create_table_sql(schema: &str, table: &str, columns: &[ColumnSpec]) -> String {
    let column_defs: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), sql_type(c.ty)))
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        qualified(schema, table),
        column_defs.join(", ")
    )
}

fn column_list(columns: &[ColumnSpec]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn rows_per_insert(column_count: usize) -> usize {
    (BIND_LIMIT / column_count.max(1)).clamp(1, MAX_ROWS_PER_INSERT)
}

/// Text rendering for a TEXT column: strings load as-is, any other JSON
/// value (including leftover nested objects) loads as its JSON text.
fn text_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("raw"), "\"raw\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualified("raw", "t"), "\"raw\".\"t\"");
    }

    #[test]
    fn create_table_sql_lists_typed_columns() {
        let columns = vec![
            ColumnSpec {
                name: "incident_number".into(),
                ty: ColumnType::Text,
            },
            ColumnSpec {
                name: "suppression_units".into(),
                ty: ColumnType::BigInt,
            },
        ];
        assert_eq!(
            create_table_sql("raw", "fire__staging", &columns),
            "CREATE TABLE \"raw\".\"fire__staging\" (\"incident_number\" TEXT, \"suppression_units\" BIGINT)"
        );
    }

    #[test]
    fn create_table_sql_with_no_columns_is_still_valid() {
        assert_eq!(
            create_table_sql("raw", "t__staging", &[]),
            "CREATE TABLE \"raw\".\"t__staging\" ()"
        );
    }

    #[test]
    fn insert_chunks_stay_under_the_bind_limit() {
        assert_eq!(rows_per_insert(1), MAX_ROWS_PER_INSERT);
        assert_eq!(rows_per_insert(70), 936);
        assert_eq!(rows_per_insert(100_000), 1);
        assert_eq!(rows_per_insert(0), MAX_ROWS_PER_INSERT);
    }

    #[test]
    fn text_value_keeps_strings_and_renders_json_otherwise() {
        assert_eq!(text_value(&serde_json::json!("SF")), "SF");
        assert_eq!(
            text_value(&serde_json::json!({"a": 1})),
            "{\"a\":1}"
        );
        assert_eq!(text_value(&serde_json::json!([1, 2])), "[1,2]");
    }
}
