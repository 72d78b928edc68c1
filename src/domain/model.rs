use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trailing time span covered by one pipeline run. Computed once per
/// invocation from the current clock; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start_date: NaiveDate,
    pub now: DateTime<Utc>,
}

impl FetchWindow {
    pub fn new(lookback_days: u32) -> Self {
        Self::from_instant(Utc::now(), lookback_days)
    }

    pub fn from_instant(now: DateTime<Utc>, lookback_days: u32) -> Self {
        let start_date = (now - Duration::days(i64::from(lookback_days))).date_naive();
        Self { start_date, now }
    }
}

/// One incident as returned by the API: field name -> JSON value. The source
/// does not guarantee field presence per record, so there is no fixed struct.
/// A sorted map keeps field iteration deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Record {
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(fields: BTreeMap<String, serde_json::Value>) -> Self {
        Self { fields }
    }
}

/// Nested geo object present on some records. `deny_unknown_fields` keeps the
/// canonical string serialization lossless: anything that does not fit this
/// shape is rejected rather than silently truncated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeoPoint {
    pub r#type: String,
    pub coordinates: Vec<f64>,
}

/// Warehouse column type inferred from a batch's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Boolean,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: ColumnType,
}

/// The complete normalized record set of one run, loaded as an indivisible
/// unit into `schema.table`. Partial loads are not a supported state.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBatch {
    pub schema: String,
    pub table: String,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

/// Outcome reported to the orchestrator after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineResult {
    pub record_count: u64,
    pub status: RunStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_start_date_is_now_minus_lookback() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();
        let window = FetchWindow::from_instant(now, 30);
        assert_eq!(
            window.start_date,
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()
        );
        assert_eq!(window.now, now);
    }

    #[test]
    fn geo_point_round_trips_through_canonical_string() {
        let geo = GeoPoint {
            r#type: "Point".to_string(),
            coordinates: vec![-122.419, 37.775],
        };
        let serialized = serde_json::to_string(&geo).unwrap();
        assert_eq!(
            serialized,
            r#"{"type":"Point","coordinates":[-122.419,37.775]}"#
        );
        let decoded: GeoPoint = serde_json::from_str(&serialized).unwrap();
        assert_eq!(decoded, geo);
    }

    #[test]
    fn geo_point_rejects_unknown_fields() {
        let raw = serde_json::json!({
            "type": "Point",
            "coordinates": [1.0, 2.0],
            "crs": "EPSG:4326"
        });
        assert!(serde_json::from_value::<GeoPoint>(raw).is_err());
    }

    #[test]
    fn record_serde_is_flat() {
        let record: Record =
            serde_json::from_str(r#"{"incident_number":"123","city":"SF"}"#).unwrap();
        assert_eq!(record.fields.len(), 2);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"city":"SF","incident_number":"123"}"#
        );
    }
}
