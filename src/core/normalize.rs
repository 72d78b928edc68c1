use crate::domain::model::{GeoPoint, Record};
use crate::utils::error::NormalizationError;

/// Field the SF dataset uses for the incident location.
pub const DEFAULT_GEO_FIELD: &str = "point";

/// Repairs per-record structural inconsistencies so every record fits one
/// flat schema. The only repair is the geo field: the warehouse has no
/// nested-object column type, so a structured geo value is replaced by its
/// canonical string serialization. Everything else passes through untouched;
/// schema-level transformation belongs to the downstream layer.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    geo_field: String,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_GEO_FIELD)
    }
}

impl RecordNormalizer {
    pub fn new(geo_field: impl Into<String>) -> Self {
        Self {
            geo_field: geo_field.into(),
        }
    }

    pub fn normalize(&self, records: Vec<Record>) -> Result<Vec<Record>, NormalizationError> {
        records
            .into_iter()
            .map(|record| self.normalize_record(record))
            .collect()
    }

    fn normalize_record(&self, mut record: Record) -> Result<Record, NormalizationError> {
        // Only structured objects get repaired; strings, nulls and other
        // scalar shapes pass through unchanged.
        let needs_repair = matches!(
            record.fields.get(&self.geo_field),
            Some(value) if value.is_object()
        );
        if !needs_repair {
            return Ok(record);
        }

        // Presence checked above.
        let value = record.fields.remove(&self.geo_field).unwrap_or_default();
        let geo: GeoPoint =
            serde_json::from_value(value).map_err(|e| NormalizationError::MalformedGeo {
                field: self.geo_field.clone(),
                detail: e.to_string(),
            })?;
        let canonical = serde_json::to_string(&geo)?;
        record
            .fields
            .insert(self.geo_field.clone(), serde_json::Value::String(canonical));
        Ok(record)
    }
}
