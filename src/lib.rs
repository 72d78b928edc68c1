pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::memory::MemoryWarehouse;
pub use crate::adapters::postgres::PostgresWarehouse;
pub use crate::config::{CliConfig, Settings, WarehouseConfig};
pub use crate::core::fetch::WindowedFetcher;
pub use crate::core::load::WarehouseLoader;
pub use crate::core::normalize::RecordNormalizer;
pub use crate::core::pipeline::PipelineRunner;
pub use crate::domain::model::{FetchWindow, GeoPoint, LoadBatch, PipelineResult, Record, RunStatus};
pub use crate::domain::ports::{PipelineConfig, Warehouse};
pub use crate::utils::error::{EtlError, FetchError, LoadError, NormalizationError, Result};
