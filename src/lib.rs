pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{catalog_config::CatalogConfig, toml_config::TomlConfig};

pub use core::catalog::{MarkerCatalog, MarkerDefinition};
pub use core::classifier::classify;
pub use core::extractor::extract;
pub use core::report::{analyze, assemble};
pub use core::scorer::score;
pub use core::{etl::EtlEngine, pipeline::ReportPipeline};
pub use domain::model::{
    ClassificationEntry, ExtractionResult, MarkerStatus, ReferenceRange, ReportSummary,
};
pub use utils::error::{ReportError, Result};
