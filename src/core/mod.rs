pub mod catalog;
pub mod classifier;
pub mod etl;
pub mod extractor;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod scorer;

pub use crate::domain::model::{AnalyzedDocument, SourceDocument};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
