use crate::domain::model::{AnalyzedDocument, BundleSettings, OutputFormat, SourceDocument};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn inputs(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> Result<Vec<OutputFormat>>;
    fn concurrency(&self) -> usize;
    fn bundle(&self) -> Option<BundleSettings>;
    fn timestamped_outputs(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SourceDocument>>;
    async fn transform(&self, documents: Vec<SourceDocument>) -> Result<Vec<AnalyzedDocument>>;
    async fn load(&self, reports: &[AnalyzedDocument]) -> Result<Vec<String>>;
}
