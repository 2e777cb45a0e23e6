use crate::core::{AnalyzedDocument, Pipeline};
use crate::utils::error::Result;

/// 一次執行的結果：分析後的報告與寫出的檔案
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reports: Vec<AnalyzedDocument>,
    pub outputs: Vec<String>,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting report analysis...");

        // Extract
        let documents = self.pipeline.extract().await?;
        tracing::info!("📄 Read {} report text(s)", documents.len());

        // Transform
        let reports = self.pipeline.transform(documents).await?;
        for report in &reports {
            tracing::info!(
                "🩺 {}: score {}/100 from {} of {} markers",
                report.name,
                report.summary.score,
                report.summary.total,
                report.summary.marker_count()
            );
        }

        // Load
        let outputs = self.pipeline.load(&reports).await?;
        tracing::info!("💾 Wrote {} output file(s)", outputs.len());

        Ok(RunOutcome { reports, outputs })
    }
}
