use crate::core::catalog::MarkerCatalog;
use crate::core::{render, report};
use crate::core::{AnalyzedDocument, ConfigProvider, Pipeline, SourceDocument, Storage};
use crate::domain::model::OutputFormat;
use crate::utils::error::{ReportError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use zip::write::{SimpleFileOptions, ZipWriter};

/// 讀取已萃取的報告文字、分析並寫出報告
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    source: S,
    sink: S,
    config: C,
    catalog: Arc<MarkerCatalog>,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(source: S, sink: S, config: C, catalog: Arc<MarkerCatalog>) -> Self {
        Self {
            source,
            sink,
            config,
            catalog,
        }
    }

    fn output_prefix(&self) -> Option<String> {
        self.config
            .timestamped_outputs()
            .then(|| chrono::Local::now().format("%Y%m%d%H%M%S").to_string())
    }

    fn render(&self, report: &AnalyzedDocument, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Csv => render::to_csv(&report.summary),
            OutputFormat::Json => render::to_json(&report.summary),
            OutputFormat::Txt => Ok(render::to_text(&report.summary)),
        }
    }

    fn output_location(&self, filename: &str) -> String {
        format!("{}/{}", self.config.output_path(), filename)
    }
}

/// 以檔名（不含副檔名）作為文件名稱，重複時加上序號
fn document_name(path: &str, seen: &mut HashMap<String, usize>) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("report")
        .to_string();

    let count = seen.entry(stem.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        stem
    } else {
        format!("{}_{}", stem, count)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<SourceDocument>> {
        let inputs = self.config.inputs();
        if inputs.is_empty() {
            return Err(ReportError::MissingConfigError {
                field: "inputs".to_string(),
            });
        }

        let mut seen = HashMap::new();
        let mut documents = Vec::with_capacity(inputs.len());

        for path in inputs {
            tracing::debug!("Reading report text from: {}", path);
            let bytes = self
                .source
                .read_file(path)
                .await
                .map_err(|e| ReportError::InputError {
                    path: path.clone(),
                    message: e.to_string(),
                })?;

            let text = String::from_utf8_lossy(&bytes).into_owned();
            if text.trim().is_empty() {
                tracing::warn!("📝 {} contains no text, every marker will be missing", path);
            }

            documents.push(SourceDocument {
                name: document_name(path, &mut seen),
                text,
            });
        }

        Ok(documents)
    }

    async fn transform(&self, documents: Vec<SourceDocument>) -> Result<Vec<AnalyzedDocument>> {
        let concurrency = self.config.concurrency().max(1);
        tracing::debug!(
            "Analyzing {} document(s) with concurrency {}",
            documents.len(),
            concurrency
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();

        for (index, document) in documents.into_iter().enumerate() {
            let catalog = Arc::clone(&self.catalog);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                tokio::task::spawn_blocking(move || {
                    let summary = report::analyze(&document.text, &catalog);
                    (
                        index,
                        AnalyzedDocument {
                            name: document.name,
                            source_text: document.text,
                            summary,
                        },
                    )
                })
                .await
            });
        }

        let mut analyzed = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            analyzed.push(joined??);
        }

        // 保持輸入順序
        analyzed.sort_by_key(|(index, _)| *index);
        Ok(analyzed.into_iter().map(|(_, report)| report).collect())
    }

    async fn load(&self, reports: &[AnalyzedDocument]) -> Result<Vec<String>> {
        let formats = self.config.output_formats()?;
        let prefix = self.output_prefix();

        let mut files: Vec<(String, Vec<u8>)> = Vec::new();
        let bundle = self.config.bundle();

        for report in reports {
            let stem = match &prefix {
                Some(prefix) => format!("{}_{}", prefix, report.name),
                None => report.name.clone(),
            };

            for format in &formats {
                let content = self.render(report, *format)?;
                files.push((format!("{}.{}", stem, format.extension()), content.into_bytes()));
            }

            if bundle.as_ref().is_some_and(|b| b.include_source_text) {
                files.push((
                    format!("{}.source.txt", stem),
                    report.source_text.clone().into_bytes(),
                ));
            }
        }

        let Some(bundle) = bundle else {
            let mut written = Vec::with_capacity(files.len());
            for (filename, data) in &files {
                self.sink.write_file(filename, data).await?;
                tracing::debug!("Wrote {} ({} bytes)", filename, data.len());
                written.push(self.output_location(filename));
            }
            return Ok(written);
        };

        tracing::debug!("Creating ZIP bundle with {} files", files.len());
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (filename, data) in &files {
                zip.start_file(filename.as_str(), SimpleFileOptions::default())?;
                zip.write_all(data)?;
            }
            zip.finish()?.into_inner()
        };

        self.sink.write_file(&bundle.filename, &zip_data).await?;
        tracing::info!("📦 Bundle saved: {}", bundle.filename);
        Ok(vec![self.output_location(&bundle.filename)])
    }
}
