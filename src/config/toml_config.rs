use crate::config::catalog_config::CatalogConfig;
use crate::config::substitute_env_vars;
use crate::core::catalog::MarkerCatalog;
use crate::core::ConfigProvider;
use crate::domain::model::{BundleSettings, OutputFormat};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{
    validate_formats, validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub analysis: Option<AnalysisConfig>,
    pub catalog: Option<CatalogConfig>,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 外部文字萃取服務輸出的文字檔
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub timestamped: Option<bool>,
    pub bundle: Option<BundleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
    pub filename: String,
    pub include_source_text: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有 `[catalog]` 時使用內建目錄
    pub fn build_catalog(&self) -> Result<MarkerCatalog> {
        match &self.catalog {
            Some(catalog) => catalog.build_catalog(),
            None => Ok(MarkerCatalog::default_catalog()),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        if self.source.inputs.is_empty() {
            return Err(ReportError::MissingConfigError {
                field: "source.inputs".to_string(),
            });
        }
        for input in &self.source.inputs {
            validate_path("source.inputs", input)?;
        }

        validate_path("load.output_path", &self.load.output_path)?;
        validate_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(concurrency) = self.analysis.as_ref().and_then(|a| a.concurrency) {
            validate_positive_number("analysis.concurrency", concurrency, 1)?;
        }

        if let Some(bundle) = self.load.bundle.as_ref().filter(|b| b.enabled) {
            validate_non_empty_string("load.bundle.filename", &bundle.filename)?;
        }

        // 目錄也要在載入時就檢查
        self.build_catalog()?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn inputs(&self) -> &[String] {
        &self.source.inputs
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> Result<Vec<OutputFormat>> {
        validate_formats("load.output_formats", &self.load.output_formats)
    }

    fn concurrency(&self) -> usize {
        self.analysis
            .as_ref()
            .and_then(|a| a.concurrency)
            .unwrap_or(4)
    }

    fn bundle(&self) -> Option<BundleSettings> {
        self.load
            .bundle
            .as_ref()
            .filter(|b| b.enabled)
            .map(|b| BundleSettings {
                filename: b.filename.clone(),
                include_source_text: b.include_source_text.unwrap_or(false),
            })
    }

    fn timestamped_outputs(&self) -> bool {
        self.load.timestamped.unwrap_or(true)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
