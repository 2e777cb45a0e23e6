use crate::config::substitute_env_vars;
use crate::core::catalog::{MarkerCatalog, MarkerDefinition};
use crate::domain::model::ReferenceRange;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML 裡的一個 `[[markers]]` 區塊
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub key: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub unit: Option<String>,
}

impl MarkerConfig {
    fn reference_range(&self) -> Result<Option<ReferenceRange>> {
        match (self.low, self.high) {
            (Some(low), Some(high)) => Ok(Some(ReferenceRange::new(low, high))),
            (None, None) => Ok(None),
            _ => Err(ReportError::CatalogError {
                marker: self.key.clone(),
                message: "Reference range needs both low and high, or neither".to_string(),
            }),
        }
    }

    pub fn to_definition(&self) -> Result<MarkerDefinition> {
        validate_non_empty_string("markers.key", &self.key)?;
        MarkerDefinition::new(
            &self.key,
            self.patterns.as_slice(),
            self.reference_range()?,
            self.unit.as_deref().unwrap_or(""),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 先放入內建的項目，再附加 `markers`
    pub include_default_markers: Option<bool>,
    #[serde(default)]
    pub markers: Vec<MarkerConfig>,
}

impl CatalogConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    pub fn includes_default_markers(&self) -> bool {
        self.include_default_markers.unwrap_or(false)
    }

    /// 建立並嚴格驗證目錄
    pub fn build_catalog(&self) -> Result<MarkerCatalog> {
        let definitions = self
            .markers
            .iter()
            .map(MarkerConfig::to_definition)
            .collect::<Result<Vec<_>>>()?;

        let catalog = if self.includes_default_markers() {
            MarkerCatalog::default_catalog().extend(definitions)?
        } else {
            MarkerCatalog::new(definitions)?
        };

        catalog.validate()?;
        tracing::debug!("Loaded marker catalog with {} markers", catalog.len());
        Ok(catalog)
    }
}
