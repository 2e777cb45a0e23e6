use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 參考範圍，上下限皆為包含
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStatus {
    Missing,
    Normal,
    Low,
    High,
    Unknown,
}

impl MarkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }

    /// 超出參考範圍（偏低或偏高）
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Self::Low | Self::High)
    }
}

impl fmt::Display for MarkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad 才會套用表格欄寬
        f.pad(self.as_str())
    }
}

/// 每份文件的萃取結果：marker key -> 數值（找不到則為 None）
///
/// Keys follow catalog order and cover every marker of the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    values: Vec<(String, Option<f64>)>,
}

impl ExtractionResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<f64>) {
        self.values.push((key.into(), value));
    }

    /// `None` when the key is not part of the result, `Some(None)` when the marker was not found.
    pub fn get(&self, key: &str) -> Option<Option<f64>> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| *value)
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.get(key).flatten()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn found_count(&self) -> usize {
        self.values.iter().filter(|(_, v)| v.is_some()).count()
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub marker: String,
    pub value: Option<f64>,
    pub unit: String,
    pub status: MarkerStatus,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub entries: Vec<ClassificationEntry>,
    pub score: u32,
    /// 找到數值的 marker 數量（包含沒有參考範圍的）
    pub total: usize,
}

impl ReportSummary {
    pub fn marker_count(&self) -> usize {
        self.entries.len()
    }

    pub fn count(&self, status: MarkerStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn abnormal(&self) -> impl Iterator<Item = &ClassificationEntry> {
        self.entries.iter().filter(|e| e.status.is_abnormal())
    }

    pub fn entry(&self, marker: &str) -> Option<&ClassificationEntry> {
        self.entries.iter().find(|e| e.marker == marker)
    }
}

/// 外部文字萃取服務產出的一份報告文字
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    pub name: String,
    pub source_text: String,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Csv,
    Json,
    Txt,
}

impl OutputFormat {
    pub const ALL: [&'static str; 3] = ["csv", "json", "txt"];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Txt => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(format!(
                "unsupported output format '{}'. Valid formats: {}",
                other,
                Self::ALL.join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSettings {
    pub filename: String,
    pub include_source_text: bool,
}
