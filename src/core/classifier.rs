use crate::core::catalog::{MarkerCatalog, MarkerDefinition};
use crate::domain::model::{ClassificationEntry, ExtractionResult, MarkerStatus, ReferenceRange};

pub const ADVICE_MISSING: &str = "value not found in source text";
pub const ADVICE_NO_RANGE: &str = "no reference range configured";
pub const ADVICE_NORMAL: &str = "within reference range";
pub const ADVICE_LOW: &str = "below reference range — flag for review";
pub const ADVICE_HIGH: &str = "above reference range — flag for review";

/// 狀態判定表，依序套用
pub fn classify_value(
    value: Option<f64>,
    range: Option<&ReferenceRange>,
) -> (MarkerStatus, &'static str) {
    let Some(value) = value else {
        return (MarkerStatus::Missing, ADVICE_MISSING);
    };
    let Some(range) = range else {
        return (MarkerStatus::Unknown, ADVICE_NO_RANGE);
    };

    if range.contains(value) {
        (MarkerStatus::Normal, ADVICE_NORMAL)
    } else if value < range.low {
        (MarkerStatus::Low, ADVICE_LOW)
    } else {
        (MarkerStatus::High, ADVICE_HIGH)
    }
}

pub fn classify(marker: &MarkerDefinition, value: Option<f64>) -> ClassificationEntry {
    let range = marker.range();
    let (status, advice) = classify_value(value, range);

    ClassificationEntry {
        marker: marker.key().to_string(),
        value,
        unit: marker.unit().to_string(),
        status,
        low: range.map(|r| r.low),
        high: range.map(|r| r.high),
        advice: advice.to_string(),
    }
}

/// 依目錄順序分類整份萃取結果
pub fn classify_all(extraction: &ExtractionResult, catalog: &MarkerCatalog) -> Vec<ClassificationEntry> {
    catalog
        .iter()
        .map(|marker| classify(marker, extraction.value(marker.key())))
        .collect()
}
