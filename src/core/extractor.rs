use crate::core::catalog::{MarkerCatalog, MarkerDefinition};
use crate::domain::model::ExtractionResult;
use regex::Regex;

/// 單一樣式對文字的比對結果
#[derive(Debug, Clone, PartialEq)]
pub enum PatternOutcome<'t> {
    NoMatch,
    /// Matched, but the captured text is not a finite number.
    Unparseable(&'t str),
    Parsed(f64),
}

pub fn evaluate_pattern<'t>(pattern: &Regex, text: &'t str) -> PatternOutcome<'t> {
    let Some(captures) = pattern.captures(text) else {
        return PatternOutcome::NoMatch;
    };

    // 可選的 group 可能沒有參與匹配
    let raw = captures.get(1).map(|m| m.as_str()).unwrap_or("");
    match parse_numeral(raw) {
        Some(value) => PatternOutcome::Parsed(value),
        None => PatternOutcome::Unparseable(raw),
    }
}

fn parse_numeral(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// 依序嘗試樣式，第一個解析成功的值勝出
pub fn resolve_marker(marker: &MarkerDefinition, normalized_text: &str) -> Option<f64> {
    for pattern in marker.patterns() {
        match evaluate_pattern(pattern, normalized_text) {
            PatternOutcome::Parsed(value) => {
                tracing::debug!("🔎 {} = {} (pattern: {})", marker.key(), value, pattern.as_str());
                return Some(value);
            }
            PatternOutcome::Unparseable(raw) => {
                tracing::warn!(
                    "⚠️ {}: captured '{}' is not a number, trying next pattern",
                    marker.key(),
                    raw
                );
            }
            PatternOutcome::NoMatch => {}
        }
    }

    None
}

/// 從報告文字中萃取所有 marker 的數值。結果一定涵蓋目錄中的每個 key。
pub fn extract(text: &str, catalog: &MarkerCatalog) -> ExtractionResult {
    let normalized = text.to_lowercase();
    let mut result = ExtractionResult::with_capacity(catalog.len());

    for marker in catalog {
        result.insert(marker.key(), resolve_marker(marker, &normalized));
    }

    result
}
