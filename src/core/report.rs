use crate::core::catalog::MarkerCatalog;
use crate::core::{classifier, extractor, scorer};
use crate::domain::model::{ClassificationEntry, ReportSummary};

pub fn assemble(entries: Vec<ClassificationEntry>, score: u32, total: usize) -> ReportSummary {
    ReportSummary {
        entries,
        score,
        total,
    }
}

/// 文字 -> 萃取 -> 分類 -> 計分 -> 報告
pub fn analyze(text: &str, catalog: &MarkerCatalog) -> ReportSummary {
    let extraction = extractor::extract(text, catalog);
    tracing::debug!(
        "Extracted {} of {} markers",
        extraction.found_count(),
        extraction.len()
    );

    let entries = classifier::classify_all(&extraction, catalog);
    let (score, total) = scorer::score(&entries);

    assemble(entries, score, total)
}
