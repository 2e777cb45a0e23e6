use crate::domain::model::{ClassificationEntry, ReportSummary};
use crate::utils::error::Result;

pub const CSV_HEADER: &str = "marker,value,unit,status,low,high,advice";

/// `glucose_fasting` -> `Glucose Fasting`
///
/// 底線換成空白後做 title case：每段連續字母的第一個字大寫，其餘小寫，
/// 數字與空白會開始新的一段 (`hba1c` -> `Hba1C`)。
pub fn pretty_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    let mut previous_cased = false;

    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        let cased = c.is_uppercase() || c.is_lowercase();
        if cased && !previous_cased {
            name.extend(c.to_uppercase());
        } else if cased {
            name.extend(c.to_lowercase());
        } else {
            name.push(c);
        }
        previous_cased = cased;
    }

    name
}

pub fn to_csv(summary: &ReportSummary) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER.split(','))?;
    for entry in &summary.entries {
        writer.serialize(entry)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn to_json(summary: &ReportSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

fn format_value(entry: &ClassificationEntry) -> String {
    entry.value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn format_range(entry: &ClassificationEntry) -> String {
    match (entry.low, entry.high) {
        (Some(low), Some(high)) => format!("{} - {}", low, high),
        _ => "-".to_string(),
    }
}

/// 純文字表格，給終端機或 .txt 輸出
pub fn to_text(summary: &ReportSummary) -> String {
    let mut lines = vec![
        format!(
            "Health score: {}/100 (computed from {} of {} markers found)",
            summary.score,
            summary.total,
            summary.marker_count()
        ),
        String::new(),
        format!(
            "{:<18} {:>10} {:<10} {:<8} {:<15} {}",
            "Marker", "Value", "Unit", "Status", "Range", "Advice"
        ),
    ];

    for entry in &summary.entries {
        lines.push(format!(
            "{:<18} {:>10} {:<10} {:<8} {:<15} {}",
            pretty_name(&entry.marker),
            format_value(entry),
            entry.unit,
            entry.status,
            format_range(entry),
            entry.advice
        ));
    }

    lines.join("\n")
}
