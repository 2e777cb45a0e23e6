use crate::domain::model::OutputFormat;
use crate::utils::error::{ReportError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 解析輸出格式，不支援或重複的格式都視為錯誤
pub fn validate_formats(field_name: &str, formats: &[String]) -> Result<Vec<OutputFormat>> {
    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(formats.len());

    for format in formats {
        let output_format = format.parse::<OutputFormat>().map_err(|reason| {
            ReportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason,
            }
        })?;
        if !seen.insert(output_format) {
            return Err(ReportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: "Format listed more than once".to_string(),
            });
        }
        parsed.push(output_format);
    }

    Ok(parsed)
}

/// 參考範圍：上下限必須是有限數值且 low <= high
pub fn validate_bounds(field_name: &str, low: f64, high: f64) -> Result<()> {
    if !low.is_finite() || !high.is_finite() {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("({}, {})", low, high),
            reason: "Bounds must be finite numbers".to_string(),
        });
    }
    if low > high {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("({}, {})", low, high),
            reason: "Lower bound is greater than upper bound".to_string(),
        });
    }
    Ok(())
}
