use crate::domain::model::ReferenceRange;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{validate_bounds, Validate};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// 單一檢驗項目的定義：搜尋樣式（依序嘗試）、參考範圍與單位
#[derive(Debug, Clone)]
pub struct MarkerDefinition {
    key: String,
    patterns: Vec<Regex>,
    range: Option<ReferenceRange>,
    unit: String,
}

impl MarkerDefinition {
    /// Compiles every pattern case-insensitively. Each pattern must capture exactly one group.
    pub fn new<P: AsRef<str>>(
        key: &str,
        patterns: &[P],
        range: Option<ReferenceRange>,
        unit: &str,
    ) -> Result<Self> {
        if key.trim().is_empty() {
            return Err(ReportError::CatalogError {
                marker: key.to_string(),
                message: "Marker key cannot be empty".to_string(),
            });
        }

        if let Some(range) = range {
            validate_bounds(key, range.low, range.high).map_err(|e| ReportError::CatalogError {
                marker: key.to_string(),
                message: match e {
                    ReportError::InvalidConfigValueError { reason, .. } => reason,
                    other => other.to_string(),
                },
            })?;
        }

        let patterns = patterns
            .iter()
            .map(|p| compile_pattern(key, p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            key: key.to_string(),
            patterns,
            range,
            unit: unit.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    pub fn range(&self) -> Option<&ReferenceRange> {
        self.range.as_ref()
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

fn compile_pattern(key: &str, pattern: &str) -> Result<Regex> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ReportError::InvalidPattern {
            marker: key.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

    // captures_len 包含整體匹配 (group 0)
    let groups = regex.captures_len() - 1;
    if groups != 1 {
        return Err(ReportError::InvalidPattern {
            marker: key.to_string(),
            pattern: pattern.to_string(),
            message: format!("Expected exactly one capture group, found {}", groups),
        });
    }

    Ok(regex)
}

/// 檢驗項目目錄。啟動時載入一次，之後唯讀共用。
#[derive(Debug, Clone)]
pub struct MarkerCatalog {
    markers: Vec<MarkerDefinition>,
}

impl MarkerCatalog {
    pub fn new(markers: Vec<MarkerDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for marker in &markers {
            if !seen.insert(marker.key()) {
                return Err(ReportError::CatalogError {
                    marker: marker.key().to_string(),
                    message: "Duplicate marker key".to_string(),
                });
            }
        }
        Ok(Self { markers })
    }

    pub fn default_catalog() -> Self {
        let markers = DEFAULT_MARKERS
            .iter()
            .map(|(key, patterns, (low, high, unit))| {
                MarkerDefinition::new(key, *patterns, Some(ReferenceRange::new(*low, *high)), unit)
            })
            .collect::<Result<Vec<_>>>()
            .expect("built-in marker catalog must compile");

        Self { markers }
    }

    /// 附加其他項目，key 不可重複
    pub fn extend(self, extra: Vec<MarkerDefinition>) -> Result<Self> {
        let mut markers = self.markers;
        markers.extend(extra);
        Self::new(markers)
    }

    pub fn get(&self, key: &str) -> Option<&MarkerDefinition> {
        self.markers.iter().find(|m| m.key() == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|m| m.key())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarkerDefinition> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl<'a> IntoIterator for &'a MarkerCatalog {
    type Item = &'a MarkerDefinition;
    type IntoIter = std::slice::Iter<'a, MarkerDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

/// Strict load-time checks on top of what construction already enforces.
impl Validate for MarkerCatalog {
    fn validate(&self) -> Result<()> {
        if self.markers.is_empty() {
            return Err(ReportError::ConfigValidationError {
                field: "markers".to_string(),
                message: "Catalog must define at least one marker".to_string(),
            });
        }

        for marker in &self.markers {
            if marker.patterns.is_empty() {
                return Err(ReportError::CatalogError {
                    marker: marker.key.clone(),
                    message: "Marker has no search patterns".to_string(),
                });
            }
        }

        Ok(())
    }
}

type DefaultMarker = (
    &'static str,
    &'static [&'static str],
    (f64, f64, &'static str),
);

const DEFAULT_MARKERS: &[DefaultMarker] = &[
    (
        "hemoglobin",
        &[
            r"hemoglobin[:\s]*([0-9]+\.?[0-9]*)",
            r"\bHB[:\s]*([0-9]+\.?[0-9]*)",
            r"\bHgb[:\s]*([0-9]+\.?[0-9]*)",
        ],
        (13.5, 17.5, "g/dL"),
    ),
    (
        "wbc",
        &[
            r"\bWBC[:\s]*([0-9]+\.?[0-9]*)",
            r"white blood cell[:\s]*([0-9]+\.?[0-9]*)",
        ],
        (4.0, 11.0, "10^3/uL"),
    ),
    ("rbc", &[r"\bRBC[:\s]*([0-9]+\.?[0-9]*)"], (4.5, 5.9, "10^6/uL")),
    (
        "platelets",
        &[r"\bPlatelet[s]*[:\s]*([0-9]+\.?[0-9]*)"],
        (150.0, 450.0, "10^3/uL"),
    ),
    (
        "glucose_fasting",
        &[
            r"glucose fasting[:\s]*([0-9]+\.?[0-9]*)",
            r"fbg[:\s]*([0-9]+\.?[0-9]*)",
        ],
        (70.0, 99.0, "mg/dL"),
    ),
    (
        "cholesterol",
        &[
            r"cholesterol[:\s]*([0-9]+\.?[0-9]*)",
            r"total cholesterol[:\s]*([0-9]+\.?[0-9]*)",
        ],
        (0.0, 200.0, "mg/dL"),
    ),
    ("hdl", &[r"\bHDL[:\s]*([0-9]+\.?[0-9]*)"], (40.0, 60.0, "mg/dL")),
    ("ldl", &[r"\bLDL[:\s]*([0-9]+\.?[0-9]*)"], (0.0, 100.0, "mg/dL")),
    (
        "triglycerides",
        &[
            r"\bTriglyceride[s]*[:\s]*([0-9]+\.?[0-9]*)",
            r"\bTG[:\s]*([0-9]+\.?[0-9]*)",
        ],
        (0.0, 150.0, "mg/dL"),
    ),
    (
        "alt",
        &[
            r"\bALT[:\s]*([0-9]+\.?[0-9]*)",
            r"alanine transaminase[:\s]*([0-9]+\.?[0-9]*)",
        ],
        (7.0, 56.0, "U/L"),
    ),
    (
        "ast",
        &[
            r"\bAST[:\s]*([0-9]+\.?[0-9]*)",
            r"aspartate transaminase[:\s]*([0-9]+\.?[0-9]*)",
        ],
        (10.0, 40.0, "U/L"),
    ),
    (
        "creatinine",
        &[r"\bCreatinine[:\s]*([0-9]+\.?[0-9]*)"],
        (0.7, 1.3, "mg/dL"),
    ),
    (
        "urea",
        &[
            r"\bUrea[:\s]*([0-9]+\.?[0-9]*)",
            r"\bBUN[:\s]*([0-9]+\.?[0-9]*)",
        ],
        (7.0, 20.0, "mg/dL"),
    ),
    (
        "sodium",
        &[r"\bSodium[:\s]*([0-9]+\.?[0-9]*)"],
        (135.0, 145.0, "mmol/L"),
    ),
    (
        "potassium",
        &[r"\bPotassium[:\s]*([0-9]+\.?[0-9]*)"],
        (3.5, 5.0, "mmol/L"),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order_and_size() {
        let catalog = MarkerCatalog::default_catalog();
        let keys: Vec<&str> = catalog.keys().collect();
        assert_eq!(keys.len(), 15);
        assert_eq!(keys[0], "hemoglobin");
        assert_eq!(keys[1], "wbc");
        assert_eq!(keys[14], "potassium");
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_default_ranges_and_units() {
        let catalog = MarkerCatalog::default_catalog();
        let hgb = catalog.get("hemoglobin").unwrap();
        assert_eq!(hgb.range(), Some(&ReferenceRange::new(13.5, 17.5)));
        assert_eq!(hgb.unit(), "g/dL");
        assert_eq!(hgb.patterns().len(), 3);

        let k = catalog.get("potassium").unwrap();
        assert_eq!(k.unit(), "mmol/L");
    }

    #[test]
    fn test_patterns_compile_case_insensitive() {
        let marker = MarkerDefinition::new("hdl", &[r"\bHDL[:\s]*([0-9]+)"], None, "mg/dL").unwrap();
        assert!(marker.patterns()[0].is_match("hdl: 45"));
        assert!(marker.patterns()[0].is_match("HDL: 45"));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = MarkerDefinition::new(
            "hdl",
            &[r"hdl\s*([0-9]+)"],
            Some(ReferenceRange::new(60.0, 40.0)),
            "mg/dL",
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::CatalogError { .. }));
    }

    #[test]
    fn test_rejects_wrong_capture_count() {
        let none = MarkerDefinition::new("ldl", &[r"ldl\s*[0-9]+"], None, "");
        assert!(matches!(none, Err(ReportError::InvalidPattern { .. })));

        let two = MarkerDefinition::new("ldl", &[r"(ldl)\s*([0-9]+)"], None, "");
        assert!(matches!(two, Err(ReportError::InvalidPattern { .. })));
    }

    #[test]
    fn test_rejects_invalid_regex() {
        let err = MarkerDefinition::new("ldl", &[r"ldl\s*([0-9]+"], None, "").unwrap_err();
        assert!(matches!(err, ReportError::InvalidPattern { .. }));
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let a = MarkerDefinition::new("alt", &[r"alt\s*([0-9]+)"], None, "U/L").unwrap();
        let b = MarkerDefinition::new("alt", &[r"sgpt\s*([0-9]+)"], None, "U/L").unwrap();
        assert!(MarkerCatalog::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_zero_patterns_allowed_but_fail_strict_validation() {
        let empty: [&str; 0] = [];
        let marker = MarkerDefinition::new("ferritin", &empty, None, "ng/mL").unwrap();
        let catalog = MarkerCatalog::new(vec![marker]).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_extend_default_catalog() {
        let ferritin = MarkerDefinition::new(
            "ferritin",
            &[r"ferritin[:\s]*([0-9]+\.?[0-9]*)"],
            Some(ReferenceRange::new(24.0, 336.0)),
            "ng/mL",
        )
        .unwrap();
        let catalog = MarkerCatalog::default_catalog().extend(vec![ferritin]).unwrap();
        assert_eq!(catalog.len(), 16);
        assert_eq!(catalog.keys().last(), Some("ferritin"));
    }
}
