pub mod catalog_config;
pub mod cli;
pub mod toml_config;

use regex::Regex;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern must compile")
});

/// 替換環境變數 (例如 ${REPORT_DIR})，找不到的變數保持原樣
pub(crate) fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::catalog_config::CatalogConfig;
    use crate::core::catalog::MarkerCatalog;
    use crate::core::ConfigProvider;
    use crate::domain::model::{BundleSettings, OutputFormat};
    use crate::utils::error::{ReportError, Result};
    use crate::utils::validation::{
        validate_formats, validate_non_empty_string, validate_path, validate_positive_number,
        Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "lab-report")]
    #[command(about = "Classify lab markers found in extracted report text")]
    pub struct CliConfig {
        /// Text files produced by the text-extraction service
        #[arg(required = true)]
        pub inputs: Vec<String>,

        /// TOML marker catalog; the built-in catalog is used when omitted
        #[arg(long)]
        pub catalog: Option<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "csv,json")]
        pub formats: Vec<String>,

        #[arg(long, default_value = "4")]
        pub concurrency: usize,

        /// Bundle every output into a single ZIP file with this name
        #[arg(long)]
        pub bundle: Option<String>,

        /// Add the raw report text to the bundle
        #[arg(long)]
        pub include_source: bool,

        /// Do not prefix output files with a timestamp
        #[arg(long)]
        pub no_timestamp: bool,

        /// Print a text summary of each report to stdout
        #[arg(long)]
        pub print: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub log_json: bool,
    }

    impl CliConfig {
        pub fn load_catalog(&self) -> Result<MarkerCatalog> {
            match &self.catalog {
                Some(path) => {
                    tracing::info!("📚 Loading marker catalog from: {}", path);
                    CatalogConfig::from_file(path)?.build_catalog()
                }
                None => Ok(MarkerCatalog::default_catalog()),
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn inputs(&self) -> &[String] {
            &self.inputs
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> Result<Vec<OutputFormat>> {
            validate_formats("formats", &self.formats)
        }

        fn concurrency(&self) -> usize {
            self.concurrency
        }

        fn bundle(&self) -> Option<BundleSettings> {
            self.bundle.as_ref().map(|filename| BundleSettings {
                filename: filename.clone(),
                include_source_text: self.include_source,
            })
        }

        fn timestamped_outputs(&self) -> bool {
            !self.no_timestamp
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            for input in &self.inputs {
                validate_path("inputs", input)?;
            }
            validate_path("output_path", &self.output_path)?;
            validate_positive_number("concurrency", self.concurrency, 1)?;
            validate_formats("formats", &self.formats)?;
            if let Some(bundle) = &self.bundle {
                validate_non_empty_string("bundle", bundle)?;
            }
            if self.include_source && self.bundle.is_none() {
                return Err(ReportError::ConfigValidationError {
                    field: "include_source".to_string(),
                    message: "--include-source requires --bundle".to_string(),
                });
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_defaults() {
            let config = CliConfig::parse_from(["lab-report", "cbc.txt"]);
            assert_eq!(config.inputs, vec!["cbc.txt"]);
            assert_eq!(config.formats, vec!["csv", "json"]);
            assert_eq!(config.concurrency, 4);
            assert!(config.timestamped_outputs());
            assert!(config.bundle().is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_parse_bundle_and_formats() {
            let config = CliConfig::parse_from([
                "lab-report",
                "a.txt",
                "b.txt",
                "--formats",
                "txt,csv",
                "--bundle",
                "reports.zip",
                "--include-source",
                "--no-timestamp",
            ]);
            assert_eq!(
                config.output_formats().unwrap(),
                vec![OutputFormat::Txt, OutputFormat::Csv]
            );
            assert_eq!(
                config.bundle(),
                Some(BundleSettings {
                    filename: "reports.zip".to_string(),
                    include_source_text: true,
                })
            );
            assert!(!config.timestamped_outputs());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_validation_failures() {
            let bad_format = CliConfig::parse_from(["lab-report", "a.txt", "--formats", "pdf"]);
            assert!(bad_format.validate().is_err());

            let zero = CliConfig::parse_from(["lab-report", "a.txt", "--concurrency", "0"]);
            assert!(zero.validate().is_err());

            let orphan = CliConfig::parse_from(["lab-report", "a.txt", "--include-source"]);
            assert!(orphan.validate().is_err());
        }

        #[test]
        fn test_format_aliases_are_accepted() {
            let config = CliConfig::parse_from(["lab-report", "a.txt", "--formats", "JSON,text"]);
            assert!(config.validate().is_ok());
            assert_eq!(
                config.output_formats().unwrap(),
                vec![OutputFormat::Json, OutputFormat::Txt]
            );
        }

        #[test]
        fn test_default_catalog_when_no_file() {
            let config = CliConfig::parse_from(["lab-report", "a.txt"]);
            assert_eq!(config.load_catalog().unwrap().len(), 15);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LAB_REPORT_TEST_DIR", "/tmp/reports");
        let out = substitute_env_vars("output_path = \"${LAB_REPORT_TEST_DIR}/out\"");
        assert_eq!(out, "output_path = \"/tmp/reports/out\"");
        std::env::remove_var("LAB_REPORT_TEST_DIR");
    }

    #[test]
    fn test_unknown_env_var_kept() {
        let out = substitute_env_vars("x = \"${LAB_REPORT_SURELY_UNSET}\"");
        assert_eq!(out, "x = \"${LAB_REPORT_SURELY_UNSET}\"");
    }

    #[test]
    fn test_regex_quantifiers_untouched() {
        let pattern = r"patterns = ['hb[:\s]*([0-9]{1,3})']";
        assert_eq!(substitute_env_vars(pattern), pattern);
    }
}
