use anyhow::Result;
use lab_report_etl::core::render::CSV_HEADER;
use lab_report_etl::{
    CliConfig, EtlEngine, LocalStorage, MarkerCatalog, ReportError, ReportPipeline, TomlConfig,
};
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

fn cli_config(inputs: Vec<String>, output_path: &str) -> CliConfig {
    CliConfig {
        inputs,
        catalog: None,
        output_path: output_path.to_string(),
        formats: vec!["csv".to_string(), "json".to_string()],
        concurrency: 2,
        bundle: None,
        include_source: false,
        no_timestamp: true,
        print: false,
        verbose: false,
        log_json: false,
    }
}

#[tokio::test]
async fn test_end_to_end_with_local_storage() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let input = input_dir.path().join("cbc.txt");
    std::fs::write(&input, "CITY LAB\nHemoglobin: 14.2, WBC: 12.5\nEnd of report")?;

    let config = cli_config(vec![input.to_str().unwrap().to_string()], &output_path);
    let pipeline = ReportPipeline::new(
        LocalStorage::current_dir(),
        LocalStorage::new(output_path.clone()),
        config,
        Arc::new(MarkerCatalog::default_catalog()),
    );

    let outcome = EtlEngine::new(pipeline).run().await?;

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].name, "cbc");
    assert_eq!(outcome.reports[0].summary.score, 50);
    assert_eq!(outcome.reports[0].summary.total, 2);
    assert_eq!(outcome.outputs.len(), 2);

    let csv = std::fs::read_to_string(output_dir.path().join("cbc.csv"))?;
    assert!(csv.starts_with(CSV_HEADER));
    assert!(csv.contains("wbc,12.5,10^3/uL,high,4.0,11.0,"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.path().join("cbc.json"))?)?;
    assert_eq!(json["score"], 50);
    assert_eq!(json["entries"].as_array().unwrap().len(), 15);

    Ok(())
}

#[tokio::test]
async fn test_timestamped_outputs_and_empty_report() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let input = input_dir.path().join("blank.txt");
    std::fs::write(&input, "")?;

    let mut config = cli_config(vec![input.to_str().unwrap().to_string()], &output_path);
    config.no_timestamp = false;
    config.formats = vec!["txt".to_string()];

    let pipeline = ReportPipeline::new(
        LocalStorage::current_dir(),
        LocalStorage::new(output_path.clone()),
        config,
        Arc::new(MarkerCatalog::default_catalog()),
    );
    let outcome = EtlEngine::new(pipeline).run().await?;

    assert_eq!(outcome.reports[0].summary.score, 0);
    assert_eq!(outcome.reports[0].summary.total, 0);

    let written: Vec<String> = std::fs::read_dir(output_dir.path())?
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written.len(), 1);
    // 例如 20261017093000_blank.txt
    let (prefix, rest) = written[0].split_once('_').unwrap();
    assert_eq!(prefix.len(), 14);
    assert!(prefix.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(rest, "blank.txt");

    let text = std::fs::read_to_string(output_dir.path().join(&written[0]))?;
    assert!(text.starts_with("Health score: 0/100 (computed from 0 of 15 markers found)"));

    Ok(())
}

#[tokio::test]
async fn test_missing_input_fails_with_input_error() {
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let config = cli_config(vec!["/no/such/report.txt".to_string()], &output_path);
    let pipeline = ReportPipeline::new(
        LocalStorage::current_dir(),
        LocalStorage::new(output_path),
        config,
        Arc::new(MarkerCatalog::default_catalog()),
    );

    let err = EtlEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, ReportError::InputError { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_toml_config_with_custom_catalog_and_bundle() -> Result<()> {
    let work_dir = TempDir::new()?;
    let base = work_dir.path().to_str().unwrap().replace('\\', "/");

    std::fs::write(
        work_dir.path().join("thyroid-a.txt"),
        "TSH: 2.1 mIU/L\nFree T4: 0.6 ng/dL",
    )?;
    std::fs::write(work_dir.path().join("thyroid-b.txt"), "TSH: 7.9 mIU/L")?;

    let config_content = format!(
        r#"
[pipeline]
name = "thyroid-panel"
version = "1.0.0"

[source]
inputs = ["{base}/thyroid-a.txt", "{base}/thyroid-b.txt"]

[analysis]
concurrency = 1

[[catalog.markers]]
key = "tsh"
patterns = ['\btsh[:\s]*([0-9]+\.?[0-9]*)']
low = 0.4
high = 4.0
unit = "mIU/L"

[[catalog.markers]]
key = "free_t4"
patterns = ['free t4[:\s]*([0-9]+\.?[0-9]*)']
low = 0.8
high = 1.8
unit = "ng/dL"

[load]
output_path = "{base}/out"
output_formats = ["csv"]
timestamped = false

[load.bundle]
enabled = true
filename = "thyroid.zip"
include_source_text = true
"#
    );

    let config_path = work_dir.path().join("thyroid.toml");
    std::fs::write(&config_path, config_content)?;

    let config = TomlConfig::from_file(&config_path)?;
    lab_report_etl::utils::validation::Validate::validate(&config)?;
    let catalog = Arc::new(config.build_catalog()?);

    let pipeline = ReportPipeline::new(
        LocalStorage::current_dir(),
        LocalStorage::new(format!("{}/out", base)),
        config,
        catalog,
    );
    let outcome = EtlEngine::new(pipeline).run().await?;

    let scores: Vec<u32> = outcome.reports.iter().map(|r| r.summary.score).collect();
    assert_eq!(scores, vec![50, 0]);
    assert_eq!(outcome.outputs, vec![format!("{}/out/thyroid.zip", base)]);

    let zip_file = std::fs::File::open(work_dir.path().join("out").join("thyroid.zip"))?;
    let mut archive = zip::ZipArchive::new(zip_file)?;
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "thyroid-a.csv",
            "thyroid-a.source.txt",
            "thyroid-b.csv",
            "thyroid-b.source.txt"
        ]
    );

    let mut csv = String::new();
    archive.by_name("thyroid-a.csv")?.read_to_string(&mut csv)?;
    assert!(csv.contains("free_t4,0.6,ng/dL,low,0.8,1.8,"));

    Ok(())
}
