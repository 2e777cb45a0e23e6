use clap::Parser;
use lab_report_etl::core::render;
use lab_report_etl::utils::{logger, validation::Validate};
use lab_report_etl::{CliConfig, EtlEngine, LocalStorage, ReportPipeline};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting lab-report CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    // 目錄只載入一次，之後唯讀共用
    let catalog = match config.load_catalog() {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            tracing::error!("❌ Failed to load marker catalog: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };
    tracing::info!("📚 Marker catalog ready: {} markers", catalog.len());

    let print_reports = config.print;
    let source = LocalStorage::current_dir();
    let sink = LocalStorage::new(config.output_path.clone());
    let pipeline = ReportPipeline::new(source, sink, config, catalog);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(outcome) => {
            for report in &outcome.reports {
                println!(
                    "🩺 {}: health score {}/100 ({} of {} markers found)",
                    report.name,
                    report.summary.score,
                    report.summary.total,
                    report.summary.marker_count()
                );
                if print_reports {
                    println!("{}\n", render::to_text(&report.summary));
                }
            }
            for output in &outcome.outputs {
                println!("📁 {}", output);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Report analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
