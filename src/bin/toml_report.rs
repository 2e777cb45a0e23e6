use clap::Parser;
use lab_report_etl::config::toml_config::TomlConfig;
use lab_report_etl::core::ConfigProvider;
use lab_report_etl::utils::{logger, validation::Validate};
use lab_report_etl::{EtlEngine, LocalStorage, MarkerCatalog, ReportPipeline};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Lab report analysis driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "lab-report.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the bundle setting from config
    #[arg(long)]
    bundle: Option<bool>,

    /// Dry run - show the catalog and planned outputs without reading any report
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based lab report analysis");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(enabled) = args.bundle {
        if let Some(bundle) = config.load.bundle.as_mut() {
            bundle.enabled = enabled;
            tracing::info!("🔧 Bundle overridden to: {}", enabled);
        } else if enabled {
            tracing::warn!("⚠️ --bundle true ignored: no [load.bundle] section in config");
        }
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let catalog = Arc::new(config.build_catalog()?);
    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &catalog, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No reports will be read or written");
        perform_dry_run(&catalog);
        return Ok(());
    }

    let source = LocalStorage::current_dir();
    let sink = LocalStorage::new(config.output_path().to_string());
    let pipeline = ReportPipeline::new(source, sink, config, catalog);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(outcome) => {
            tracing::info!("✅ Analysis completed for {} report(s)", outcome.reports.len());
            for report in &outcome.reports {
                println!(
                    "🩺 {}: health score {}/100 ({} of {} markers found, {} abnormal)",
                    report.name,
                    report.summary.score,
                    report.summary.total,
                    report.summary.marker_count(),
                    report.summary.abnormal().count()
                );
            }
            for output in &outcome.outputs {
                println!("📁 Output saved to: {}", output);
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

fn display_config_summary(config: &TomlConfig, catalog: &MarkerCatalog, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Inputs: {}", config.inputs().len());
    println!("  Markers: {}", catalog.len());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  Concurrency: {}", config.concurrency());

    if let Some(bundle) = config.bundle() {
        println!("  Bundle: {} (source text: {})", bundle.filename, bundle.include_source_text);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(catalog: &MarkerCatalog) {
    println!("🔍 Marker Catalog:");
    for marker in catalog {
        let range = marker
            .range()
            .map(|r| format!("{} - {} {}", r.low, r.high, marker.unit()))
            .unwrap_or_else(|| "no reference range".to_string());
        println!(
            "  {:<18} {} pattern(s), {}",
            marker.key(),
            marker.patterns().len(),
            range
        );
    }

    println!();
    println!("✅ Dry run complete. Use --verbose for per-marker details during an actual run.");
}
