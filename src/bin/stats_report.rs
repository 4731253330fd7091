use anyhow::Context;
use clap::Parser;
use cifra::config::toml_config::ReportConfig;
use cifra::utils::{logger, validation::Validate};
use cifra::{FormatEngine, LocalStorage, ReportPipeline};

#[derive(Parser)]
#[command(name = "stats-report")]
#[command(about = "Render a statistics payload into formatted report files")]
struct Args {
    /// Path to TOML report configuration file
    #[arg(short, long, default_value = "informe.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be generated without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Loading report configuration from: {}", args.config);
    let config = ReportConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    tracing::info!("Configuration loaded and validated");

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("Dry run requested, no report will be generated");
        return Ok(());
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = ReportPipeline::new(storage, config);
    let engine = FormatEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Report written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("Report generation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn display_config_summary(config: &ReportConfig) {
    println!("📋 Report: {} v{}", config.report.name, config.report.version);
    println!("   {}", config.report.description);
    match config.source.r#type.as_str() {
        "api" => println!(
            "   Source: {}",
            config.source.endpoint.as_deref().unwrap_or("(missing)")
        ),
        _ => println!(
            "   Source: {}",
            config.source.path.as_deref().unwrap_or("(missing)")
        ),
    }
    println!("   Fields:");
    for field in &config.fields {
        println!(
            "     - {} ({})",
            field.display_label(),
            field.format.as_marker()
        );
    }
    println!(
        "   Output: {} [{}]",
        config.load.output_path,
        config.load.output_formats.join(", ")
    );
}
