use clap::Parser;
use cifra::utils::{logger, validation::Validate};
use cifra::{CliConfig, FormatEngine, LocalStorage, MarkupPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting cifra markup formatting");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = MarkupPipeline::new(storage, config);
    let engine = FormatEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("Formatting pass completed");
            println!("✅ Formatted document written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("Formatting pass failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
