use clap::Parser;
use sf_fire_etl::utils::{logger, validation::Validate};
use sf_fire_etl::{CliConfig, EtlError, PipelineRunner, PostgresWarehouse};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_scheduled_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting SF fire incidents EL pipeline");

    let settings = cli.resolve()?;
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    if cli.verbose {
        tracing::debug!(?settings, "Resolved settings");
    }

    let warehouse = PostgresWarehouse::connect(&settings.database_url)
        .await
        .map_err(EtlError::from)?;

    let retries = settings.retries;
    let retry_delay = Duration::from_secs(settings.retry_delay_secs);
    let runner = PipelineRunner::new(settings, warehouse);

    match runner.run_with_retries(retries, retry_delay).await {
        Ok(result) => {
            tracing::info!(record_count = result.record_count, "✅ EL run completed");
            println!("✅ Loaded {} records", result.record_count);
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "❌ EL run failed");
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
