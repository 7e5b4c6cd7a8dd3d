use clap::Parser;
use dem_fetch::utils::logger;
use dem_fetch::{CliConfig, DemFetcher, FetchError, LocalStorage};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match CliConfig::try_parse() {
        Ok(config) => config,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logger::init_cli_logger(config.verbose);
    tracing::info!("Starting dem-fetch");

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            report_failure(&e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(
        "Provider: {} ({}), retry policy: {:?}",
        settings.provider.endpoint,
        settings.provider.dem_type,
        settings.retry
    );

    let fetcher = match DemFetcher::new(LocalStorage::new(), settings.provider, settings.retry) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            report_failure(&e);
            return ExitCode::FAILURE;
        }
    };

    match fetcher.fetch(&settings.request).await {
        Ok(report) => {
            tracing::info!(
                "✅ Download finished in {:?} after {} attempt(s)",
                report.elapsed,
                report.attempts
            );
            println!("SUCCESS: DEM saved to {}", report.output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(
                "❌ Download failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_failure(e: &FetchError) {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}
