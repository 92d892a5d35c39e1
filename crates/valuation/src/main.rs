//! Valuation workbook loader CLI.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use valuation::{PipelineError, Settings, run};
use valuation_alphavantage::AlphaVantageProvider;
use valuation_sheets::{GoogleWorkbook, ServiceAccountKey};

#[derive(Parser)]
#[command(name = "valuation")]
#[command(about = "Load statements and monthly closes into the valuation workbook", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Dotenv file read before the environment; skipped when absent
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

fn load_key(path: &Path) -> anyhow::Result<ServiceAccountKey> {
    ServiceAccountKey::from_file(path)
        .with_context(|| format!("loading service account key from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dotenv = dotenvy::from_path(&cli.env_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv {
        Ok(()) => tracing::debug!(path = %cli.env_file.display(), "Loaded env file"),
        Err(e) if e.not_found() => {
            tracing::debug!(path = %cli.env_file.display(), "No env file");
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", cli.env_file.display()));
        }
    }

    let settings = Settings::from_env()?;
    tracing::debug!(?settings, "Settings loaded");

    let key = load_key(&settings.credentials_path)?;
    let workbook = match &settings.spreadsheet_id {
        Some(id) => GoogleWorkbook::open_by_key(key, id).await,
        None => GoogleWorkbook::open(key, &settings.workbook_title).await,
    }
    .map_err(|source| PipelineError::Workbook {
        target: settings.workbook_title.clone(),
        source,
    })?;

    let mut client = reqwest::Client::builder();
    if let Some(timeout) = settings.api_timeout {
        client = client.timeout(timeout);
    }
    let client = client.build().context("building HTTP client")?;
    let provider = AlphaVantageProvider::with_client(client, settings.api_key.as_str())
        .with_base_url(settings.api_base_url.as_str());

    let today = chrono::Local::now().date_naive();
    let report = run(&workbook, &provider, &provider, &settings.run, today).await?;

    tracing::info!(
        symbols = report.symbols.len(),
        stages = report.stages.len(),
        "Valuation workbook updated"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation::DataError;

    #[test]
    fn test_missing_key_file_keeps_cause() {
        let err = load_key(Path::new("/nonexistent/service_account.json")).unwrap_err();
        assert!(err.to_string().contains("service_account.json"));
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::AuthenticationFailed(_))
        ));
    }
}
