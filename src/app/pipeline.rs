//! Shared startup logic used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve source -> fetch/read CSV -> filter + parse -> build `Dashboard`
//!
//! The CLI, the web server and the TUI can then focus on presentation.

use crate::cli::SourceArgs;
use crate::cli::picker::prompt_for_csv_path;
use crate::dashboard::Dashboard;
use crate::data::{DEFAULT_API_URL, DEFAULT_DATASET_ID, load_reviews};
use crate::domain::{DashConfig, DataSource};
use crate::error::AppError;
use crate::io::ingest::IngestedData;

const ENV_API_URL: &str = "DRUGDASH_API_URL";
const ENV_DATASET_ID: &str = "DRUGDASH_DATASET_ID";

/// The loaded base table and the bindings built on it.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub ingest: IngestedData,
    pub dashboard: Dashboard,
}

/// Resolve the data source from flags, then `.env`/environment, then defaults.
pub fn resolve_config(args: &SourceArgs) -> Result<DashConfig, AppError> {
    dotenvy::dotenv().ok();
    let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

    let source = if let Some(path) = &args.csv {
        DataSource::Csv(path.clone())
    } else if args.pick {
        DataSource::Csv(prompt_for_csv_path()?)
    } else {
        let dataset_id = match (args.dataset_id, env(ENV_DATASET_ID)) {
            (Some(id), _) => id,
            (None, Some(raw)) => raw.trim().parse().map_err(|_| {
                AppError::usage(format!("Invalid {ENV_DATASET_ID} '{raw}': expected a number."))
            })?,
            (None, None) => DEFAULT_DATASET_ID,
        };
        let api_url = args
            .api_url
            .clone()
            .or_else(|| env(ENV_API_URL))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        DataSource::Uci { api_url, dataset_id }
    };

    Ok(DashConfig {
        source,
        seed: args.seed,
    })
}

/// Load the review table once and wrap it in a `Dashboard`.
pub fn load(config: &DashConfig) -> Result<Loaded, AppError> {
    match &config.source {
        DataSource::Uci { api_url, dataset_id } => {
            tracing::info!(dataset_id, api_url = api_url.as_str(), "fetching dataset")
        }
        DataSource::Csv(path) => tracing::info!(path = %path.display(), "reading local CSV"),
    }

    let ingest = load_reviews(&config.source)?;
    tracing::info!(
        rows_read = ingest.rows_read,
        rows_used = ingest.rows_used(),
        row_errors = ingest.row_errors.len(),
        "review table ready"
    );

    let dashboard = Dashboard::new(ingest.records.clone(), config.seed);
    Ok(Loaded { ingest, dashboard })
}
