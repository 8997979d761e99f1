//! Dataset acquisition.

pub mod uci;

pub use uci::{DEFAULT_API_URL, DEFAULT_DATASET_ID, UciClient};

use crate::domain::DataSource;
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_reviews_csv};

/// Load review records from the configured source. Blocking.
pub fn load_reviews(source: &DataSource) -> Result<IngestedData, AppError> {
    match source {
        DataSource::Uci { api_url, dataset_id } => UciClient::new(api_url.clone())?.fetch_reviews(*dataset_id),
        DataSource::Csv(path) => load_reviews_csv(path),
    }
}
