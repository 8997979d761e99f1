//! UCI Machine Learning Repository integration.
//!
//! A dataset is addressed by its numeric catalog id. The API returns metadata
//! that includes a `data_url`; the table itself is a CSV at that URL.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::AppError;
use crate::io::ingest::{IngestedData, parse_reviews};

pub const DEFAULT_API_URL: &str = "https://archive.ics.uci.edu/api/dataset";
/// Drug Review Dataset (Drugs.com).
pub const DEFAULT_DATASET_ID: u32 = 462;

/// Catalog metadata for a dataset (only the fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetMeta {
    pub uci_id: Option<u32>,
    pub name: Option<String>,
    pub data_url: Option<String>,
}

pub struct UciClient {
    client: Client,
    api_url: String,
}

impl UciClient {
    /// Build a client with no overall request deadline; the dataset CSV is
    /// large and the download must run to completion on slow links.
    pub fn new(api_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Look up the catalog entry for `id`.
    pub fn fetch_meta(&self, id: u32) -> Result<DatasetMeta, AppError> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[("id", id.to_string())])
            .send()
            .map_err(|e| AppError::runtime(format!("UCI metadata request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::runtime(format!(
                "UCI metadata request failed with status {}.",
                resp.status()
            )));
        }

        let body: MetaResponse = resp
            .json()
            .map_err(|e| AppError::runtime(format!("Failed to parse UCI metadata: {e}")))?;

        if body.status.is_some_and(|s| s != 200) {
            return Err(AppError::runtime(format!(
                "UCI API returned status {} for dataset {id}: {}",
                body.status.unwrap_or_default(),
                body.message.unwrap_or_default()
            )));
        }

        body.data
            .ok_or_else(|| AppError::runtime(format!("UCI API returned no metadata for dataset {id}.")))
    }

    /// Fetch the dataset's CSV and parse it into filtered review records.
    pub fn fetch_reviews(&self, id: u32) -> Result<IngestedData, AppError> {
        let meta = self.fetch_meta(id)?;
        let data_url = meta.data_url.as_deref().ok_or_else(|| {
            AppError::runtime(format!("Dataset {id} is not available for download (no data_url)."))
        })?;

        tracing::info!(
            dataset_id = id,
            name = meta.name.as_deref().unwrap_or("-"),
            data_url,
            "downloading dataset"
        );

        let resp = self
            .client
            .get(data_url)
            .send()
            .map_err(|e| AppError::runtime(format!("Dataset download failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::runtime(format!(
                "Dataset download failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| AppError::runtime(format!("Failed to read dataset body: {e}")))?;

        parse_reviews(body.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct MetaResponse {
    status: Option<u16>,
    message: Option<String>,
    data: Option<DatasetMeta>,
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    const CSV_HEADER: &[u8] = b"drugName,condition,rating,date,usefulCount\n";
    const CSV_ROW: &[u8] = b"A,Pain,4,01-Jan-10,3\n";

    /// Reads one request head and returns its request line.
    fn read_request(stream: &TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 2 {
            line.clear();
        }
        request_line
    }

    /// Catalog endpoint plus a CSV that trickles out one row per `gap`.
    fn spawn_catalog(rows: usize, gap: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(2) {
                let mut stream = stream.unwrap();
                if read_request(&stream).contains("/data.csv") {
                    stream
                        .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nConnection: close\r\n\r\n")
                        .unwrap();
                    stream.write_all(CSV_HEADER).unwrap();
                    for _ in 0..rows {
                        thread::sleep(gap);
                        stream.write_all(CSV_ROW).unwrap();
                        stream.flush().unwrap();
                    }
                } else {
                    let body = format!(
                        r#"{{"status":200,"data":{{"uci_id":462,"name":"slow","data_url":"http://{addr}/data.csv"}}}}"#
                    );
                    write!(
                        stream,
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    )
                    .unwrap();
                }
            }
        });
        format!("http://{addr}/api/dataset")
    }

    #[test]
    fn slow_download_runs_to_completion() {
        // Outlasts reqwest's default 30 s whole-request deadline.
        let api_url = spawn_catalog(31, Duration::from_secs(1));
        let started = Instant::now();
        let data = UciClient::new(api_url).unwrap().fetch_reviews(462).unwrap();
        assert!(started.elapsed() > Duration::from_secs(30));
        assert_eq!(data.rows_read, 31);
        assert_eq!(data.records.len(), 31);
    }

    #[test]
    fn fast_download_parses_records() {
        let api_url = spawn_catalog(3, Duration::ZERO);
        let data = UciClient::new(api_url).unwrap().fetch_reviews(462).unwrap();
        assert_eq!(data.records.len(), 3);
    }

    #[test]
    fn parses_catalog_response() {
        let raw = r#"{
            "status": 200,
            "data": {
                "uci_id": 462,
                "name": "Drug Review Dataset (Drugs.com)",
                "data_url": "https://archive.ics.uci.edu/static/public/462/data.csv",
                "abstract": "ignored"
            }
        }"#;
        let body: MetaResponse = serde_json::from_str(raw).unwrap();
        let meta = body.data.unwrap();
        assert_eq!(meta.uci_id, Some(DEFAULT_DATASET_ID));
        assert!(meta.data_url.unwrap().ends_with("data.csv"));
    }

    #[test]
    fn parses_error_response() {
        let raw = r#"{ "status": 404, "message": "not found" }"#;
        let body: MetaResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.status, Some(404));
        assert!(body.data.is_none());
    }
}
