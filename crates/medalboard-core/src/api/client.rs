//! Sources for the raw country dataset.
//!
//! A source performs exactly one fetch per call and never caches. Every
//! failure comes back as a `FetchError` so the repository can fold it into
//! its `Failed` state.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::models::OlympicCountry;

use super::FetchError;

// ============================================================================
// Constants
// ============================================================================

/// Location of the static dataset shipped with the application.
pub const DEFAULT_DATA_PATH: &str = "./assets/mock/olympic.json";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Something that can produce the full country array.
pub trait DatasetSource: Send + Sync + 'static {
    /// Human-readable location, used in log fields.
    fn location(&self) -> String;

    fn fetch(&self) -> impl Future<Output = Result<Vec<OlympicCountry>, FetchError>> + Send;
}

fn decode(body: &str) -> Result<Vec<OlympicCountry>, FetchError> {
    Ok(serde_json::from_str(body)?)
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches the dataset from a URL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Returns Ok(Some(body)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other statuses.
    async fn read_for_retry(response: reqwest::Response) -> Result<Option<String>, FetchError> {
        let status = response.status();
        if status.is_success() {
            Ok(Some(response.text().await?))
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::from_status(status, &body))
        }
    }

    async fn get_body(&self) -> Result<String, FetchError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(&self.url)
                .header(header::ACCEPT, "application/json")
                .send()
                .await?;

            match Self::read_for_retry(response).await? {
                Some(body) => return Ok(body),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(FetchError::RateLimited(MAX_RATE_LIMIT_RETRIES));
                    }
                    warn!(url = %self.url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }
}

impl DatasetSource for HttpSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<OlympicCountry>, FetchError> {
        let body = self.get_body().await?;
        debug!(url = %self.url, bytes = body.len(), "Dataset downloaded");
        decode(&body)
    }
}

// ============================================================================
// File
// ============================================================================

/// Reads the dataset from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

impl DatasetSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<OlympicCountry>, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), bytes = body.len(), "Dataset read from disk");
        decode(&body)
    }
}

// ============================================================================
// Either
// ============================================================================

/// Source chosen at runtime from configuration.
#[derive(Clone)]
pub enum AnySource {
    Http(HttpSource),
    File(FileSource),
}

impl AnySource {
    /// `http://` and `https://` locations go over the network, anything else
    /// is treated as a file path.
    pub fn from_location(location: &str, timeout: Duration) -> Result<Self, FetchError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(AnySource::Http(HttpSource::new(location, timeout)?))
        } else {
            Ok(AnySource::File(FileSource::new(location)))
        }
    }
}

impl DatasetSource for AnySource {
    fn location(&self) -> String {
        match self {
            AnySource::Http(source) => source.location(),
            AnySource::File(source) => source.location(),
        }
    }

    async fn fetch(&self) -> Result<Vec<OlympicCountry>, FetchError> {
        match self {
            AnySource::Http(source) => source.fetch().await,
            AnySource::File(source) => source.fetch().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FailureKind;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source_reads_country_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "country": "France", "participations": [
                {{"year": 2000, "city": "Sydney", "medalsCount": 5, "athleteCount": 20}}
            ]}}]"#
        )
        .unwrap();

        let source = FileSource::new(file.path());
        let data = source.fetch().await.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].country, "France");
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("absent.json"));
        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(err.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn test_file_source_object_instead_of_array_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"country": "France"}}"#).unwrap();

        let err = FileSource::new(file.path()).fetch().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
    }

    #[test]
    fn test_any_source_picks_transport_from_location() {
        let timeout = Duration::from_secs(1);
        let http = AnySource::from_location("https://example.org/olympic.json", timeout).unwrap();
        assert!(matches!(http, AnySource::Http(_)));
        assert_eq!(http.location(), "https://example.org/olympic.json");

        let file = AnySource::from_location("./assets/mock/olympic.json", timeout).unwrap();
        assert!(matches!(file, AnySource::File(_)));
    }

    #[test]
    fn test_default_file_source_points_at_bundled_asset() {
        assert_eq!(FileSource::default().path(), Path::new(DEFAULT_DATA_PATH));
    }
}
