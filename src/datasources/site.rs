use super::feed_csv::{parse_climate_csv, parse_probe_csv};
use crate::error::{Result, VanillaOpsError};
use crate::models::{ClimateRow, LatestResults, ProbeRow, Zone};
use std::path::PathBuf;

pub const LATEST_RESULTS: &str = "latest_results.json";
pub const GREENHOUSE_HISTORY: &str = "latest_24_greenhouse_results.csv";
pub const OUTDOOR_HISTORY: &str = "latest_24_outdoor_results.csv";
pub const PROBE_HISTORY: &str = "latest_24_miflora_packets.csv";
pub const STATS: &str = "stats.csv";

/// Where the exported feed files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Directory(PathBuf),
    Http(String),
}

impl FeedSource {
    /// `http://` and `https://` are fetched over the network, anything else is a path.
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            FeedSource::Http(trimmed.trim_end_matches('/').to_string())
        } else {
            FeedSource::Directory(PathBuf::from(trimmed))
        }
    }

    pub fn describe(&self, file: &str) -> String {
        match self {
            FeedSource::Directory(dir) => dir.join(file).display().to_string(),
            FeedSource::Http(base) => format!("{}/{}", base, file),
        }
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Directory(dir) => write!(f, "{}", dir.display()),
            FeedSource::Http(base) => write!(f, "{}", base),
        }
    }
}

/// Reads the site's exported snapshot and history files.
pub struct SiteClient {
    client: reqwest::Client,
    source: FeedSource,
}

impl SiteClient {
    pub fn new(source: FeedSource) -> Self {
        Self {
            client: reqwest::Client::new(),
            source,
        }
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    pub async fn fetch_latest(&self) -> Result<LatestResults> {
        let text = self.fetch_text(LATEST_RESULTS).await?;
        let latest: LatestResults = serde_json::from_str(&text)?;
        Ok(latest)
    }

    pub async fn fetch_climate_history(&self, zone: Zone) -> Result<Vec<ClimateRow>> {
        let file = match zone {
            Zone::Greenhouse => GREENHOUSE_HISTORY,
            Zone::Outdoor => OUTDOOR_HISTORY,
        };
        Ok(parse_climate_csv(&self.fetch_text(file).await?))
    }

    /// Probe history is optional; a missing file yields no rows.
    pub async fn fetch_probe_history(&self) -> Result<Vec<ProbeRow>> {
        match self.fetch_text(PROBE_HISTORY).await {
            Ok(text) => Ok(parse_probe_csv(&text)),
            Err(VanillaOpsError::NotFound(what)) => {
                tracing::debug!("No probe history: {}", what);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn fetch_stats(&self) -> Result<Vec<ClimateRow>> {
        Ok(parse_climate_csv(&self.fetch_text(STATS).await?))
    }

    pub async fn test_connection(&self) -> Result<bool> {
        match self.fetch_text(LATEST_RESULTS).await {
            Ok(_) => Ok(true),
            Err(VanillaOpsError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn fetch_text(&self, file: &str) -> Result<String> {
        match &self.source {
            FeedSource::Directory(dir) => {
                let path = dir.join(file);
                match tokio::fs::read(&path).await {
                    Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Err(VanillaOpsError::NotFound(self.source.describe(file)))
                    }
                    Err(e) => Err(e.into()),
                }
            }
            FeedSource::Http(_) => {
                let url = self.source.describe(file);
                let response = self.client.get(&url).send().await.map_err(|e| {
                    VanillaOpsError::DataSourceUnavailable(format!("{}: {}", url, e))
                })?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(VanillaOpsError::NotFound(url));
                }
                if !response.status().is_success() {
                    return Err(VanillaOpsError::DataSourceUnavailable(format!(
                        "{} returned {}",
                        url,
                        response.status()
                    )));
                }

                Ok(response.text().await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vanillaops-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_source() {
        assert_eq!(
            FeedSource::parse("https://example.org/data/"),
            FeedSource::Http("https://example.org/data".into())
        );
        assert_eq!(
            FeedSource::parse("./data"),
            FeedSource::Directory(PathBuf::from("./data"))
        );
        assert_eq!(
            FeedSource::parse("http://host/feed").describe(STATS),
            "http://host/feed/stats.csv"
        );
    }

    #[tokio::test]
    async fn reads_directory_feed() {
        let dir = scratch_dir("feed");
        std::fs::write(
            dir.join(LATEST_RESULTS),
            r#"{"greenhouse": {"temp": 25.0, "humidity": 80, "vpd": 0.7}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join(GREENHOUSE_HISTORY),
            "timestamp,location,temp,hum,vpd,dew\n2025-06-01 10:00:00,greenhouse,25,80,0.7,21\n",
        )
        .unwrap();

        let client = SiteClient::new(FeedSource::Directory(dir.clone()));
        assert!(client.test_connection().await.unwrap());

        let latest = client.fetch_latest().await.unwrap();
        assert_eq!(latest.reading(Zone::Greenhouse).unwrap().vpd_kpa, Some(0.7));

        let history = client.fetch_climate_history(Zone::Greenhouse).await.unwrap();
        assert_eq!(history.len(), 1);

        // Optional file
        assert!(client.fetch_probe_history().await.unwrap().is_empty());

        // Required file
        assert!(matches!(
            client.fetch_stats().await,
            Err(VanillaOpsError::NotFound(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn malformed_snapshot_is_a_json_error() {
        let dir = scratch_dir("badjson");
        std::fs::write(dir.join(LATEST_RESULTS), "{not json").unwrap();

        let client = SiteClient::new(FeedSource::Directory(dir.clone()));
        assert!(matches!(
            client.fetch_latest().await,
            Err(VanillaOpsError::Json(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_directory_reports_not_found() {
        let client = SiteClient::new(FeedSource::Directory(PathBuf::from(
            "/nonexistent/vanillaops/feed",
        )));
        assert!(!client.test_connection().await.unwrap());
    }
}
