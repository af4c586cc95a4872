use crate::datasources::{FeedSource, SiteClient};
use crate::error::Result;
use crate::models::{ClimateRow, LatestResults, ProbeRow, Zone};
use chrono::{DateTime, Utc};

/// Everything one refresh pulls from the feed.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub latest: LatestResults,
    pub greenhouse_history: Vec<ClimateRow>,
    pub outdoor_history: Vec<ClimateRow>,
    pub probe_history: Vec<ProbeRow>,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionStatus {
    pub latest: bool,
    pub greenhouse_history: bool,
    pub outdoor_history: bool,
    pub probe_history: bool,
    pub stats: bool,
}

impl ConnectionStatus {
    pub fn summary(&self) -> String {
        let part = |name: &str, ok: bool| format!("{}: {}", name, if ok { "OK" } else { "MISSING" });
        [
            part("Latest", self.latest),
            part("Greenhouse 24h", self.greenhouse_history),
            part("Outdoor 24h", self.outdoor_history),
            part("Probes 24h", self.probe_history),
            part("Stats", self.stats),
        ]
        .join(" | ")
    }
}

pub struct DataSyncService {
    client: SiteClient,
}

impl DataSyncService {
    pub fn new(source: FeedSource) -> Self {
        tracing::info!("Reading feed from {}", source);
        Self {
            client: SiteClient::new(source),
        }
    }

    pub fn client(&self) -> &SiteClient {
        &self.client
    }

    /// The snapshot is required; history files degrade to empty with a warning.
    pub async fn refresh(&self) -> Result<FeedSnapshot> {
        let latest = self.client.fetch_latest().await?;

        let greenhouse_history = self
            .client
            .fetch_climate_history(Zone::Greenhouse)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to fetch greenhouse history: {}", e);
                Vec::new()
            });

        let outdoor_history = self
            .client
            .fetch_climate_history(Zone::Outdoor)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to fetch outdoor history: {}", e);
                Vec::new()
            });

        let probe_history = self.client.fetch_probe_history().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch probe history: {}", e);
            Vec::new()
        });

        tracing::debug!(
            "Feed refreshed: {} greenhouse, {} outdoor, {} probe rows",
            greenhouse_history.len(),
            outdoor_history.len(),
            probe_history.len()
        );

        Ok(FeedSnapshot {
            latest,
            greenhouse_history,
            outdoor_history,
            probe_history,
            fetched_at: Some(Utc::now()),
        })
    }

    pub async fn check_connections(&self) -> ConnectionStatus {
        ConnectionStatus {
            latest: self.client.test_connection().await.unwrap_or(false),
            greenhouse_history: self
                .client
                .fetch_climate_history(Zone::Greenhouse)
                .await
                .is_ok(),
            outdoor_history: self.client.fetch_climate_history(Zone::Outdoor).await.is_ok(),
            probe_history: self
                .client
                .fetch_probe_history()
                .await
                .is_ok_and(|rows| !rows.is_empty()),
            stats: self.client.fetch_stats().await.is_ok(),
        }
    }
}
