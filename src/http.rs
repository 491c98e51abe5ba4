//! HTTP client for fetching waterway geometry from Overpass.
//!
//! This module provides:
//! - Connection reuse across fetches
//! - Retry with linear backoff on transport errors, 429 and 5xx
//! - Degradation of every failure to an empty feature list
//! - Integration with [`WaterwayLoader`] so a scope is fetched once

use log::{debug, info, warn};
use reqwest::Client;
use std::time::{Duration, Instant};

use crate::bounds::{query_scope_for_circles, BoundingBox};
use crate::error::{OutbreakMapError, Result};
use crate::overpass::{build_waterway_query, parse_waterways, OverpassConfig};
use crate::waterways::WaterwayLoader;
use crate::{Circle, WaterFeature};

// Overpass may hold the connection for the whole server-side timeout
const CLIENT_TIMEOUT_SLACK_SECS: u64 = 5;

/// Overpass waterway fetcher
pub struct OverpassFetcher {
    client: Client,
    config: OverpassConfig,
}

impl OverpassFetcher {
    /// Create a new fetcher for the configured endpoint
    pub fn new(config: OverpassConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs + CLIENT_TIMEOUT_SLACK_SECS);
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OverpassConfig {
        &self.config
    }

    /// Fetch waterways inside `bbox`, swallowing errors.
    ///
    /// Network, status and parse failures are logged and yield an empty list.
    pub async fn fetch_waterways(&self, bbox: &BoundingBox) -> Vec<WaterFeature> {
        match self.try_fetch_waterways(bbox).await {
            Ok(features) => features,
            Err(e) => {
                warn!(
                    "[OverpassFetcher] Waterway fetch failed, continuing without water: {}",
                    e
                );
                vec![]
            }
        }
    }

    /// Fetch waterways around `zones`, padded by the configured margin.
    ///
    /// No zones means no query scope, so nothing is fetched.
    pub async fn fetch_for_zones(&self, zones: &[Circle]) -> Vec<WaterFeature> {
        match query_scope_for_circles(zones, self.config.padding_degrees) {
            Some(bbox) => self.fetch_waterways(&bbox).await,
            None => {
                debug!("[OverpassFetcher] No zones, skipping waterway fetch");
                vec![]
            }
        }
    }

    /// Fetch `scope` through `loader` if it hasn't been fetched yet.
    ///
    /// Returns `true` when a fetch ran and its result was recorded.
    pub async fn refresh(&self, loader: &mut WaterwayLoader, scope: BoundingBox) -> bool {
        let Some(ticket) = loader.request(scope) else {
            return false;
        };
        let result = self.try_fetch_waterways(&scope).await;
        loader.complete(ticket, result)
    }

    /// Fetch waterways inside `bbox`, retrying retryable failures.
    pub async fn try_fetch_waterways(&self, bbox: &BoundingBox) -> Result<Vec<WaterFeature>> {
        let query = build_waterway_query(bbox, self.config.timeout_secs);
        let attempts = self.config.max_retries + 1;
        let start = Instant::now();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_once(&query).await {
                Ok(features) => {
                    info!(
                        "[OverpassFetcher] {} features for {} in {:.2}s (attempt {})",
                        features.len(),
                        bbox.to_overpass_bbox(),
                        start.elapsed().as_secs_f64(),
                        attempt
                    );
                    return Ok(features);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < attempts {
                        let backoff_ms = self.config.retry_backoff_ms * attempt as u64;
                        let wait = Duration::from_millis(backoff_ms);
                        warn!(
                            "[OverpassFetcher] {}, retry {} after {:?}",
                            e, attempt, wait
                        );
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        Err(OutbreakMapError::RetriesExhausted {
            attempts,
            last_error,
        })
    }

    async fn fetch_single(&self, query: &str) -> Result<String> {
        let req_start = Instant::now();
        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "text/plain")
            .body(query.to_string())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OutbreakMapError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        debug!(
            "[OverpassFetcher] HTTP {} {:.1}KB in {:?}",
            status.as_u16(),
            body.len() as f64 / 1024.0,
            req_start.elapsed()
        );
        Ok(body)
    }

    async fn fetch_once(&self, query: &str) -> Result<Vec<WaterFeature>> {
        let body = self.fetch_single(query).await?;
        parse_waterways(&body)
    }
}
