use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::UpstreamConfig,
    repo::catalog::{EventCatalog, EventRecord, EventSource},
};

/// One row of the marketplace `GET /event/list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamEvent {
    id: String,
    name: String,
    date: String,
    location: String,
    #[serde(default)]
    image_count: Option<u64>,
}

/// Starts the periodic upstream sync. Does nothing when no base url is set.
pub fn spawn(catalog: EventCatalog, config: UpstreamConfig) -> anyhow::Result<()> {
    if !config.is_enabled() {
        info!("upstream sync disabled");
        return Ok(());
    }

    let syncer = Syncer::new(catalog, config)?;
    tokio::spawn(async move {
        syncer.run().await;
    });
    Ok(())
}

struct Syncer {
    catalog: EventCatalog,
    client: Client,
    list_url: Url,
    interval_secs: u64,
}

impl Syncer {
    fn new(catalog: EventCatalog, mut config: UpstreamConfig) -> anyhow::Result<Self> {
        if config.interval_secs == 0 {
            config.interval_secs = 60;
        }
        if config.request_timeout_secs == 0 {
            config.request_timeout_secs = 10;
        }

        let client = Client::builder()
            .user_agent("EventDedupeSync/0.1")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            catalog,
            client,
            list_url: config.list_url()?,
            interval_secs: config.interval_secs,
        })
    }

    async fn run(self) {
        let mut ticker = interval(Duration::from_secs(self.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // first tick completes immediately
            ticker.tick().await;
            if let Err(err) = self.run_once().await {
                warn!(error = ?err, url = %self.list_url, "upstream sync failed, keeping previous events");
            }
        }
    }

    async fn run_once(&self) -> anyhow::Result<()> {
        debug!(url = %self.list_url, "fetching upstream events");
        let response = self
            .client
            .get(self.list_url.clone())
            .send()
            .await
            .context("upstream request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("upstream responded with {}", status));
        }

        let rows: Vec<UpstreamEvent> = response
            .json()
            .await
            .context("invalid upstream event list")?;
        let records = to_records(rows);

        info!(count = records.len(), "upstream events synced");
        self.catalog.replace_upstream(records);
        Ok(())
    }
}

fn to_records(rows: Vec<UpstreamEvent>) -> Vec<EventRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let Some(date) = parse_event_date(&row.date) else {
                warn!(id = %row.id, date = %row.date, "skipping upstream event with unreadable date");
                return None;
            };
            Some(EventRecord {
                id: row.id,
                name: row.name,
                date,
                location: row.location,
                description: None,
                created_by: None,
                image_count: row.image_count.unwrap_or(0),
                source: EventSource::Upstream,
            })
        })
        .collect()
}

/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp.
fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
