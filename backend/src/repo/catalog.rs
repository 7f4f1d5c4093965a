use std::{
    cmp::Ordering,
    fs,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Seed,
    Upstream,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub image_count: u64,
    pub source: EventSource,
}

/// Listing order; `None` keeps pool order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventSort {
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "oldest")]
    Oldest,
    #[serde(rename = "a-z")]
    AToZ,
}

/// Listing filters. Blank strings behave like absent ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter<'a> {
    /// Case-insensitive substring of the name or the location.
    pub search: Option<&'a str>,
    /// Case-sensitive substring of the location.
    pub location: Option<&'a str>,
    pub date: Option<NaiveDate>,
    pub sort: Option<EventSort>,
}

impl EventFilter<'_> {
    fn matches(&self, record: &EventRecord, needle: &str) -> bool {
        let matches_search = needle.is_empty()
            || record.name.to_lowercase().contains(needle)
            || record.location.to_lowercase().contains(needle);
        let matches_location = self
            .location
            .filter(|loc| !loc.is_empty())
            .map_or(true, |loc| record.location.contains(loc));
        let matches_date = self.date.map_or(true, |date| record.date == date);

        matches_search && matches_location && matches_date
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedEvent {
    id: Option<String>,
    name: String,
    date: NaiveDate,
    location: String,
    description: Option<String>,
    created_by: Option<String>,
    #[serde(default)]
    image_count: u64,
}

/// In-memory event list backing the duplicate-name pool.
///
/// Records stay ordered seed, then upstream, then local, since duplicate
/// lookup is first-match in this order.
#[derive(Clone, Default)]
pub struct EventCatalog {
    records: Arc<RwLock<Vec<EventRecord>>>,
}

impl EventCatalog {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn len(&self) -> usize {
        self.read(|records| records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every event name in pool order.
    pub fn names(&self) -> Vec<String> {
        self.read(|records| records.iter().map(|r| r.name.clone()).collect())
    }

    /// Events passing `filter`, sorted when the filter asks for it.
    ///
    /// Sorting is stable, so ties keep pool order.
    pub fn search(&self, filter: &EventFilter<'_>) -> Vec<EventRecord> {
        let needle = filter.search.unwrap_or_default().trim().to_lowercase();
        let mut hits: Vec<EventRecord> = self.read(|records| {
            records
                .iter()
                .filter(|r| filter.matches(r, &needle))
                .cloned()
                .collect()
        });

        match filter.sort {
            Some(EventSort::Newest) => hits.sort_by(|a, b| b.date.cmp(&a.date)),
            Some(EventSort::Oldest) => hits.sort_by(|a, b| a.date.cmp(&b.date)),
            Some(EventSort::AToZ) => hits.sort_by(|a, b| compare_names(&a.name, &b.name)),
            None => {}
        }
        hits
    }

    pub fn insert(&self, record: EventRecord) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.push(record);
    }

    /// Swaps out all upstream records, keeping them between seed and local ones.
    pub fn replace_upstream(&self, upstream: Vec<EventRecord>) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let (seeded, local): (Vec<_>, Vec<_>) = records
            .drain(..)
            .filter(|r| r.source != EventSource::Upstream)
            .partition(|r| r.source == EventSource::Seed);

        records.extend(seeded);
        records.extend(upstream);
        records.extend(local);
    }

    fn read<T>(&self, f: impl FnOnce(&[EventRecord]) -> T) -> T {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        f(&records)
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn load_seed_file(path: &Path) -> anyhow::Result<Vec<EventRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {:?}", path))?;
    parse_seed(&contents).with_context(|| format!("failed to parse seed file {:?}", path))
}

fn parse_seed(contents: &str) -> anyhow::Result<Vec<EventRecord>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let seeds: Vec<SeedEvent> = serde_yaml::from_str(contents)?;
    Ok(seeds
        .into_iter()
        .enumerate()
        .map(|(idx, seed)| EventRecord {
            id: seed.id.unwrap_or_else(|| format!("seed-{}", idx + 1)),
            name: seed.name,
            date: seed.date,
            location: seed.location,
            description: seed.description,
            created_by: seed.created_by,
            image_count: seed.image_count,
            source: EventSource::Seed,
        })
        .collect())
}

#[cfg(test)]
pub(crate) fn record(id: &str, name: &str, source: EventSource) -> EventRecord {
    EventRecord {
        id: id.to_string(),
        name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        location: "Kuala Lumpur".to_string(),
        description: None,
        created_by: None,
        image_count: 0,
        source,
    }
}
