use serde::{Deserialize, Serialize};

use crate::repo::catalog::{EventRecord, EventSort, EventSource};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOut {
    pub id: String,
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub image_count: u64,
    pub source: EventSource,
}

impl From<EventRecord> for EventOut {
    fn from(record: EventRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            date: record.date.format("%Y-%m-%d").to_string(),
            location: record.location,
            description: record.description,
            created_by: record.created_by,
            image_count: record.image_count,
            source: record.source,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventListQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub sort: Option<EventSort>,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateCheckPayload {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewEventPayload {
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEventOut {
    pub event: EventOut,
    pub duplicate_of: Option<String>,
}
