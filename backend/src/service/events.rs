use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    model::{CreatedEventOut, EventListQuery, EventOut, NewEventPayload},
    repo::catalog::{EventCatalog, EventFilter, EventRecord, EventSource},
    util::{
        name_field::{self, FieldState},
        similarity::find_duplicate,
    },
};

pub fn list(catalog: &EventCatalog, query: EventListQuery) -> AppResult<Vec<EventOut>> {
    let EventListQuery {
        search,
        location,
        date,
        sort,
    } = query;

    let date = match date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Some(parse_date(raw)?),
        None => None,
    };
    let filter = EventFilter {
        search: search.as_deref(),
        location: location.as_deref(),
        date,
        sort,
    };

    let items: Vec<EventOut> = catalog
        .search(&filter)
        .into_iter()
        .map(EventOut::from)
        .collect();
    tracing::debug!(?filter, count = items.len(), "events listed");
    Ok(items)
}

pub fn check_name(catalog: &EventCatalog, name: &str) -> FieldState {
    let pool = catalog.names();
    name_field::evaluate(name, &pool)
}

/// Creates a local event. A near-duplicate name is reported, not rejected.
pub fn create(catalog: &EventCatalog, payload: NewEventPayload) -> AppResult<CreatedEventOut> {
    let NewEventPayload {
        name,
        date,
        location,
        description,
        created_by,
    } = payload;

    let name = required(name, "name")?;
    let location = required(location, "location")?;
    let created_by = required(created_by, "createdBy")?;
    let date = parse_date(&required(date, "date")?)?;
    let description = description.filter(|d| !d.trim().is_empty());

    let pool = catalog.names();
    let duplicate_of = find_duplicate(&name, &pool).map(str::to_string);

    let record = EventRecord {
        id: Uuid::new_v4().to_string(),
        name,
        date,
        location,
        description,
        created_by: Some(created_by),
        image_count: 0,
        source: EventSource::Local,
    };
    catalog.insert(record.clone());

    match &duplicate_of {
        Some(existing) => tracing::info!(
            id = %record.id,
            name = %record.name,
            duplicate_of = %existing,
            "event created despite similar name"
        ),
        None => tracing::info!(id = %record.id, name = %record.name, "event created"),
    }

    Ok(CreatedEventOut {
        event: record.into(),
        duplicate_of,
    })
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("invalid date, expected YYYY-MM-DD".to_string()))
}

fn required(value: String, field: &str) -> AppResult<String> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value)
}
