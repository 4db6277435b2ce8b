use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::CoreError;

/// Column names every event source must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["user_id", "event_date", "stage", "channel"];

/// An event as it arrives from the CSV loader, before validation.
///
/// Every field is optional so a missing column can be reported by name
/// instead of surfacing as a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    pub user_id: Option<String>,
    pub event_date: Option<String>,
    pub stage: Option<String>,
    pub channel: Option<String>,
}

/// One validated row of the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub user_id: String,
    pub event_date: NaiveDateTime,
    /// Matched against funnel stage names exactly; no case folding.
    pub stage: String,
    pub channel: String,
}

impl EventRecord {
    pub fn new(
        user_id: impl Into<String>,
        event_date: NaiveDateTime,
        stage: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            event_date,
            stage: stage.into(),
            channel: channel.into(),
        }
    }
}

impl TryFrom<RawEvent> for EventRecord {
    type Error = CoreError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let user_id = raw
            .user_id
            .ok_or_else(|| CoreError::MissingField("user_id".to_string()))?;
        let raw_date = raw
            .event_date
            .ok_or_else(|| CoreError::MissingField("event_date".to_string()))?;
        let stage = raw
            .stage
            .ok_or_else(|| CoreError::MissingField("stage".to_string()))?;
        let channel = raw
            .channel
            .ok_or_else(|| CoreError::MissingField("channel".to_string()))?;

        let event_date = parse_event_date(&raw_date).ok_or_else(|| {
            CoreError::InvalidInput(format!("unparseable event_date '{raw_date}'"))
        })?;

        Ok(Self {
            user_id,
            event_date,
            stage,
            channel,
        })
    }
}

/// Parse the date formats commonly found in exported event logs.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS[.fff]]`, the same with a `T`
/// separator, and RFC 3339 timestamps (normalised to UTC). Bare dates map to
/// midnight.
pub fn parse_event_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Fail with `MissingField` for the first required column absent from `header`.
pub fn check_required_columns<'a, I>(header: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: HashSet<&str> = header.into_iter().map(str::trim).collect();
    match REQUIRED_COLUMNS.iter().find(|col| !present.contains(*col)) {
        Some(missing) => Err(CoreError::MissingField((*missing).to_string())),
        None => Ok(()),
    }
}

/// Immutable in-memory event log. Loaded once, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    records: Vec<EventRecord>,
}

impl EventTable {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self { records }
    }

    /// Validate raw rows, failing on the first one with a missing field or
    /// an unparseable date.
    pub fn from_raw(rows: Vec<RawEvent>) -> Result<Self, CoreError> {
        let records = rows
            .into_iter()
            .map(EventRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Events tagged with exactly `stage`.
    pub fn at_stage<'a>(&'a self, stage: &'a str) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.records.iter().filter(move |e| e.stage == stage)
    }
}

impl FromIterator<EventRecord> for EventTable {
    fn from_iter<T: IntoIterator<Item = EventRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
