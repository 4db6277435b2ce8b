use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use journeylytics_core::error::CoreError;
use journeylytics_core::event::{check_required_columns, EventRecord, EventTable, RawEvent};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A data row failed validation. `row` is 1-based, header excluded.
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: CoreError,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl LoadError {
    /// The validation error behind this failure, if the input itself was bad.
    pub fn core(&self) -> Option<&CoreError> {
        match self {
            LoadError::Row { source, .. } => Some(source),
            LoadError::Core(e) => Some(e),
            _ => None,
        }
    }
}

/// Load an event log from a CSV file with a header row.
pub fn load_events(path: impl AsRef<Path>) -> Result<EventTable, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_events(file)
}

/// Parse CSV from any reader.
///
/// The header must name `user_id`, `event_date`, `stage` and `channel`; other
/// columns are ignored. An empty cell in a required column is reported as a
/// missing field for that row.
pub fn read_events<R: Read>(reader: R) -> Result<EventTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    check_required_columns(rdr.headers()?.iter())?;

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<RawEvent>().enumerate() {
        let raw = result?;
        let record =
            EventRecord::try_from(raw).map_err(|source| LoadError::Row { row: idx + 1, source })?;
        records.push(record);
    }

    tracing::debug!(events = records.len(), "Parsed event CSV");
    Ok(EventTable::new(records))
}
