//! Presence data loading
//!
//! Parses the CSV log of daily check-in/check-out times, grouped by user.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::cache::{Kwargs, Producer};
use crate::data::UserId;
use crate::error::{PresenceError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// One day of presence: when the user came in and left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresenceEntry {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Presence of one user, by date.
pub type UserPresence = BTreeMap<NaiveDate, PresenceEntry>;

/// Presence of every user.
pub type PresenceData = BTreeMap<UserId, UserPresence>;

/// Parses presence CSV rows of the form `user_id,date,start,end`.
///
/// Rows without exactly four fields are headers or footers and are ignored.
/// Rows whose fields fail to parse are skipped. Read errors are returned.
pub fn parse_presence<R: Read>(reader: R) -> Result<PresenceData> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut data = PresenceData::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                debug!(line, error = %err, "Problem with line");
                continue;
            }
        };

        if record.len() != 4 {
            continue;
        }

        match parse_row(&record) {
            Some((user_id, date, entry)) => {
                data.entry(user_id).or_default().insert(date, entry);
            }
            None => debug!(line, row = ?record, "Problem with line"),
        }
    }

    Ok(data)
}

fn parse_row(record: &csv::StringRecord) -> Option<(UserId, NaiveDate, PresenceEntry)> {
    let user_id = record.get(0)?.parse().ok()?;
    let date = NaiveDate::parse_from_str(record.get(1)?, DATE_FORMAT).ok()?;
    let start = NaiveTime::parse_from_str(record.get(2)?, TIME_FORMAT).ok()?;
    let end = NaiveTime::parse_from_str(record.get(3)?, TIME_FORMAT).ok()?;

    Some((user_id, date, PresenceEntry { start, end }))
}

/// Reads and parses the presence CSV at `path`.
pub fn load_presence(path: &Path) -> Result<PresenceData> {
    let file = File::open(path).map_err(|source| PresenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_presence(file)?;
    debug!(path = %path.display(), users = data.len(), "Presence data loaded");
    Ok(data)
}

/// Cacheable loader of the presence CSV.
#[derive(Debug, Clone)]
pub struct PresenceLoader {
    path: PathBuf,
    /// Cache identity, unique per file
    name: String,
}

impl PresenceLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("presence_data:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Producer for PresenceLoader {
    type Args = ();
    type Output = PresenceData;
    type Error = PresenceError;

    fn name(&self) -> &str {
        &self.name
    }

    fn produce(&self, _: &(), _: &Kwargs) -> Result<PresenceData> {
        load_presence(&self.path)
    }
}
