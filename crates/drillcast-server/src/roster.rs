//! CSV roster ingest.
//!
//! Seeds the directory from a class roster at startup. Expected
//! columns: `USN,Name,DOB,Class,ParentPhone`; header casing varies
//! between exports, so common variants are accepted. The DOB becomes
//! the student's opaque secret, matching the bulk-import pipeline this
//! server is deployed next to.

use std::path::Path;

use drillcast_proto::Role;
use serde::Deserialize;
use thiserror::Error;

use crate::directory::{BulkOutcome, Directory, NewEntry, RowError};

/// Errors reading the roster file itself. Per-row problems are not
/// errors; they land in the returned [`BulkOutcome`].
#[derive(Debug, Error)]
pub enum RosterError {
    /// The file could not be read or parsed as CSV.
    #[error("roster read failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default, rename = "USN", alias = "usn", alias = "Username", alias = "username")]
    usn: Option<String>,
    #[serde(default, rename = "Name", alias = "name")]
    name: Option<String>,
    #[serde(default, rename = "DOB", alias = "dob")]
    dob: Option<String>,
    #[serde(default, rename = "Class", alias = "class", alias = "CLASS")]
    class: Option<String>,
    #[serde(default, rename = "ParentPhone", alias = "parentPhone", alias = "parent")]
    parent_phone: Option<String>,
}

/// Default class for rows that leave the column empty.
const DEFAULT_CLASS: &str = "ClassA";

/// Load a roster CSV and insert its students into the directory.
///
/// Row outcomes are collected, never thrown: a malformed row is
/// reported in `BulkOutcome::errors` (numbered by CSV data row) and
/// the rest of the file still loads.
pub fn seed(directory: &dyn Directory, path: &Path) -> Result<BulkOutcome, RosterError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let mut entries = Vec::new();
    // CSV data row for each batch position; rows rejected before the
    // insert make the two numberings diverge.
    let mut source_rows = Vec::new();
    let mut rejected = Vec::new();

    for (i, result) in reader.deserialize::<RosterRow>().enumerate() {
        let row_number = i + 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                rejected.push(RowError { row: row_number, reason: e.to_string() });
                continue;
            },
        };

        let usn = row.usn.unwrap_or_default();
        let dob = row.dob.unwrap_or_default();
        if usn.is_empty() || dob.is_empty() {
            rejected.push(RowError { row: row_number, reason: "missing USN or DOB".to_string() });
            continue;
        }

        entries.push(NewEntry {
            role: Role::Student,
            name: row.name.unwrap_or_else(|| usn.clone()),
            username: usn,
            secret: dob,
            class: Some(row.class.filter(|c| !c.is_empty()).unwrap_or_else(|| {
                DEFAULT_CLASS.to_string()
            })),
            contact: row.parent_phone.filter(|p| !p.is_empty()),
        });
        source_rows.push(row_number);
    }

    let mut outcome = directory.bulk_insert(&entries);
    for error in &mut outcome.errors {
        // `bulk_insert` numbers by batch position; report the CSV row.
        error.row = source_rows.get(error.row.wrapping_sub(1)).copied().unwrap_or(error.row);
    }
    outcome.errors.extend(rejected);
    outcome.errors.sort_by_key(|e| e.row);

    tracing::info!(
        inserted = outcome.inserted,
        rejected = outcome.errors.len(),
        roster = %path.display(),
        "roster loaded"
    );

    Ok(outcome)
}
