//! Redb-backed durable storage implementation.
//!
//! Uses Redb's ACID transactions with copy-on-write for crash safety.
//! The drill and response logs survive server restarts, which is what
//! makes them usable as audit history.

use std::{path::Path, sync::Arc};

use drillcast_proto::{Drill, DrillReport, SafeResponse};
use redb::{Database, ReadableTable, TableDefinition};

use super::{DrillStore, RecordedResponse, StorageError, report_order, visible_to_class};

/// Table: drills
/// Key: drill id (monotonic, starts at 1)
/// Value: CBOR-encoded Drill
const DRILLS: TableDefinition<u64, &[u8]> = TableDefinition::new("drills");

/// Table: responses
/// Key: response id (monotonic, starts at 1)
/// Value: CBOR-encoded SafeResponse
const RESPONSES: TableDefinition<u64, &[u8]> = TableDefinition::new("responses");

/// Table: response_index
/// Key: (drill_id, student_id) as big-endian bytes [16 bytes]
/// Value: response id
///
/// Enforces the one-response-per-student-per-drill policy with an O(1)
/// lookup instead of a log scan.
const RESPONSE_INDEX: TableDefinition<&[u8], u64> = TableDefinition::new("response_index");

/// Durable drill store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStorage {
    db: Arc<Database>,
}

impl RedbStorage {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates tables if they don't exist (DRILLS, RESPONSES,
    /// RESPONSE_INDEX).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(DRILLS).map_err(|e| StorageError::Io(e.to_string()))?;
            let _ = txn.open_table(RESPONSES).map_err(|e| StorageError::Io(e.to_string()))?;
            let _ = txn.open_table(RESPONSE_INDEX).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl DrillStore for RedbStorage {
    fn create_drill(
        &self,
        kind: &str,
        class: &str,
        message: &str,
        started_by: &str,
        started_at_ms: u64,
    ) -> Result<Drill, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        let drill = {
            let mut table = txn.open_table(DRILLS).map_err(|e| StorageError::Io(e.to_string()))?;

            let id = next_id(&table)?;
            let drill = Drill {
                id,
                kind: kind.to_string(),
                class: class.to_string(),
                message: message.to_string(),
                started_by: started_by.to_string(),
                started_at_ms,
            };

            let bytes = encode_record(&drill)?;
            table.insert(id, bytes.as_slice()).map_err(|e| StorageError::Io(e.to_string()))?;
            drill
        };

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(drill)
    }

    fn record_response(
        &self,
        drill_id: u64,
        student_id: u64,
        time_ms: u64,
    ) -> Result<RecordedResponse, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        let outcome = {
            let drills = txn.open_table(DRILLS).map_err(|e| StorageError::Io(e.to_string()))?;
            if drills.get(drill_id).map_err(|e| StorageError::Io(e.to_string()))?.is_none() {
                return Err(StorageError::UnknownDrill(drill_id));
            }
            drop(drills);

            let mut responses =
                txn.open_table(RESPONSES).map_err(|e| StorageError::Io(e.to_string()))?;
            let mut index =
                txn.open_table(RESPONSE_INDEX).map_err(|e| StorageError::Io(e.to_string()))?;

            let pair_key = encode_pair_key(drill_id, student_id);
            let existing = index
                .get(pair_key.as_slice())
                .map_err(|e| StorageError::Io(e.to_string()))?
                .map(|guard| guard.value());

            if let Some(existing_id) = existing {
                let guard = responses
                    .get(existing_id)
                    .map_err(|e| StorageError::Io(e.to_string()))?
                    .ok_or_else(|| {
                        StorageError::Serialization(format!(
                            "response index points at missing row {existing_id}"
                        ))
                    })?;
                let response: SafeResponse = decode_record(guard.value())?;
                drop(guard);
                RecordedResponse { response, newly_recorded: false }
            } else {
                let id = next_id(&responses)?;
                let response = SafeResponse { id, drill_id, student_id, time_ms };

                let bytes = encode_record(&response)?;
                responses
                    .insert(id, bytes.as_slice())
                    .map_err(|e| StorageError::Io(e.to_string()))?;
                index
                    .insert(pair_key.as_slice(), id)
                    .map_err(|e| StorageError::Io(e.to_string()))?;

                RecordedResponse { response, newly_recorded: true }
            }
        };

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(outcome)
    }

    fn list_reports(&self) -> Result<Vec<DrillReport>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;

        let index =
            txn.open_table(RESPONSE_INDEX).map_err(|e| StorageError::Io(e.to_string()))?;
        let mut counts: std::collections::HashMap<u64, u64> = std::collections::HashMap::new();
        for result in index.iter().map_err(|e| StorageError::Io(e.to_string()))? {
            let (key, _) = result.map_err(|e| StorageError::Io(e.to_string()))?;
            let (drill_id, _) = decode_pair_key(key.value())?;
            *counts.entry(drill_id).or_default() += 1;
        }

        let drills = txn.open_table(DRILLS).map_err(|e| StorageError::Io(e.to_string()))?;
        let mut reports = Vec::new();
        for result in drills.iter().map_err(|e| StorageError::Io(e.to_string()))? {
            let (_, value) = result.map_err(|e| StorageError::Io(e.to_string()))?;
            let drill: Drill = decode_record(value.value())?;
            let responses_count = counts.get(&drill.id).copied().unwrap_or(0);
            reports.push(DrillReport { drill, responses_count });
        }

        reports.sort_by(|a, b| report_order(&a.drill, &b.drill));
        Ok(reports)
    }

    fn responses_for(&self, drill_id: u64) -> Result<Vec<SafeResponse>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(RESPONSES).map_err(|e| StorageError::Io(e.to_string()))?;

        let mut responses = Vec::new();
        for result in table.iter().map_err(|e| StorageError::Io(e.to_string()))? {
            let (_, value) = result.map_err(|e| StorageError::Io(e.to_string()))?;
            let response: SafeResponse = decode_record(value.value())?;
            if response.drill_id == drill_id {
                responses.push(response);
            }
        }
        Ok(responses)
    }

    fn latest_for_class(&self, class: &str) -> Result<Option<Drill>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(DRILLS).map_err(|e| StorageError::Io(e.to_string()))?;

        let mut latest: Option<Drill> = None;
        for result in table.iter().map_err(|e| StorageError::Io(e.to_string()))? {
            let (_, value) = result.map_err(|e| StorageError::Io(e.to_string()))?;
            let drill: Drill = decode_record(value.value())?;
            if !visible_to_class(&drill.class, class) {
                continue;
            }
            let newer = latest
                .as_ref()
                .is_none_or(|cur| (drill.started_at_ms, drill.id) > (cur.started_at_ms, cur.id));
            if newer {
                latest = Some(drill);
            }
        }
        Ok(latest)
    }
}

/// Next monotonic id for an append-only table: last key + 1.
fn next_id<T: ReadableTable<u64, &'static [u8]>>(table: &T) -> Result<u64, StorageError> {
    let last = table.last().map_err(|e| StorageError::Io(e.to_string()))?;
    Ok(last.map_or(1, |(key, _)| key.value() + 1))
}

fn encode_record<T: serde::Serialize>(record: &T) -> Result<Vec<u8>, StorageError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(record, &mut bytes)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn decode_record<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    ciborium::from_reader(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Encode (drill_id, student_id) as a 16-byte big-endian key.
///
/// Big-endian keeps lexicographic ordering equal to numeric ordering,
/// so all of one drill's entries are contiguous in the index.
fn encode_pair_key(drill_id: u64, student_id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&drill_id.to_be_bytes());
    key[8..].copy_from_slice(&student_id.to_be_bytes());
    key
}

/// Decode a response-index key back to (drill_id, student_id).
fn decode_pair_key(key: &[u8]) -> Result<(u64, u64), StorageError> {
    if key.len() != 16 {
        return Err(StorageError::Serialization(format!(
            "response index key has {} bytes, expected 16",
            key.len()
        )));
    }
    let drill_id = u64::from_be_bytes(key[..8].try_into().map_err(|_| {
        StorageError::Serialization("response index key slice".to_string())
    })?);
    let student_id = u64::from_be_bytes(key[8..].try_into().map_err(|_| {
        StorageError::Serialization("response index key slice".to_string())
    })?);
    Ok((drill_id, student_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn pair_key_roundtrip() {
        let key = encode_pair_key(7, 42);
        assert_eq!(decode_pair_key(&key).unwrap(), (7, 42));
    }

    #[test]
    fn drills_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drills.redb");

        {
            let storage = RedbStorage::open(&path).unwrap();
            storage.create_drill("fire", "ClassA", "Evacuate", "Ms. Iyer", 100).unwrap();
        }

        let storage = RedbStorage::open(&path).unwrap();
        let reports = storage.list_reports().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].drill.kind, "fire");
        assert_eq!(reports[0].drill.id, 1);
    }

    #[test]
    fn ids_continue_after_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drills.redb");

        {
            let storage = RedbStorage::open(&path).unwrap();
            storage.create_drill("fire", "ClassA", "", "", 10).unwrap();
        }

        let storage = RedbStorage::open(&path).unwrap();
        let second = storage.create_drill("quake", "ClassA", "", "", 20).unwrap();
        assert_eq!(second.id, 2);
    }

    #[test]
    fn response_dedup_and_integrity() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("drills.redb")).unwrap();

        let err = storage.record_response(1, 42, 10).unwrap_err();
        assert!(matches!(err, StorageError::UnknownDrill(1)));

        let drill = storage.create_drill("fire", "ClassA", "", "", 10).unwrap();
        let first = storage.record_response(drill.id, 42, 20).unwrap();
        assert!(first.newly_recorded);

        let second = storage.record_response(drill.id, 42, 30).unwrap();
        assert!(!second.newly_recorded);
        assert_eq!(second.response, first.response);

        assert_eq!(storage.responses_for(drill.id).unwrap().len(), 1);
        assert_eq!(storage.list_reports().unwrap()[0].responses_count, 1);
    }

    #[test]
    fn reports_ordered_newest_first() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("drills.redb")).unwrap();

        storage.create_drill("fire", "ClassA", "", "", 100).unwrap();
        storage.create_drill("quake", "ClassA", "", "", 100).unwrap();
        storage.create_drill("flood", "ClassA", "", "", 50).unwrap();

        let ids: Vec<u64> = storage.list_reports().unwrap().iter().map(|r| r.drill.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn latest_for_class_includes_all_sentinel() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("drills.redb")).unwrap();

        storage.create_drill("fire", "ClassA", "", "", 10).unwrap();
        storage.create_drill("quake", "ALL", "", "", 20).unwrap();

        let latest = storage.latest_for_class("ClassA").unwrap().unwrap();
        assert_eq!(latest.kind, "quake");
        assert!(storage.latest_for_class("ClassB").unwrap().is_some());
    }
}
