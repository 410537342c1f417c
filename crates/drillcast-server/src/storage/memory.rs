#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use drillcast_proto::{Drill, DrillReport, SafeResponse};

use super::{DrillStore, RecordedResponse, StorageError, report_order, visible_to_class};

/// In-memory store for testing, simulation, and `--data`-less runs.
///
/// `Vec`s hold the append-only logs in insertion order; a `HashMap`
/// indexes `(drill_id, student_id)` for the dedup check. State is
/// wrapped in `Arc<Mutex<>>` to allow Clone and concurrent access.
/// Uses `lock().expect()` which will panic if the mutex is poisoned -
/// acceptable for an in-process store with no partial writes.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryStorageInner>>,
}

#[derive(Default)]
struct MemoryStorageInner {
    /// Drill log, index == id - 1.
    drills: Vec<Drill>,
    /// Response log in insertion order. Never contains duplicates for
    /// one `(drill_id, student_id)` pair.
    responses: Vec<SafeResponse>,
    /// `(drill_id, student_id)` → index into `responses`.
    by_drill_student: HashMap<(u64, u64), usize>,
}

impl MemoryStorage {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored drills. Useful in tests.
    #[allow(clippy::expect_used)]
    pub fn drill_count(&self) -> usize {
        self.inner.lock().expect("mutex poisoned").drills.len()
    }
}

impl DrillStore for MemoryStorage {
    #[allow(clippy::expect_used)]
    fn create_drill(
        &self,
        kind: &str,
        class: &str,
        message: &str,
        started_by: &str,
        started_at_ms: u64,
    ) -> Result<Drill, StorageError> {
        let mut inner = self.inner.lock().expect("mutex poisoned");

        let drill = Drill {
            id: inner.drills.len() as u64 + 1,
            kind: kind.to_string(),
            class: class.to_string(),
            message: message.to_string(),
            started_by: started_by.to_string(),
            started_at_ms,
        };
        inner.drills.push(drill.clone());
        Ok(drill)
    }

    #[allow(clippy::expect_used)]
    fn record_response(
        &self,
        drill_id: u64,
        student_id: u64,
        time_ms: u64,
    ) -> Result<RecordedResponse, StorageError> {
        let mut inner = self.inner.lock().expect("mutex poisoned");

        if drill_id == 0 || drill_id as usize > inner.drills.len() {
            return Err(StorageError::UnknownDrill(drill_id));
        }

        if let Some(&idx) = inner.by_drill_student.get(&(drill_id, student_id)) {
            return Ok(RecordedResponse {
                response: inner.responses[idx].clone(),
                newly_recorded: false,
            });
        }

        let response = SafeResponse {
            id: inner.responses.len() as u64 + 1,
            drill_id,
            student_id,
            time_ms,
        };
        let idx = inner.responses.len();
        inner.responses.push(response.clone());
        inner.by_drill_student.insert((drill_id, student_id), idx);

        Ok(RecordedResponse { response, newly_recorded: true })
    }

    #[allow(clippy::expect_used)]
    fn list_reports(&self) -> Result<Vec<DrillReport>, StorageError> {
        let inner = self.inner.lock().expect("mutex poisoned");

        let mut counts: HashMap<u64, u64> = HashMap::new();
        for response in &inner.responses {
            *counts.entry(response.drill_id).or_default() += 1;
        }

        let mut reports: Vec<DrillReport> = inner
            .drills
            .iter()
            .map(|drill| DrillReport {
                drill: drill.clone(),
                responses_count: counts.get(&drill.id).copied().unwrap_or(0),
            })
            .collect();
        reports.sort_by(|a, b| report_order(&a.drill, &b.drill));
        Ok(reports)
    }

    #[allow(clippy::expect_used)]
    fn responses_for(&self, drill_id: u64) -> Result<Vec<SafeResponse>, StorageError> {
        let inner = self.inner.lock().expect("mutex poisoned");
        Ok(inner.responses.iter().filter(|r| r.drill_id == drill_id).cloned().collect())
    }

    #[allow(clippy::expect_used)]
    fn latest_for_class(&self, class: &str) -> Result<Option<Drill>, StorageError> {
        let inner = self.inner.lock().expect("mutex poisoned");
        Ok(inner
            .drills
            .iter()
            .filter(|d| visible_to_class(&d.class, class))
            .max_by_key(|d| (d.started_at_ms, d.id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_drill(class: &str, at_ms: u64) -> (MemoryStorage, Drill) {
        let storage = MemoryStorage::new();
        let drill = storage.create_drill("fire", class, "Evacuate", "Ms. Iyer", at_ms).unwrap();
        (storage, drill)
    }

    #[test]
    fn drill_ids_are_monotonic() {
        let storage = MemoryStorage::new();
        let first = storage.create_drill("fire", "ClassA", "", "", 10).unwrap();
        let second = storage.create_drill("quake", "ClassB", "", "", 20).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn new_drill_reports_zero_responses() {
        let (storage, drill) = store_with_drill("ClassA", 10);
        let reports = storage.list_reports().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].drill, drill);
        assert_eq!(reports[0].responses_count, 0);
    }

    #[test]
    fn duplicate_response_is_idempotent() {
        let (storage, drill) = store_with_drill("ClassA", 10);

        let first = storage.record_response(drill.id, 42, 20).unwrap();
        assert!(first.newly_recorded);

        let second = storage.record_response(drill.id, 42, 35).unwrap();
        assert!(!second.newly_recorded);
        assert_eq!(second.response, first.response);

        // One row, counted once.
        assert_eq!(storage.responses_for(drill.id).unwrap().len(), 1);
        assert_eq!(storage.list_reports().unwrap()[0].responses_count, 1);
    }

    #[test]
    fn response_to_unknown_drill_rejected() {
        let storage = MemoryStorage::new();
        let err = storage.record_response(7, 42, 10).unwrap_err();
        assert!(matches!(err, StorageError::UnknownDrill(7)));
        assert!(storage.responses_for(7).unwrap().is_empty());
    }

    #[test]
    fn reports_newest_first_with_id_tiebreak() {
        let storage = MemoryStorage::new();
        // Same millisecond: id decides.
        let a = storage.create_drill("fire", "ClassA", "", "", 100).unwrap();
        let b = storage.create_drill("quake", "ClassA", "", "", 100).unwrap();
        let c = storage.create_drill("flood", "ClassA", "", "", 50).unwrap();

        let ids: Vec<u64> = storage.list_reports().unwrap().iter().map(|r| r.drill.id).collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);
    }

    #[test]
    fn latest_for_class_sees_own_class_and_all() {
        let storage = MemoryStorage::new();
        storage.create_drill("fire", "ClassA", "", "", 10).unwrap();
        let all = storage.create_drill("quake", "ALL", "", "", 20).unwrap();
        storage.create_drill("flood", "ClassB", "", "", 30).unwrap();

        assert_eq!(storage.latest_for_class("ClassA").unwrap(), Some(all));
        assert_eq!(storage.latest_for_class("ClassC").unwrap().map(|d| d.kind), Some("quake".to_string()));
    }
}
