//! User directory collaborator.
//!
//! The directory stores teacher/student identities and the class and
//! contact metadata the orchestrator needs: class membership for SMS
//! fan-out and student identity for response views. Credentials are
//! carried as opaque secrets; verifying them is the authentication
//! collaborator's job, not this server's.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use drillcast_proto::{ALL_CLASSES, Role};

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Directory id, unique per role table.
    pub id: u64,
    /// Login username (USN for students).
    pub username: String,
    /// Display name.
    pub name: String,
    /// Class, for students.
    pub class: Option<String>,
    /// Parent contact number, when on record.
    pub contact: Option<String>,
}

/// A row submitted to [`Directory::bulk_insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// Role table the entry belongs to.
    pub role: Role,
    /// Login username. Must be unique within the role table.
    pub username: String,
    /// Opaque secret (the bulk pipeline uses the student's DOB).
    ///
    /// Consumed at import time only. This server never verifies
    /// credentials, so the directory does not retain it; the
    /// authentication collaborator keeps its own copy.
    pub secret: String,
    /// Display name; falls back to the username when empty.
    pub name: String,
    /// Class, for students.
    pub class: Option<String>,
    /// Parent contact number.
    pub contact: Option<String>,
}

/// Outcome of a bulk insert: collected per-row results, no sequential
/// dependency between rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Rows inserted.
    pub inserted: u64,
    /// Failures, by input row.
    pub errors: Vec<RowError>,
}

/// One rejected bulk-insert row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based row number in the submitted batch.
    pub row: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// Directory lookup and bulk-import contract.
///
/// Treated as an external collaborator: the orchestrator only reads
/// from it, and the server seeds it at startup from a roster file.
pub trait Directory: Send + Sync + 'static {
    /// Look up a user by role and username.
    fn find_user(&self, role: Role, username: &str) -> Option<DirectoryEntry>;

    /// Look up a student by directory id.
    fn student(&self, id: u64) -> Option<DirectoryEntry>;

    /// All students of a class; [`ALL_CLASSES`] returns every student.
    fn class_members(&self, class: &str) -> Vec<DirectoryEntry>;

    /// Insert a batch of entries, collecting a result per row.
    ///
    /// Rows are independent: one duplicate username never blocks the
    /// rest of the batch.
    fn bulk_insert(&self, entries: &[NewEntry]) -> BulkOutcome;
}

/// In-memory directory implementation.
///
/// Uses `lock().expect()`: poisoning cannot leave partial writes here,
/// so propagating the panic is the honest choice.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    inner: Arc<Mutex<MemoryDirectoryInner>>,
}

#[derive(Default)]
struct MemoryDirectoryInner {
    /// (role, username) → entry. Usernames are unique per role table.
    by_username: HashMap<(Role, String), DirectoryEntry>,
    /// Student id → entry, for the response-view join.
    students_by_id: HashMap<u64, DirectoryEntry>,
    /// Next id per role table.
    next_id: HashMap<Role, u64>,
}

impl MemoryDirectory {
    /// Create a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::expect_used)]
impl Directory for MemoryDirectory {
    fn find_user(&self, role: Role, username: &str) -> Option<DirectoryEntry> {
        let inner = self.inner.lock().expect("mutex poisoned");
        inner.by_username.get(&(role, username.to_string())).cloned()
    }

    fn student(&self, id: u64) -> Option<DirectoryEntry> {
        let inner = self.inner.lock().expect("mutex poisoned");
        inner.students_by_id.get(&id).cloned()
    }

    fn class_members(&self, class: &str) -> Vec<DirectoryEntry> {
        let inner = self.inner.lock().expect("mutex poisoned");
        let mut members: Vec<DirectoryEntry> = inner
            .students_by_id
            .values()
            .filter(|e| class == ALL_CLASSES || e.class.as_deref() == Some(class))
            .cloned()
            .collect();
        // Stable fan-out order for logs and tests.
        members.sort_by_key(|e| e.id);
        members
    }

    fn bulk_insert(&self, entries: &[NewEntry]) -> BulkOutcome {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let mut outcome = BulkOutcome::default();

        for (i, entry) in entries.iter().enumerate() {
            let row = i + 1;
            if entry.username.trim().is_empty() {
                outcome.errors.push(RowError { row, reason: "missing username".to_string() });
                continue;
            }
            let key = (entry.role, entry.username.clone());
            if inner.by_username.contains_key(&key) {
                outcome.errors.push(RowError {
                    row,
                    reason: format!("{} already exists", entry.username),
                });
                continue;
            }

            let next = inner.next_id.entry(entry.role).or_insert(1);
            let id = *next;
            *next += 1;

            let name = if entry.name.trim().is_empty() {
                entry.username.clone()
            } else {
                entry.name.clone()
            };
            let stored = DirectoryEntry {
                id,
                username: entry.username.clone(),
                name,
                class: entry.class.clone(),
                contact: entry.contact.clone(),
            };

            if entry.role == Role::Student {
                inner.students_by_id.insert(id, stored.clone());
            }
            inner.by_username.insert(key, stored);
            outcome.inserted += 1;
        }

        outcome
    }
}
