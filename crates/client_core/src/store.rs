use std::collections::HashSet;

use shared::domain::{UserId, UserRecord};
use tracing::warn;

/// In-memory copies of both user collections.
///
/// Only server-confirmed results reach this type, and it never does I/O.
/// Neither sequence ever holds two records with the same id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStore {
    primary: Vec<UserRecord>,
    read_only: Vec<UserRecord>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> &[UserRecord] {
        &self.primary
    }

    pub fn read_only(&self) -> &[UserRecord] {
        &self.read_only
    }

    pub fn get(&self, id: &UserId) -> Option<&UserRecord> {
        self.primary.iter().find(|record| &record.id == id)
    }

    pub fn replace_primary(&mut self, records: Vec<UserRecord>) {
        self.primary = dedup_by_id(records);
    }

    pub fn replace_read_only(&mut self, records: Vec<UserRecord>) {
        self.read_only = dedup_by_id(records);
    }

    /// Appends a created record. A record whose id is already present
    /// replaces the existing entry in place.
    pub fn insert(&mut self, record: UserRecord) {
        match self.position(&record.id) {
            Some(index) => {
                warn!(user_id = %record.id, "created user already present; replacing entry");
                self.primary[index] = record;
            }
            None => self.primary.push(record),
        }
    }

    pub fn remove(&mut self, id: &UserId) {
        self.primary.retain(|record| &record.id != id);
    }

    pub fn apply_update(&mut self, id: &UserId, record: UserRecord) {
        let Some(index) = self.position(id) else {
            return;
        };
        if &record.id != id && self.position(&record.id).is_some() {
            warn!(user_id = %id, returned_id = %record.id, "update would duplicate an id; ignoring");
            return;
        }
        self.primary[index] = record;
    }

    fn position(&self, id: &UserId) -> Option<usize> {
        self.primary.iter().position(|record| &record.id == id)
    }
}

fn dedup_by_id(records: Vec<UserRecord>) -> Vec<UserRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}

/// A server-confirmed change waiting to be applied to the primary collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Inserted(UserRecord),
    Updated { id: UserId, record: UserRecord },
    Removed(UserId),
}

impl Reconciliation {
    pub fn apply(self, store: &mut CollectionStore) {
        match self {
            Reconciliation::Inserted(record) => store.insert(record),
            Reconciliation::Updated { id, record } => store.apply_update(&id, record),
            Reconciliation::Removed(id) => store.remove(&id),
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
