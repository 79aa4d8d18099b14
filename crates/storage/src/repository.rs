//! Repository Implementation

use crate::record::{Municipality, MunicipalityFields};
use crate::StorageError;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Logical name of the process-wide municipality store
pub const DEFAULT_STORE_NAME: &str = "municipios";

/// Result of a batch insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    /// Records added to the store
    pub inserted: usize,
    /// Records ignored because their id was already present
    pub skipped: usize,
}

/// Repository for municipality records (in-memory, keyed by id)
///
/// Every operation holds the single store lock for its whole duration, so
/// operations are atomic with respect to each other. Inserts follow a
/// skip-existing policy: a stored id is never overwritten by an insert.
pub struct MunicipalityRepository {
    /// Logical store name
    name: String,
    /// Records by id
    records: Mutex<BTreeMap<i64, Municipality>>,
}

impl MunicipalityRepository {
    /// Create a new in-memory repository
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        info!("Creating in-memory municipality store '{}'", name);
        Self {
            name,
            records: Mutex::new(BTreeMap::new()),
        }
    }

    /// Logical store name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<i64, Municipality>>, StorageError> {
        self.records
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
    }

    /// Insert a batch of records, skipping ids that are already stored
    pub fn insert_many<I>(&self, records: I) -> Result<InsertSummary, StorageError>
    where
        I: IntoIterator<Item = Municipality>,
    {
        let mut store = self.lock()?;
        let mut summary = InsertSummary::default();

        for record in records {
            if store.contains_key(&record.id) {
                debug!(id = record.id, "Skipping existing municipality");
                summary.skipped += 1;
                continue;
            }
            store.insert(record.id, record);
            summary.inserted += 1;
        }

        debug!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "Inserted municipality batch"
        );
        Ok(summary)
    }

    /// All stored records
    pub fn list_all(&self) -> Result<Vec<Municipality>, StorageError> {
        let store = self.lock()?;
        Ok(store.values().cloned().collect())
    }

    /// Look up a record by id
    pub fn find_by_id(&self, id: i64) -> Result<Option<Municipality>, StorageError> {
        let store = self.lock()?;
        Ok(store.get(&id).cloned())
    }

    /// Replace the mutable fields of an existing record.
    ///
    /// Returns the updated record, or `None` when `id` is not stored.
    pub fn replace(
        &self,
        id: i64,
        fields: MunicipalityFields,
    ) -> Result<Option<Municipality>, StorageError> {
        let mut store = self.lock()?;
        Ok(store.get_mut(&id).map(|record| {
            record.apply(fields);
            record.clone()
        }))
    }

    /// Remove every record. Returns whether the store held anything.
    pub fn delete_all(&self) -> Result<bool, StorageError> {
        let mut store = self.lock()?;
        if store.is_empty() {
            return Ok(false);
        }
        let removed = store.len();
        store.clear();
        debug!(removed, "Cleared municipality store");
        Ok(true)
    }

    /// Remove one record. Returns whether it existed.
    pub fn delete_by_id(&self, id: i64) -> Result<bool, StorageError> {
        let mut store = self.lock()?;
        Ok(store.remove(&id).is_some())
    }

    /// Get total record count
    pub fn count(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.len())
    }

    /// Poison the store lock, so every later operation fails
    #[cfg(any(test, feature = "test-util"))]
    pub fn poison(&self) {
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = self.records.lock();
                    panic!("store poisoned on purpose");
                })
                .join()
        });
    }
}

impl Default for MunicipalityRepository {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn sample() -> Vec<Municipality> {
        vec![
            Municipality::new(3170206, "Belo Horizonte"),
            Municipality::new(3118601, "Contagem"),
            Municipality::new(3106200, "Betim"),
        ]
    }

    #[test]
    fn test_insert_and_find() {
        let repo = MunicipalityRepository::default();

        let summary = repo.insert_many(sample()).unwrap();
        assert_eq!(summary, InsertSummary { inserted: 3, skipped: 0 });
        assert_eq!(repo.count().unwrap(), 3);

        let found = repo.find_by_id(3118601).unwrap();
        assert_eq!(found, Some(Municipality::new(3118601, "Contagem")));
        assert_eq!(repo.find_by_id(1).unwrap(), None);
    }

    #[test]
    fn test_insert_skips_existing_ids() {
        let repo = MunicipalityRepository::default();
        repo.insert_many(sample()).unwrap();
        repo.replace(3106200, MunicipalityFields { name: "Betim (editado)".to_string() })
            .unwrap();

        let summary = repo.insert_many(sample()).unwrap();
        assert_eq!(summary, InsertSummary { inserted: 0, skipped: 3 });
        assert_eq!(repo.count().unwrap(), 3);
        assert_eq!(
            repo.find_by_id(3106200).unwrap().unwrap().name,
            "Betim (editado)"
        );
    }

    #[test]
    fn test_insert_first_duplicate_in_batch_wins() {
        let repo = MunicipalityRepository::default();
        let summary = repo
            .insert_many(vec![Municipality::new(1, "Primeiro"), Municipality::new(1, "Segundo")])
            .unwrap();

        assert_eq!(summary, InsertSummary { inserted: 1, skipped: 1 });
        assert_eq!(repo.find_by_id(1).unwrap().unwrap().name, "Primeiro");
    }

    #[test]
    fn test_replace_keeps_id() {
        let repo = MunicipalityRepository::default();
        repo.insert_many(sample()).unwrap();

        let updated = repo
            .replace(3170206, Municipality::new(1, "BH").into())
            .unwrap();
        assert_eq!(updated, Some(Municipality::new(3170206, "BH")));
        assert_eq!(repo.find_by_id(1).unwrap(), None);
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn test_replace_missing_returns_none() {
        let repo = MunicipalityRepository::default();
        let updated = repo
            .replace(9999, MunicipalityFields { name: "Nada".to_string() })
            .unwrap();
        assert_eq!(updated, None);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_all_reports_prior_contents() {
        let repo = MunicipalityRepository::default();
        assert!(!repo.delete_all().unwrap());

        repo.insert_many(sample()).unwrap();
        assert!(repo.delete_all().unwrap());
        assert!(repo.list_all().unwrap().is_empty());
        assert!(!repo.delete_all().unwrap());
    }

    #[test]
    fn test_delete_by_id() {
        let repo = MunicipalityRepository::default();
        repo.insert_many(sample()).unwrap();

        assert!(repo.delete_by_id(3118601).unwrap());
        assert!(!repo.delete_by_id(3118601).unwrap());
        assert_eq!(repo.find_by_id(3118601).unwrap(), None);
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_store_name() {
        assert_eq!(MunicipalityRepository::default().name(), "municipios");
        assert_eq!(MunicipalityRepository::new("teste").name(), "teste");
    }

    #[test]
    fn test_concurrent_operations_do_not_lose_updates() {
        let repo = Arc::new(MunicipalityRepository::default());
        repo.insert_many((1000..2000).map(|id| Municipality::new(id, "a remover")))
            .unwrap();
        repo.insert_many((2000..3000).map(|id| Municipality::new(id, "antigo")))
            .unwrap();

        let handles = vec![
            {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    for chunk in (0..1000).collect::<Vec<i64>>().chunks(10) {
                        let batch = chunk.iter().map(|&id| Municipality::new(id, "novo"));
                        repo.insert_many(batch).unwrap();
                    }
                })
            },
            {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    for id in 1000..2000 {
                        assert!(repo.delete_by_id(id).unwrap());
                    }
                })
            },
            {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    for id in 2000..3000 {
                        let fields = MunicipalityFields { name: format!("editado {}", id) };
                        assert!(repo.replace(id, fields).unwrap().is_some());
                    }
                })
            },
        ];
        for handle in handles {
            handle.join().unwrap();
        }

        let records = repo.list_all().unwrap();
        assert_eq!(records.len(), 2000);
        assert!(records.iter().filter(|r| r.id < 1000).all(|r| r.name == "novo"));
        assert!(records.iter().all(|r| !(1000..2000).contains(&r.id)));
        assert!(records
            .iter()
            .filter(|r| r.id >= 2000)
            .all(|r| r.name == format!("editado {}", r.id)));
    }

    #[test]
    fn test_poisoned_lock_is_database_error() {
        let repo = MunicipalityRepository::default();
        repo.insert_many(sample()).unwrap();
        repo.poison();

        assert!(matches!(repo.list_all(), Err(StorageError::DatabaseError(_))));
        assert!(matches!(repo.find_by_id(3170206), Err(StorageError::DatabaseError(_))));
        assert!(matches!(repo.delete_all(), Err(StorageError::DatabaseError(_))));
        match repo.count() {
            Err(StorageError::DatabaseError(message)) => assert!(message.starts_with("Lock error")),
            other => panic!("unexpected count result: {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_ids_stay_unique(ids in proptest::collection::vec(0i64..50, 0..100)) {
            let repo = MunicipalityRepository::default();
            let batch: Vec<_> = ids.iter().map(|&id| Municipality::new(id, format!("m{}", id))).collect();

            let first = repo.insert_many(batch.clone()).unwrap();
            let second = repo.insert_many(batch).unwrap();

            let distinct: std::collections::BTreeSet<_> = ids.iter().copied().collect();
            prop_assert_eq!(first.inserted, distinct.len());
            prop_assert_eq!(first.inserted + first.skipped, ids.len());
            prop_assert_eq!(second.inserted, 0);
            prop_assert_eq!(repo.count().unwrap(), distinct.len());
        }
    }
}
