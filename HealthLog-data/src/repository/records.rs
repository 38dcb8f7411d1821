use tracing::{debug, info, warn};

use crate::database::{StorageConfig, StorageType};
use crate::models::record::StoredRecord;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::JsonFileStorage;
#[cfg(feature = "sqlite")]
use super::storage::SqliteStorage;

/// Key under which the serialized record list is stored
pub const RECORDS_KEY: &str = "records";

/// Durable storage of the serialized record list.
///
/// Implementations hold exactly one blob; every write replaces it whole.
pub trait RecordStorage {
    /// Read the stored blob, `None` when nothing has been stored yet
    fn load_blob(&self) -> Result<Option<String>, RepositoryError>;

    /// Replace the stored blob
    fn store_blob(&self, blob: &str) -> Result<(), RepositoryError>;

    /// Remove the stored blob
    fn clear_blob(&self) -> Result<(), RepositoryError>;

    /// Short description used in log lines
    fn describe(&self) -> String;
}

impl RecordStorage for InMemoryStorage {
    fn load_blob(&self) -> Result<Option<String>, RepositoryError> {
        self.get_item(RECORDS_KEY)
    }

    fn store_blob(&self, blob: &str) -> Result<(), RepositoryError> {
        self.set_item(RECORDS_KEY, blob)
    }

    fn clear_blob(&self) -> Result<(), RepositoryError> {
        self.remove_item(RECORDS_KEY)
    }

    fn describe(&self) -> String {
        "in-memory storage".to_string()
    }
}

#[cfg(feature = "sqlite")]
impl RecordStorage for SqliteStorage {
    fn load_blob(&self) -> Result<Option<String>, RepositoryError> {
        self.get_item(RECORDS_KEY)
    }

    fn store_blob(&self, blob: &str) -> Result<(), RepositoryError> {
        self.set_item(RECORDS_KEY, blob)
    }

    fn clear_blob(&self) -> Result<(), RepositoryError> {
        self.remove_item(RECORDS_KEY)
    }

    fn describe(&self) -> String {
        "SQLite storage".to_string()
    }
}

impl RecordStorage for JsonFileStorage {
    fn load_blob(&self) -> Result<Option<String>, RepositoryError> {
        self.read()
    }

    fn store_blob(&self, blob: &str) -> Result<(), RepositoryError> {
        self.write(blob)
    }

    fn clear_blob(&self) -> Result<(), RepositoryError> {
        self.remove()
    }

    fn describe(&self) -> String {
        format!("JSON file {}", self.path().display())
    }
}

/// Storage backend selected from configuration
#[derive(Debug, Clone)]
pub enum ConfiguredStorage {
    /// SQLite key/value table
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStorage),
    /// JSON file
    JsonFile(JsonFileStorage),
    /// Process memory
    Memory(InMemoryStorage),
}

impl RecordStorage for ConfiguredStorage {
    fn load_blob(&self) -> Result<Option<String>, RepositoryError> {
        match self {
            #[cfg(feature = "sqlite")]
            ConfiguredStorage::Sqlite(storage) => storage.load_blob(),
            ConfiguredStorage::JsonFile(storage) => storage.load_blob(),
            ConfiguredStorage::Memory(storage) => storage.load_blob(),
        }
    }

    fn store_blob(&self, blob: &str) -> Result<(), RepositoryError> {
        match self {
            #[cfg(feature = "sqlite")]
            ConfiguredStorage::Sqlite(storage) => storage.store_blob(blob),
            ConfiguredStorage::JsonFile(storage) => storage.store_blob(blob),
            ConfiguredStorage::Memory(storage) => storage.store_blob(blob),
        }
    }

    fn clear_blob(&self) -> Result<(), RepositoryError> {
        match self {
            #[cfg(feature = "sqlite")]
            ConfiguredStorage::Sqlite(storage) => storage.clear_blob(),
            ConfiguredStorage::JsonFile(storage) => storage.clear_blob(),
            ConfiguredStorage::Memory(storage) => storage.clear_blob(),
        }
    }

    fn describe(&self) -> String {
        match self {
            #[cfg(feature = "sqlite")]
            ConfiguredStorage::Sqlite(storage) => storage.describe(),
            ConfiguredStorage::JsonFile(storage) => storage.describe(),
            ConfiguredStorage::Memory(storage) => storage.describe(),
        }
    }
}

/// Open the backend named by `config`.
///
/// A SQLite file that cannot be opened is reported as an error.
pub fn open_storage(config: &StorageConfig) -> Result<ConfiguredStorage, RepositoryError> {
    info!("Opening {}", config.location());

    let storage = match config.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            let pool = crate::database::open_sqlite_pool(config)?;
            ConfiguredStorage::Sqlite(SqliteStorage::new(pool))
        }
        StorageType::JsonFile => ConfiguredStorage::JsonFile(JsonFileStorage::new(&config.json_path)),
        StorageType::Memory => {
            warn!("Using in-memory storage; records will not survive this process");
            ConfiguredStorage::Memory(InMemoryStorage::new())
        }
    };

    Ok(storage)
}

/// The record store: one ordered in-memory list mirrored to durable storage.
///
/// `load` reads the stored blob once; every mutation rewrites the whole blob
/// through `save_all`. A mutation whose write fails is rolled back in memory
/// so the list always matches what was last persisted.
#[derive(Debug)]
pub struct RecordRepository<S: RecordStorage> {
    storage: S,
    records: Vec<StoredRecord>,
}

impl<S: RecordStorage> RecordRepository<S> {
    /// Create an empty repository; call [`load`](Self::load) to read storage
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            records: Vec::new(),
        }
    }

    /// Create a repository and load its records
    pub fn open(storage: S) -> Result<Self, RepositoryError> {
        let mut repository = Self::new(storage);
        repository.load()?;
        Ok(repository)
    }

    /// Backend in use
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the in-memory list with the stored blob. Returns the count.
    pub fn load(&mut self) -> Result<usize, RepositoryError> {
        self.records = match self.storage.load_blob()? {
            Some(blob) if !blob.trim().is_empty() => serde_json::from_str(&blob)?,
            _ => Vec::new(),
        };

        info!("Loaded {} records from {}", self.records.len(), self.storage.describe());
        Ok(self.records.len())
    }

    /// Overwrite the stored blob with the whole in-memory list
    pub fn save_all(&self) -> Result<(), RepositoryError> {
        let blob = serde_json::to_string(&self.records)?;
        self.storage.store_blob(&blob)?;

        debug!("Saved {} records to {}", self.records.len(), self.storage.describe());
        Ok(())
    }

    /// All records in insertion order
    pub fn all(&self) -> &[StoredRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by id
    pub fn get(&self, id: &str) -> Option<&StoredRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    fn position(&self, id: &str) -> Result<usize, RepositoryError> {
        self.records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Append a record and persist
    pub fn insert(&mut self, record: StoredRecord) -> Result<StoredRecord, RepositoryError> {
        if self.get(&record.id).is_some() {
            return Err(RepositoryError::Validation(format!(
                "A record with id {} already exists",
                record.id
            )));
        }

        self.records.push(record.clone());
        if let Err(e) = self.save_all() {
            self.records.pop();
            return Err(e);
        }

        info!("Stored record {}", record.id);
        Ok(record)
    }

    /// Append several records and persist once
    pub fn extend(&mut self, records: Vec<StoredRecord>) -> Result<usize, RepositoryError> {
        for record in &records {
            if self.get(&record.id).is_some() {
                return Err(RepositoryError::Validation(format!(
                    "A record with id {} already exists",
                    record.id
                )));
            }
        }

        let previous_len = self.records.len();
        let added = records.len();
        self.records.extend(records);
        if let Err(e) = self.save_all() {
            self.records.truncate(previous_len);
            return Err(e);
        }

        info!("Stored {} records", added);
        Ok(added)
    }

    /// Replace the record with the same id, keeping its position, and persist
    pub fn replace(&mut self, record: StoredRecord) -> Result<StoredRecord, RepositoryError> {
        let index = self.position(&record.id)?;

        let previous = std::mem::replace(&mut self.records[index], record.clone());
        if let Err(e) = self.save_all() {
            self.records[index] = previous;
            return Err(e);
        }

        info!("Updated record {}", record.id);
        Ok(record)
    }

    /// Remove the record with `id` and persist
    pub fn remove(&mut self, id: &str) -> Result<StoredRecord, RepositoryError> {
        let index = self.position(id)?;

        let removed = self.records.remove(index);
        if let Err(e) = self.save_all() {
            self.records.insert(index, removed);
            return Err(e);
        }

        info!("Deleted record {}", id);
        Ok(removed)
    }

    /// Remove every record and the stored blob. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize, RepositoryError> {
        self.storage.clear_blob()?;
        let removed = self.records.len();
        self.records.clear();

        info!("Deleted all {} records", removed);
        Ok(removed)
    }
}

/// Mock record storage for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Mock storage that counts writes and can be told to fail them
    #[derive(Debug, Default)]
    pub struct MockRecordStorage {
        blob: RefCell<Option<String>>,
        writes: Cell<usize>,
        should_fail_writes: bool,
    }

    impl MockRecordStorage {
        /// Create an empty mock storage
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock storage pre-loaded with `blob`
        pub fn with_blob(blob: impl Into<String>) -> Self {
            Self {
                blob: RefCell::new(Some(blob.into())),
                ..Self::default()
            }
        }

        /// Configure the mock to fail every write
        pub fn with_write_failure(mut self) -> Self {
            self.should_fail_writes = true;
            self
        }

        /// Number of successful writes and clears
        pub fn write_count(&self) -> usize {
            self.writes.get()
        }

        /// Current blob
        pub fn blob(&self) -> Option<String> {
            self.blob.borrow().clone()
        }
    }

    impl RecordStorage for MockRecordStorage {
        fn load_blob(&self) -> Result<Option<String>, RepositoryError> {
            Ok(self.blob.borrow().clone())
        }

        fn store_blob(&self, blob: &str) -> Result<(), RepositoryError> {
            if self.should_fail_writes {
                return Err(RepositoryError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "mock is configured to fail writes",
                )));
            }
            *self.blob.borrow_mut() = Some(blob.to_string());
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn clear_blob(&self) -> Result<(), RepositoryError> {
            *self.blob.borrow_mut() = None;
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn describe(&self) -> String {
            "mock storage".to_string()
        }
    }

    /// Build a stored record with the given id and date
    pub fn sample_record(id: &str, date: &str) -> StoredRecord {
        StoredRecord {
            id: id.to_string(),
            name: "Budi".to_string(),
            badge_number: "BN-001".to_string(),
            age: 34,
            job_title: "Operator".to_string(),
            supervisor: "Sari".to_string(),
            department: "Mining".to_string(),
            systolic: 118,
            diastolic: 76,
            pulse: 72,
            spo2: 98.0,
            temperature: 36.6,
            date: date.to_string(),
            time: "07:15:00".to_string(),
            bp_stage: "Normal".to_string(),
            color: "bg-green-200".to_string(),
            fitness: "FIT".to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn test_load_empty_storage() {
        let mut repository = RecordRepository::new(MockRecordStorage::new());
        assert_eq!(repository.load().unwrap(), 0);
        assert!(repository.is_empty());
    }

    #[test]
    fn test_load_existing_blob() {
        let blob = serde_json::to_string(&vec![
            sample_record("a", "2024-01-01"),
            sample_record("b", "2024-01-02"),
        ])
        .unwrap();

        let repository = RecordRepository::open(MockRecordStorage::with_blob(blob)).unwrap();
        assert_eq!(repository.len(), 2);
        assert_eq!(repository.all()[1].id, "b");
    }

    #[test]
    fn test_load_rejects_corrupt_blob() {
        let mut repository = RecordRepository::new(MockRecordStorage::with_blob("{not json"));
        assert!(matches!(repository.load(), Err(RepositoryError::Serialization(_))));
    }

    #[test]
    fn test_every_mutation_persists_whole_list() {
        let mut repository = RecordRepository::new(MockRecordStorage::new());

        repository.insert(sample_record("a", "2024-01-01")).unwrap();
        repository.insert(sample_record("b", "2024-01-02")).unwrap();
        assert_eq!(repository.storage().write_count(), 2);

        let stored: Vec<StoredRecord> =
            serde_json::from_str(&repository.storage().blob().unwrap()).unwrap();
        assert_eq!(stored.len(), 2);

        repository.remove("a").unwrap();
        assert_eq!(repository.storage().write_count(), 3);
        let stored: Vec<StoredRecord> =
            serde_json::from_str(&repository.storage().blob().unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, "b");
    }

    #[test]
    fn test_insert_duplicate_id_is_rejected() {
        let mut repository = RecordRepository::new(MockRecordStorage::new());
        repository.insert(sample_record("a", "2024-01-01")).unwrap();

        let result = repository.insert(sample_record("a", "2024-01-05"));
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
        assert_eq!(repository.len(), 1);
        assert_eq!(repository.storage().write_count(), 1);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut repository = RecordRepository::new(MockRecordStorage::new());
        repository.insert(sample_record("a", "2024-01-01")).unwrap();
        repository.insert(sample_record("b", "2024-01-02")).unwrap();
        repository.insert(sample_record("c", "2024-01-03")).unwrap();

        let mut updated = sample_record("b", "2024-02-01");
        updated.name = "Dewi".to_string();
        repository.replace(updated).unwrap();

        let ids: Vec<&str> = repository.all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(repository.get("b").unwrap().name, "Dewi");
        assert_eq!(repository.get("a").unwrap().name, "Budi");
    }

    #[test]
    fn test_replace_and_remove_unknown_id() {
        let mut repository = RecordRepository::new(MockRecordStorage::new());
        assert!(matches!(
            repository.replace(sample_record("x", "2024-01-01")),
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(repository.remove("x"), Err(RepositoryError::NotFound(_))));
        assert_eq!(repository.storage().write_count(), 0);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut repository = RecordRepository::new(MockRecordStorage::new().with_write_failure());

        assert!(repository.insert(sample_record("a", "2024-01-01")).is_err());
        assert!(repository.is_empty());

        assert!(repository.extend(vec![sample_record("b", "2024-01-01")]).is_err());
        assert!(repository.is_empty());
        assert_eq!(repository.storage().blob(), None);
    }

    #[test]
    fn test_failed_write_restores_replaced_and_removed() {
        let blob = serde_json::to_string(&vec![sample_record("a", "2024-01-01")]).unwrap();
        let storage = MockRecordStorage::with_blob(blob).with_write_failure();
        let mut repository = RecordRepository::open(storage).unwrap();

        let mut updated = sample_record("a", "2024-01-01");
        updated.name = "Dewi".to_string();
        assert!(repository.replace(updated).is_err());
        assert_eq!(repository.get("a").unwrap().name, "Budi");

        assert!(repository.remove("a").is_err());
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_clear_removes_blob() {
        let mut repository = RecordRepository::new(MockRecordStorage::new());
        repository.insert(sample_record("a", "2024-01-01")).unwrap();
        repository.insert(sample_record("b", "2024-01-01")).unwrap();

        assert_eq!(repository.clear().unwrap(), 2);
        assert!(repository.is_empty());
        assert_eq!(repository.storage().blob(), None);
    }

    #[test]
    fn test_json_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        let mut repository = RecordRepository::open(JsonFileStorage::new(&path)).unwrap();
        repository.insert(sample_record("a", "2024-01-01")).unwrap();
        repository.insert(sample_record("b", "2024-01-07")).unwrap();
        drop(repository);

        let reopened = RecordRepository::open(JsonFileStorage::new(&path)).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("b").unwrap().date, "2024-01-07");
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            storage_type: StorageType::Sqlite,
            sqlite_path: dir.path().join("healthlog.db"),
            ..StorageConfig::default()
        };

        let mut repository = RecordRepository::open(open_storage(&config).unwrap()).unwrap();
        repository.insert(sample_record("a", "2024-01-01")).unwrap();
        drop(repository);

        let reopened = RecordRepository::open(open_storage(&config).unwrap()).unwrap();
        assert_eq!(reopened.all(), &[sample_record("a", "2024-01-01")]);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_open_storage_rejects_unopenable_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let config = StorageConfig {
            storage_type: StorageType::Sqlite,
            sqlite_path: blocker.join("healthlog.db"),
            timeout_seconds: 1,
            ..StorageConfig::default()
        };

        let result = open_storage(&config);
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[test]
    fn test_open_memory_storage() {
        let config = StorageConfig {
            storage_type: StorageType::Memory,
            ..StorageConfig::default()
        };
        let storage = open_storage(&config).unwrap();
        assert!(matches!(storage, ConfiguredStorage::Memory(_)));
    }
}
