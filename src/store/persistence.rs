//! Persistence layer for the Completion Record Store

use crate::error::StorageError;
use crate::model::CompletionRecord;
use crate::store::{CompletionRow, CompletionStore};
use bincode;
use sled;
use std::path::Path;

/// Sled-based implementation of [`CompletionStore`]
///
/// Keys are the UTF-8 bytes of the input key; values are bincode-encoded
/// [`CompletionRow`]s.
pub struct SledCompletionStore {
    db: sled::Db,
}

impl SledCompletionStore {
    /// Open (or create) a store at the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Temporary store that is removed when dropped.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Every stored record, in key order.
    pub fn list_all(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        self.scan(|_| true)
    }

    fn encode(record: &CompletionRecord) -> Result<Vec<u8>, StorageError> {
        let row = CompletionRow::from_record(record)?;
        bincode::serialize(&row).map_err(|e| StorageError::Encode {
            key: record.input.key.clone(),
            message: e.to_string(),
        })
    }

    fn decode_row(key: &[u8], value: &[u8]) -> Result<CompletionRow, StorageError> {
        bincode::deserialize(value).map_err(|e| StorageError::Decode {
            key: String::from_utf8_lossy(key).to_string(),
            message: e.to_string(),
        })
    }

    fn scan<F>(&self, keep: F) -> Result<Vec<CompletionRecord>, StorageError>
    where
        F: Fn(&CompletionRow) -> bool,
    {
        let mut records = Vec::new();
        for item in self.db.iter() {
            let (key, value) = item?;
            let row = Self::decode_row(&key, &value)?;
            if keep(&row) {
                records.push(row.into_record()?);
            }
        }
        Ok(records)
    }
}

impl CompletionStore for SledCompletionStore {
    fn insert(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        let value = Self::encode(record)?;
        // compare-and-swap against "absent" so a racing duplicate never overwrites
        let swapped = self
            .db
            .compare_and_swap(record.key().as_bytes(), None as Option<&[u8]>, Some(value))?;
        if swapped.is_err() {
            return Err(StorageError::DuplicateKey(record.key().to_string()));
        }
        self.db.flush()?;
        Ok(())
    }

    fn update_by_key(&self, key: &str, record: &CompletionRecord) -> Result<(), StorageError> {
        if record.key() != key {
            return Err(StorageError::KeyMismatch {
                key: key.to_string(),
                record_key: record.key().to_string(),
            });
        }
        if !self.db.contains_key(key.as_bytes())? {
            return Err(StorageError::RecordNotFound(key.to_string()));
        }
        let value = Self::encode(record)?;
        self.db.insert(key.as_bytes(), value)?;
        self.db.flush()?;
        Ok(())
    }

    fn find_by_key(&self, key: &str) -> Result<Option<CompletionRecord>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(value) => {
                let row = Self::decode_row(key.as_bytes(), &value)?;
                Ok(Some(row.into_record()?))
            }
            None => Ok(None),
        }
    }

    fn find_failed(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        self.scan(|row| row.has_errors())
    }

    fn find_succeeded(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        self.scan(|row| !row.has_errors())
    }
}
