//! Completion Record Store
//!
//! One row per input key. Scalar fields are stored as nullable text; the error list and
//! the used prompts are stored as JSON-encoded columns so rows stay readable by other
//! tooling (`{"errors": [...]}` and `{"prompts": {...}}`).

pub mod persistence;

pub use persistence::SledCompletionStore;

use crate::error::StorageError;
use crate::model::{CompletionError, CompletionInput, CompletionPrompts, CompletionRecord};
use serde::{Deserialize, Serialize};

/// Completion Record Store interface
pub trait CompletionStore: Send + Sync {
    /// Insert a new record. Fails with [`StorageError::DuplicateKey`] if the key exists.
    fn insert(&self, record: &CompletionRecord) -> Result<(), StorageError>;

    /// Overwrite the stored record for `key`. Fails with [`StorageError::KeyMismatch`] if
    /// `record` belongs to another key and [`StorageError::RecordNotFound`] if there is
    /// nothing to update.
    fn update_by_key(&self, key: &str, record: &CompletionRecord) -> Result<(), StorageError>;

    fn find_by_key(&self, key: &str) -> Result<Option<CompletionRecord>, StorageError>;

    /// Records with at least one field error.
    fn find_failed(&self) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Records without field errors.
    fn find_succeeded(&self) -> Result<Vec<CompletionRecord>, StorageError>;
}

/// On-disk row layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRow {
    pub keyword: String,
    pub category: String,
    pub title: Option<String>,
    pub raw_content: Option<String>,
    pub cleaned_content: Option<String>,
    pub html_content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_desc: Option<String>,
    pub img_url: Option<String>,
    pub img_attribution_username: Option<String>,
    /// JSON: `{"errors": [{"error_type": "...", "reason": "..."}]}`, absent when clean
    pub errors: Option<String>,
    /// JSON: `{"prompts": {"content": "...", "meta_desc": "...", "meta_title": "..."}}`
    pub prompts: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorsColumn {
    errors: Vec<CompletionError>,
}

#[derive(Serialize, Deserialize)]
struct PromptsColumn {
    prompts: CompletionPrompts,
}

impl CompletionRow {
    pub fn from_record(record: &CompletionRecord) -> Result<Self, StorageError> {
        let encode_err = |e: serde_json::Error| StorageError::Encode {
            key: record.input.key.clone(),
            message: e.to_string(),
        };

        let errors = match &record.errors {
            Some(errors) if !errors.is_empty() => Some(
                serde_json::to_string(&ErrorsColumn {
                    errors: errors.clone(),
                })
                .map_err(encode_err)?,
            ),
            _ => None,
        };
        let prompts = serde_json::to_string(&PromptsColumn {
            prompts: record.used_prompts.clone(),
        })
        .map_err(encode_err)?;

        Ok(Self {
            keyword: record.input.key.clone(),
            category: record.input.category.clone(),
            title: record.title.clone(),
            raw_content: record.raw_content.clone(),
            cleaned_content: record.cleaned_content.clone(),
            html_content: record.html_content.clone(),
            meta_title: record.meta_title.clone(),
            meta_desc: record.meta_desc.clone(),
            img_url: record.image_url.clone(),
            img_attribution_username: record.image_attribution_username.clone(),
            errors,
            prompts,
        })
    }

    pub fn into_record(self) -> Result<CompletionRecord, StorageError> {
        let key = self.keyword.clone();
        let decode_err = |e: serde_json::Error| StorageError::Decode {
            key: key.clone(),
            message: e.to_string(),
        };

        let errors = match &self.errors {
            Some(json) => {
                let column: ErrorsColumn = serde_json::from_str(json).map_err(decode_err)?;
                Some(column.errors)
            }
            None => None,
        };
        let prompts: PromptsColumn = serde_json::from_str(&self.prompts).map_err(decode_err)?;

        let mut record = CompletionRecord {
            input: CompletionInput {
                key: self.keyword,
                category: self.category,
            },
            title: self.title,
            raw_content: self.raw_content,
            cleaned_content: self.cleaned_content,
            html_content: self.html_content,
            meta_title: self.meta_title,
            meta_desc: self.meta_desc,
            image_url: self.img_url,
            image_attribution_username: self.img_attribution_username,
            errors: None,
            used_prompts: prompts.prompts,
        };
        record.set_errors(errors.unwrap_or_default());
        Ok(record)
    }

    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }
}
