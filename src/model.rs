//! Completion data model
//!
//! One [`CompletionRecord`] exists per [`CompletionInput`] key. Every generated field is
//! independently nullable; `errors` lists the fields whose last generation attempt failed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Category name → image search term.
pub type CategoryMap = HashMap<String, String>;

/// A keyword to write an article about, plus the category used to pick its image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionInput {
    pub key: String,
    pub category: String,
}

impl CompletionInput {
    pub fn new(key: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            category: category.into(),
        }
    }
}

/// Which generated field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionErrorKind {
    Content,
    MetaTitle,
    MetaDesc,
    Img,
    /// Reserved: the title is derived locally and no generator reports this kind.
    Title,
}

impl CompletionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionErrorKind::Content => "CONTENT",
            CompletionErrorKind::MetaTitle => "META_TITLE",
            CompletionErrorKind::MetaDesc => "META_DESC",
            CompletionErrorKind::Img => "IMG",
            CompletionErrorKind::Title => "TITLE",
        }
    }
}

impl fmt::Display for CompletionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed field generation. Several may coexist on one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionError {
    #[serde(rename = "error_type")]
    pub kind: CompletionErrorKind,
    pub reason: String,
}

impl CompletionError {
    pub fn new(kind: CompletionErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)
    }
}

/// The exact prompt text sent for each remote-generated text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPrompts {
    pub content: String,
    pub meta_desc: String,
    pub meta_title: String,
}

/// Image picked for an article, with the uploader to credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub url: String,
    pub attribution_username: String,
}

/// Persisted generation result for one input key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub input: CompletionInput,
    pub title: Option<String>,
    pub raw_content: Option<String>,
    pub cleaned_content: Option<String>,
    pub html_content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_desc: Option<String>,
    pub image_url: Option<String>,
    pub image_attribution_username: Option<String>,
    pub errors: Option<Vec<CompletionError>>,
    pub used_prompts: CompletionPrompts,
}

impl CompletionRecord {
    /// Empty record for `input`: every field unset, no errors.
    pub fn new(input: CompletionInput, used_prompts: CompletionPrompts) -> Self {
        Self {
            input,
            title: None,
            raw_content: None,
            cleaned_content: None,
            html_content: None,
            meta_title: None,
            meta_desc: None,
            image_url: None,
            image_attribution_username: None,
            errors: None,
            used_prompts,
        }
    }

    pub fn key(&self) -> &str {
        &self.input.key
    }

    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub fn error_count(&self) -> usize {
        self.errors.as_ref().map_or(0, Vec::len)
    }

    /// Replace the error list; an empty list is stored as `None`.
    pub fn set_errors(&mut self, errors: Vec<CompletionError>) {
        self.errors = if errors.is_empty() { None } else { Some(errors) };
    }

    /// Store raw body content along with its cleaned form.
    pub fn set_content(&mut self, raw: String) {
        self.cleaned_content = Some(clean_content(&raw));
        self.raw_content = Some(raw);
    }

    pub fn set_image(&mut self, image: ImageData) {
        self.image_url = Some(image.url);
        self.image_attribution_username = Some(image.attribution_username);
    }
}

/// Normalize line endings and drop the first line.
///
/// The model echoes the article title as its first line; it must not appear in the body.
pub fn clean_content(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    match normalized.split_once('\n') {
        Some((_, rest)) => rest.to_string(),
        None => String::new(),
    }
}
