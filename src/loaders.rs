//! CSV loaders for the keyword list and the category → image search term table.
//!
//! Both files carry a header row, which is skipped. Extra columns are ignored.

use crate::error::ApiError;
use crate::model::{CategoryMap, CompletionInput};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Load `(keyword, category)` rows.
pub fn load_inputs(path: &Path) -> Result<Vec<CompletionInput>, ApiError> {
    let inputs = read_inputs(open(path)?)?;
    debug!(path = %path.display(), count = inputs.len(), "Loaded inputs");
    Ok(inputs)
}

/// Load `(category, search term)` rows.
pub fn load_category_map(path: &Path) -> Result<CategoryMap, ApiError> {
    let categories = read_category_map(open(path)?)?;
    debug!(path = %path.display(), count = categories.len(), "Loaded categories");
    Ok(categories)
}

pub fn read_inputs<R: Read>(reader: R) -> Result<Vec<CompletionInput>, ApiError> {
    let mut inputs = Vec::new();
    for (line, (key, category)) in read_pairs(reader)?.into_iter().enumerate() {
        if key.is_empty() {
            warn!(row = line + 2, "Skipping input row without keyword");
            continue;
        }
        inputs.push(CompletionInput::new(key, category));
    }
    Ok(inputs)
}

/// Later rows win when a category appears twice.
pub fn read_category_map<R: Read>(reader: R) -> Result<CategoryMap, ApiError> {
    Ok(read_pairs(reader)?.into_iter().collect())
}

fn open(path: &Path) -> Result<std::fs::File, ApiError> {
    std::fs::File::open(path)
        .map_err(|e| ApiError::CsvError(format!("Failed to open {}: {}", path.display(), e)))
}

fn read_pairs<R: Read>(reader: R) -> Result<Vec<(String, String)>, ApiError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut pairs = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        match (row.get(0), row.get(1)) {
            (Some(first), Some(second)) => pairs.push((first.to_string(), second.to_string())),
            _ => {
                return Err(ApiError::CsvError(format!(
                    "Row {} has fewer than two columns",
                    index + 2
                )))
            }
        }
    }
    Ok(pairs)
}
