//! CSV export of error-free records.

use crate::error::ApiError;
use crate::model::CompletionRecord;
use crate::store::CompletionStore;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const EXPORT_HEADER: [&str; 10] = [
    "keyword",
    "title",
    "category",
    "metatitle",
    "metadesc",
    "raw_content",
    "cleaned_content",
    "html_content",
    "img_url",
    "img_attribution_username",
];

/// Write every succeeded record to `path`, creating parent directories. Returns the row count.
pub fn export_succeeded(store: &dyn CompletionStore, path: &Path) -> Result<usize, ApiError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::CsvError(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    let file = std::fs::File::create(path)
        .map_err(|e| ApiError::CsvError(format!("Failed to create {}: {}", path.display(), e)))?;

    let records = store.find_succeeded()?;
    let count = write_records(file, &records)?;
    info!(path = %path.display(), rows = count, "Exported succeeded records");
    Ok(count)
}

/// Write `records` with the export header. Unset fields become empty cells.
pub fn write_records<W: Write>(writer: W, records: &[CompletionRecord]) -> Result<usize, ApiError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADER)?;

    for record in records {
        let cell = |value: &Option<String>| value.clone().unwrap_or_default();
        csv_writer.write_record([
            record.input.key.clone(),
            cell(&record.title),
            record.input.category.clone(),
            cell(&record.meta_title),
            cell(&record.meta_desc),
            cell(&record.raw_content),
            cell(&record.cleaned_content),
            cell(&record.html_content),
            cell(&record.image_url),
            cell(&record.image_attribution_username),
        ])?;
    }

    csv_writer
        .flush()
        .map_err(|e| ApiError::CsvError(format!("Failed to flush export: {}", e)))?;
    Ok(records.len())
}
