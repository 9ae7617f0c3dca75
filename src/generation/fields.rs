//! Field generators
//!
//! One generator per remote-generated field. Each wraps a provider call and folds any
//! failure into a [`CompletionError`] tagged with the field's kind, so nothing raised by a
//! provider ever reaches the orchestrator.
//!
//! [`FIELD_SLOTS`] maps every generated kind to its generator and the setter that writes
//! the result into a record. Adding a field means adding one slot.

use crate::error::ApiError;
use crate::model::{
    CategoryMap, CompletionError, CompletionErrorKind, CompletionInput, CompletionPrompts,
    CompletionRecord, ImageData,
};
use crate::provider::completion::CompletionOptions;
use crate::provider::{CompletionService, ImageSearchClient, ImageSearchRequest};
use futures::future::BoxFuture;
use tracing::debug;

pub const META_TITLE_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 45,
    temperature: 0.2,
    presence_penalty: 0.0,
};

pub const META_DESC_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 100,
    temperature: 0.2,
    presence_penalty: 0.0,
};

pub const CONTENT_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 3711,
    temperature: 0.5,
    presence_penalty: 0.8,
};

pub type FieldResult<T> = Result<T, CompletionError>;

pub async fn generate_content(
    completions: &CompletionService,
    prompt: &str,
) -> FieldResult<String> {
    completions
        .generate_completion(prompt, CONTENT_OPTIONS)
        .await
        .map_err(|e| CompletionError::new(CompletionErrorKind::Content, e.to_string()))
}

pub async fn generate_meta_title(
    completions: &CompletionService,
    prompt: &str,
) -> FieldResult<String> {
    completions
        .generate_completion(prompt, META_TITLE_OPTIONS)
        .await
        .map_err(|e| CompletionError::new(CompletionErrorKind::MetaTitle, e.to_string()))
}

pub async fn generate_meta_desc(
    completions: &CompletionService,
    prompt: &str,
) -> FieldResult<String> {
    completions
        .generate_completion(prompt, META_DESC_OPTIONS)
        .await
        .map_err(|e| CompletionError::new(CompletionErrorKind::MetaDesc, e.to_string()))
}

/// Pick an image for the input's category: first result of a one-image search.
pub async fn find_image(
    images: &dyn ImageSearchClient,
    categories: &CategoryMap,
    input: &CompletionInput,
) -> FieldResult<ImageData> {
    let img_error = |reason: String| CompletionError::new(CompletionErrorKind::Img, reason);

    let query = categories.get(&input.category).ok_or_else(|| {
        img_error(format!(
            "No image search term for category '{}'",
            input.category
        ))
    })?;

    let request = ImageSearchRequest {
        query: query.clone(),
        count: 1,
    };
    let results = images.search(&request).await.map_err(|e| match e {
        ApiError::ImageSearchStatus(status) => img_error(format!(
            "Bad request executing image search api (status {})",
            status
        )),
        other => img_error(other.to_string()),
    })?;

    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| img_error("No img url found".to_string()))?;

    debug!(key = %input.key, query = %query, url = %first.image_url, "Image selected");
    Ok(ImageData {
        url: first.image_url,
        attribution_username: first.username,
    })
}

/// Writes a generated value (and the prompt that produced it) into a record.
pub type RecordPatch = Box<dyn FnOnce(&mut CompletionRecord) + Send>;

pub type FieldFuture<'a> = BoxFuture<'a, FieldResult<RecordPatch>>;

/// Everything a field generator may need for one input.
pub struct FieldContext<'a> {
    pub completions: &'a CompletionService,
    pub images: &'a dyn ImageSearchClient,
    pub categories: &'a CategoryMap,
    pub input: &'a CompletionInput,
    pub prompts: &'a CompletionPrompts,
}

/// A generated field: its error kind, and how to produce a patch for it.
pub struct FieldSlot {
    pub kind: CompletionErrorKind,
    pub generate: for<'a> fn(&'a FieldContext<'a>) -> FieldFuture<'a>,
}

/// All remote-generated fields. Order here is the order errors are recorded in.
pub const FIELD_SLOTS: &[FieldSlot] = &[
    FieldSlot {
        kind: CompletionErrorKind::MetaTitle,
        generate: meta_title_slot,
    },
    FieldSlot {
        kind: CompletionErrorKind::MetaDesc,
        generate: meta_desc_slot,
    },
    FieldSlot {
        kind: CompletionErrorKind::Content,
        generate: content_slot,
    },
    FieldSlot {
        kind: CompletionErrorKind::Img,
        generate: image_slot,
    },
];

/// Slot for `kind`, if any generator produces it.
pub fn slot_for(kind: CompletionErrorKind) -> Option<&'static FieldSlot> {
    FIELD_SLOTS.iter().find(|slot| slot.kind == kind)
}

fn meta_title_slot<'a>(ctx: &'a FieldContext<'a>) -> FieldFuture<'a> {
    Box::pin(async move {
        let prompt = ctx.prompts.meta_title.clone();
        let value = generate_meta_title(ctx.completions, &prompt).await?;
        let patch: RecordPatch = Box::new(move |record: &mut CompletionRecord| {
            record.meta_title = Some(value);
            record.used_prompts.meta_title = prompt;
        });
        Ok(patch)
    })
}

fn meta_desc_slot<'a>(ctx: &'a FieldContext<'a>) -> FieldFuture<'a> {
    Box::pin(async move {
        let prompt = ctx.prompts.meta_desc.clone();
        let value = generate_meta_desc(ctx.completions, &prompt).await?;
        let patch: RecordPatch = Box::new(move |record: &mut CompletionRecord| {
            record.meta_desc = Some(value);
            record.used_prompts.meta_desc = prompt;
        });
        Ok(patch)
    })
}

fn content_slot<'a>(ctx: &'a FieldContext<'a>) -> FieldFuture<'a> {
    Box::pin(async move {
        let prompt = ctx.prompts.content.clone();
        let raw = generate_content(ctx.completions, &prompt).await?;
        let patch: RecordPatch = Box::new(move |record: &mut CompletionRecord| {
            record.set_content(raw);
            record.used_prompts.content = prompt;
        });
        Ok(patch)
    })
}

fn image_slot<'a>(ctx: &'a FieldContext<'a>) -> FieldFuture<'a> {
    Box::pin(async move {
        let image = find_image(ctx.images, ctx.categories, ctx.input).await?;
        let patch: RecordPatch = Box::new(move |record: &mut CompletionRecord| {
            record.set_image(image);
        });
        Ok(patch)
    })
}
