//! Article generation: prompt rendering, per-field generators and the orchestrator that
//! merges their results into persisted records.

pub mod fields;
pub mod orchestrator;
pub mod prompts;

pub use fields::{slot_for, FieldSlot, FIELD_SLOTS};
pub use orchestrator::{
    ArticleGenerator, GenerationReport, ItemOutcome, ItemStatus, DEFAULT_MAX_CONCURRENT_ITEMS,
};
pub use prompts::PromptTemplates;
