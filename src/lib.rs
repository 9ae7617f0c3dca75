//! Article Gen: partial-failure article generation
//!
//! Generates SEO articles by fanning out independent field generations (body content,
//! meta title, meta description, image) per keyword, persists every record even when
//! some fields fail, and later regenerates only the failed fields.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod loaders;
pub mod logging;
pub mod model;
pub mod provider;
pub mod store;
