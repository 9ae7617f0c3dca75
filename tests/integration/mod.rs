//! Integration tests for the article generation pipeline

mod config_integration;
mod loaders_integration;
mod pipeline;
mod store_integration;
mod test_utils;
