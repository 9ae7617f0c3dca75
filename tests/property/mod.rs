//! Property-based tests

mod content_cleaning;
mod end_marker;
