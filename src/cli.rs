//! CLI domain: parse, route, output, and presentation only.
//! No generation logic; the route table dispatches to the library services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_generation_report, format_status_json, format_status_text};
pub use route::RunContext;
