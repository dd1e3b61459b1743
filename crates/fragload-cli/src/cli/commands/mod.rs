//! CLI command handlers, one per file.

mod config;
pub(super) mod fetch;
mod url;

pub use config::run_config;
pub use fetch::{run_fetch, FetchRequest};
pub use url::run_url;
