//! CLI command handlers, one file per command.

mod analyze;
mod clear;
mod extract;
mod health;
mod results;
mod scan;
mod serve;
mod upload;

pub use analyze::{run_analyze, run_analyze_url};
pub use clear::run_clear;
pub use extract::run_extract;
pub use health::run_health;
pub use results::run_results;
pub use scan::run_scan;
pub use serve::run_serve;
pub use upload::run_upload;
