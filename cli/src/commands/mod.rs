//! Subcommand implementations, one module per subcommand.

pub mod completions;
pub mod config;
pub mod generate;
pub mod inspect;
pub mod render;
pub mod scan;

pub use completions::generate_completions;
pub use config::run_config;
pub use generate::run_generate;
pub use inspect::run_inspect;
pub use render::{Delivery, run_render};
pub use scan::{ScanOptions, run_scan};
