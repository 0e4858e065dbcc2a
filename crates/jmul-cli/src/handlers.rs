//! Command handlers for CLI subcommands
//!
//! Each subcommand has its own module; shared helpers live in `utils`.

mod completions;
mod config;
mod decode;
mod encode;
mod rules;
mod utils;

pub use completions::handle_completions;
pub use config::handle_config;
pub use decode::handle_decode;
pub use encode::handle_encode;
pub use rules::handle_rules;
