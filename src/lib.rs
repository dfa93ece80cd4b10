pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{mock::MockBackend, storage::LocalStorage, Backend};
pub use app::{ClientsQuery, LoadedPage, OutputFormat, RuleConsole, RulesQuery};
pub use config::ConsoleConfig;
pub use utils::error::{ConsoleError, Result};
