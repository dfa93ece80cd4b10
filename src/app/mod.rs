pub mod console;
pub mod views;

pub use console::{ClientsQuery, LoadedPage, RuleConsole, RulesQuery};
pub use views::OutputFormat;
