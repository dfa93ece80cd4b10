pub mod export;
pub mod loader;
pub mod pagination;
pub mod routes;
pub mod search;
pub mod settings;
pub mod sort;

pub use crate::domain::model::{Client, CodeList, Page, Rule, SortOrder};
pub use crate::domain::ports::{ClientDirectory, RuleSource, Storage};
pub use crate::utils::error::Result;
