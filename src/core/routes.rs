use crate::utils::error::{ConsoleError, Result};
use std::fmt;
use std::str::FromStr;

/// Console pages addressable by URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ClientIndex,
    ClientSettings { client_id: String },
}

impl Route {
    pub fn settings(client_id: impl Into<String>) -> Self {
        Route::ClientSettings {
            client_id: client_id.into(),
        }
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::ClientIndex => write!(f, "/clients"),
            Route::ClientSettings { client_id } => write!(f, "/clients/{}/settings", client_id),
        }
    }
}

impl FromStr for Route {
    type Err = ConsoleError;

    fn from_str(path: &str) -> Result<Self> {
        // 去掉 query string 與結尾斜線
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            // 首頁導向客戶列表
            [] | ["clients"] => Ok(Route::ClientIndex),
            ["clients", id, "settings"] => Ok(Route::settings(*id)),
            _ => Err(ConsoleError::RouteError {
                path: path.to_string(),
            }),
        }
    }
}
