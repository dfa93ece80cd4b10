use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::ConsoleError;

/// 客戶（藥局連鎖）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// NCPDP routing rule. 程式碼格式不做驗證，清單可以是空的。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub client_id: String,
    pub bin: String,
    pub pcn: String,
    pub group_number: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "excludedNPIs", default)]
    pub excluded_npis: Vec<String>,
    #[serde(rename = "excludedNDCs", default)]
    pub excluded_ndcs: Vec<String>,
    #[serde(rename = "includedNPIs", default)]
    pub included_npis: Vec<String>,
    #[serde(rename = "allowedNDCs", default)]
    pub allowed_ndcs: Vec<String>,
}

impl Rule {
    pub fn codes(&self, list: CodeList) -> &[String] {
        match list {
            CodeList::ExcludedNpis => &self.excluded_npis,
            CodeList::ExcludedNdcs => &self.excluded_ndcs,
            CodeList::IncludedNpis => &self.included_npis,
            CodeList::AllowedNdcs => &self.allowed_ndcs,
        }
    }
}

/// 一頁資料，`has_more` 表示後面還有資料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Npi,
    Ndc,
}

impl CodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            CodeKind::Npi => "NPI",
            CodeKind::Ndc => "NDC",
        }
    }
}

/// The four code lists attached to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeList {
    ExcludedNpis,
    ExcludedNdcs,
    IncludedNpis,
    AllowedNdcs,
}

impl CodeList {
    pub const ALL: [CodeList; 4] = [
        CodeList::ExcludedNpis,
        CodeList::ExcludedNdcs,
        CodeList::IncludedNpis,
        CodeList::AllowedNdcs,
    ];

    /// 下載檔名前綴
    pub fn file_prefix(&self) -> &'static str {
        match self {
            CodeList::ExcludedNpis => "excluded_npis",
            CodeList::ExcludedNdcs => "excluded_ndcs",
            CodeList::IncludedNpis => "included_npis",
            CodeList::AllowedNdcs => "allowed_ndcs",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CodeList::ExcludedNpis => "Excluded NPIs",
            CodeList::ExcludedNdcs => "Excluded NDCs",
            CodeList::IncludedNpis => "Included NPIs",
            CodeList::AllowedNdcs => "Allowed NDCs",
        }
    }

    pub fn kind(&self) -> CodeKind {
        match self {
            CodeList::ExcludedNpis | CodeList::IncludedNpis => CodeKind::Npi,
            CodeList::ExcludedNdcs | CodeList::AllowedNdcs => CodeKind::Ndc,
        }
    }
}

impl fmt::Display for CodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

impl FromStr for CodeList {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        CodeList::ALL
            .into_iter()
            .find(|list| list.file_prefix() == normalized)
            .ok_or_else(|| ConsoleError::ValidationError {
                message: format!(
                    "unknown list '{}', expected one of: excluded_npis, excluded_ndcs, included_npis, allowed_ndcs",
                    s
                ),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "↑",
            SortOrder::Descending => "↓",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(ConsoleError::ValidationError {
                message: format!("unknown sort order '{}', expected asc or desc", other),
            }),
        }
    }
}
