use crate::domain::model::{CodeList, Rule};
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// A text file holding one code per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub content: String,
}

impl DownloadArtifact {
    pub fn new(list: CodeList, rule_id: &str, codes: &[String]) -> Self {
        Self {
            file_name: format!("{}_{}.txt", list.file_prefix(), rule_id),
            content: codes.join("\n"),
        }
    }

    pub fn for_rule(rule: &Rule, list: CodeList) -> Self {
        Self::new(list, &rule.id, rule.codes(list))
    }

    /// 寫入儲存空間，回傳檔名
    pub async fn save<S: Storage>(&self, storage: &S) -> Result<String> {
        tracing::debug!(
            "Writing {} ({} bytes) to storage",
            self.file_name,
            self.content.len()
        );
        storage
            .write_file(&self.file_name, self.content.as_bytes())
            .await?;
        Ok(self.file_name.clone())
    }
}
