use crate::adapters::http::HttpBackend;
use crate::adapters::mock::MockBackend;
use crate::adapters::Backend;
use crate::core::loader::DEFAULT_PAGE_SIZE;
use crate::utils::error::{ConsoleError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "rule-console.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Mock,
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub source: SourceConfig,
    pub clients: ClientsConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub r#type: SourceKind,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// 模擬資料來源的延遲（毫秒）
    pub delay_ms: u64,
    /// 模擬資料來源前 N 次請求失敗
    pub fail_first: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            r#type: SourceKind::Mock,
            endpoint: None,
            timeout_seconds: None,
            delay_ms: 800,
            fail_first: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientsConfig {
    pub page_size: usize,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./downloads".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
}

impl ConsoleConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ConsoleError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConsoleError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_BASE_URL})，未定義的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConsoleError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.source.r#type == SourceKind::Http {
            let endpoint =
                validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
            validation::validate_url("source.endpoint", endpoint)?;
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }

        validation::validate_positive_number("clients.page_size", self.clients.page_size, 1)?;
        validation::validate_path("export.output_path", &self.export.output_path)?;

        Ok(())
    }

    pub fn page_size(&self) -> usize {
        self.clients.page_size
    }

    pub fn output_path(&self) -> &str {
        &self.export.output_path
    }

    pub fn build_backend(&self) -> Result<Backend> {
        match self.source.r#type {
            SourceKind::Mock => {
                let delay = Duration::from_millis(self.source.delay_ms);
                Ok(Backend::Mock(
                    MockBackend::new(delay).fail_next(self.source.fail_first),
                ))
            }
            SourceKind::Http => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                let timeout = self.source.timeout_seconds.map(Duration::from_secs);
                Ok(Backend::Http(HttpBackend::new(endpoint, timeout)?))
            }
        }
    }
}

impl Validate for ConsoleConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
