use crate::app::views::OutputFormat;
use crate::config::toml_config::{ConsoleConfig, SourceKind, DEFAULT_CONFIG_FILE};
use crate::domain::model::{CodeList, SortOrder};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "rule-console")]
#[command(about = "Browse pharmacy clients and their NCPDP routing rules")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to ./rule-console.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Data source to read clients and rules from
    #[arg(long, value_enum, global = true)]
    pub source: Option<SourceKind>,

    /// Base URL of the rules backend (http source)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Artificial latency of the mock source in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Retry a failed load up to N times
    #[arg(long, default_value = "0", global = true)]
    pub retries: usize,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List clients, loading pages the way scrolling does
    Clients {
        #[arg(long)]
        page_size: Option<usize>,

        /// Number of pages to load
        #[arg(long, default_value = "1", conflicts_with = "all")]
        pages: usize,

        /// Keep loading until every client is listed
        #[arg(long)]
        all: bool,

        /// Name sort order (asc or desc)
        #[arg(long, default_value = "asc")]
        sort: SortOrder,
    },
    /// Show the routing rules of one client
    Rules {
        client_id: String,

        /// Filter by rule ID, BIN, PCN, group number or date
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Save one code list of a rule as a text file
    Download {
        client_id: String,
        rule_id: String,
        /// excluded_npis, excluded_ndcs, included_npis or allowed_ndcs
        list: CodeList,

        /// Output directory (overrides export.output_path)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Render a console page by path, e.g. /clients or /clients/{id}/settings
    Open {
        route: String,

        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        all: bool,
    },
}

impl CliConfig {
    /// 載入設定檔並套用命令列覆蓋
    pub fn resolve(&self) -> Result<ConsoleConfig> {
        let mut config = match &self.config {
            Some(path) => ConsoleConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                ConsoleConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => ConsoleConfig::default(),
        };

        if let Some(source) = self.source {
            config.source.r#type = source;
        }
        if let Some(endpoint) = &self.endpoint {
            config.source.endpoint = Some(endpoint.clone());
            // 指定 endpoint 卻沒指定 source 時改用 http
            if self.source.is_none() {
                config.source.r#type = SourceKind::Http;
            }
        }
        if let Some(delay) = self.delay_ms {
            config.source.delay_ms = delay;
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.json_logs {
            config.logging.json = true;
        }

        match &self.command {
            Command::Clients {
                page_size: Some(size),
                ..
            } => config.clients.page_size = *size,
            Command::Download {
                output: Some(output),
                ..
            } => config.export.output_path = output.clone(),
            _ => {}
        }

        Ok(config)
    }
}
