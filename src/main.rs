use clap::Parser;
use rule_console::config::Command;
use rule_console::core::routes::Route;
use rule_console::utils::error::{ConsoleError, ErrorSeverity};
use rule_console::utils::{logger, validation::Validate};
use rule_console::{
    CliConfig, ClientsQuery, LoadedPage, LocalStorage, OutputFormat, RuleConsole, RulesQuery,
};

/// 錯誤畫面照樣輸出，但以對應的錯誤結束，讓退出碼反映載入失敗
fn finish(page: LoadedPage, format: OutputFormat) -> Result<String, ConsoleError> {
    let body = page.render(format)?;
    match page.failure() {
        Some(err) => {
            println!("{}", body);
            Err(err)
        }
        None => Ok(body),
    }
}

async fn run(cli: &CliConfig, config: &rule_console::ConsoleConfig) -> Result<String, ConsoleError> {
    let backend = config.build_backend()?;
    tracing::info!("🔌 Using {} data source", backend.name());

    let storage = LocalStorage::new(config.output_path().to_string());
    let console = RuleConsole::new(backend, storage);

    let rules_query = |search: &Option<String>| RulesQuery {
        search: search.clone(),
        retries: cli.retries,
    };

    match &cli.command {
        Command::Clients {
            pages, all, sort, ..
        } => {
            let query = ClientsQuery {
                page_size: config.page_size(),
                max_pages: if *all { None } else { Some(*pages) },
                sort: *sort,
                retries: cli.retries,
            };
            let page = console
                .load(&Route::ClientIndex, &query, &RulesQuery::default())
                .await?;
            finish(page, cli.format)
        }
        Command::Rules { client_id, search } => {
            let clients = ClientsQuery::default();
            let page = console
                .load(
                    &Route::settings(client_id.as_str()),
                    &clients,
                    &rules_query(search),
                )
                .await?;
            finish(page, cli.format)
        }
        Command::Download {
            client_id,
            rule_id,
            list,
            ..
        } => {
            let file_name = console
                .download(client_id, rule_id, *list, cli.retries)
                .await?;
            let path = std::path::Path::new(config.output_path()).join(&file_name);
            Ok(format!("📁 Saved {}", path.display()))
        }
        Command::Open { route, search, all } => {
            let route: Route = route.parse()?;
            let clients = ClientsQuery {
                page_size: config.page_size(),
                max_pages: if *all { None } else { Some(1) },
                retries: cli.retries,
                ..Default::default()
            };
            let page = console
                .load(&route, &clients, &rules_query(search))
                .await?;
            finish(page, cli.format)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(config.logging.verbose);
    } else {
        logger::init_cli_logger(config.logging.verbose);
    }

    tracing::info!("Starting rule-console");
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&cli, &config).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}
