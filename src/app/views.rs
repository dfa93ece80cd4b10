//! Text, JSON and CSV renderings of the client index and settings pages.

use crate::core::loader::{ClientListState, ListPhase};
use crate::core::routes::Route;
use crate::core::search::{format_date, format_date_time};
use crate::core::settings::RuleSettingsState;
use crate::domain::model::{Client, CodeKind, CodeList, Rule};
use crate::utils::error::{ConsoleError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// `3 NPIs`, `1 NDC`, `0 NDCs`
pub fn count_label(count: usize, kind: CodeKind) -> String {
    format!(
        "{} {}{}",
        count,
        kind.label(),
        if count == 1 { "" } else { "s" }
    )
}

pub fn client_count_label(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "client" } else { "clients" })
}

fn status_label(client: &Client) -> &'static str {
    if client.active {
        "Active"
    } else {
        "Inactive"
    }
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(rows.iter().map(|row| line(row.as_slice())));
    out.join("\n")
}

fn to_csv<S: Serialize>(records: impl IntoIterator<Item = S>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ConsoleError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ConsoleError::ValidationError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[derive(Serialize)]
struct ClientRow<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "createdAt")]
    created_at: String,
    active: bool,
    settings: String,
}

impl<'a> From<&'a Client> for ClientRow<'a> {
    fn from(client: &'a Client) -> Self {
        Self {
            id: &client.id,
            name: &client.name,
            created_at: format_date(&client.created_at),
            active: client.active,
            settings: Route::settings(client.id.as_str()).path(),
        }
    }
}

/// Only the table has an error view. JSON and CSV output must stay
/// machine-readable, so a failed load is reported as an error instead.
fn error_view(message: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format!(
            "{}\n[Try Again] rerun the command, or pass --retries to retry on failure",
            message
        )),
        OutputFormat::Json | OutputFormat::Csv => Err(ConsoleError::SourceUnavailable {
            message: message.to_string(),
        }),
    }
}

pub fn render_client_index(state: &ClientListState, format: OutputFormat) -> Result<String> {
    match state.phase() {
        ListPhase::Loading => return Ok("Loading clients...".to_string()),
        ListPhase::Failed(message) => return error_view(message, format),
        ListPhase::Ready => {}
    }

    let sorted = state.sorted();
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&sorted)?),
        OutputFormat::Csv => to_csv(sorted.iter().map(|c| ClientRow::from(*c))),
        OutputFormat::Table => {
            let mut badge = client_count_label(state.clients().len());
            if state.has_more() {
                badge.push_str(" (loading more...)");
            }
            let mut out = vec![format!("Clients  [{}]", badge), String::new()];

            if sorted.is_empty() {
                out.push("No clients found".to_string());
                return Ok(out.join("\n"));
            }

            let headers = vec![
                "ID".to_string(),
                format!("Name {}", state.sort_order().arrow()),
                "Created At".to_string(),
                "Status".to_string(),
                "Settings".to_string(),
            ];
            let rows: Vec<Vec<String>> = sorted
                .iter()
                .map(|client| {
                    let row = ClientRow::from(*client);
                    vec![
                        row.id.to_string(),
                        row.name.to_string(),
                        row.created_at,
                        status_label(client).to_string(),
                        row.settings,
                    ]
                })
                .collect();
            out.push(render_table(&headers, &rows));

            if state.is_loading_more() {
                out.push("Loading more...".to_string());
            }
            if !state.has_more() {
                out.push(String::new());
                out.push("All clients loaded".to_string());
            }
            Ok(out.join("\n"))
        }
    }
}

#[derive(Serialize)]
struct RuleRow<'a> {
    id: &'a str,
    bin: &'a str,
    pcn: &'a str,
    #[serde(rename = "groupNumber")]
    group_number: &'a str,
    #[serde(rename = "excludedNPIs")]
    excluded_npis: usize,
    #[serde(rename = "excludedNDCs")]
    excluded_ndcs: usize,
    #[serde(rename = "includedNPIs")]
    included_npis: usize,
    #[serde(rename = "allowedNDCs")]
    allowed_ndcs: usize,
    #[serde(rename = "createdAt")]
    created_at: String,
}

impl<'a> From<&'a Rule> for RuleRow<'a> {
    fn from(rule: &'a Rule) -> Self {
        Self {
            id: &rule.id,
            bin: &rule.bin,
            pcn: &rule.pcn,
            group_number: &rule.group_number,
            excluded_npis: rule.excluded_npis.len(),
            excluded_ndcs: rule.excluded_ndcs.len(),
            included_npis: rule.included_npis.len(),
            allowed_ndcs: rule.allowed_ndcs.len(),
            created_at: format_date_time(&rule.created_at),
        }
    }
}

pub fn render_rule_settings(state: &RuleSettingsState, format: OutputFormat) -> Result<String> {
    if state.is_loading() {
        return Ok("Loading rules...".to_string());
    }
    if let Some(message) = state.error() {
        return error_view(message, format);
    }

    let filtered = state.filtered();
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&filtered)?),
        OutputFormat::Csv => to_csv(filtered.iter().map(|r| RuleRow::from(*r))),
        OutputFormat::Table => {
            let mut out = vec![
                "Client Settings".to_string(),
                format!("Client ID: {}", state.client_id()),
                String::new(),
                format!("NCPDP Routing Rules  [{}]", state.summary()),
            ];
            if !state.search_term().is_empty() {
                out.push(format!("Search: {}", state.search_term()));
            }
            out.push(String::new());

            if let Some(empty) = state.empty_state() {
                out.push(empty.message().to_string());
                if let Some(hint) = empty.hint() {
                    out.push(hint.to_string());
                }
                return Ok(out.join("\n"));
            }

            let mut headers = vec![
                "Rule ID".to_string(),
                "BIN".to_string(),
                "PCN".to_string(),
                "Group Number".to_string(),
            ];
            headers.extend(CodeList::ALL.iter().map(|list| list.title().to_string()));
            headers.push("Created At".to_string());

            let rows: Vec<Vec<String>> = filtered
                .iter()
                .map(|rule| {
                    let mut row = vec![
                        rule.id.clone(),
                        rule.bin.clone(),
                        rule.pcn.clone(),
                        rule.group_number.clone(),
                    ];
                    row.extend(
                        CodeList::ALL
                            .iter()
                            .map(|list| count_label(rule.codes(*list).len(), list.kind())),
                    );
                    row.push(format_date_time(&rule.created_at));
                    row
                })
                .collect();
            out.push(render_table(&headers, &rows));
            Ok(out.join("\n"))
        }
    }
}
