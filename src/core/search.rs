use crate::domain::model::Rule;
use chrono::{DateTime, Utc};

/// `MM/DD/YYYY`，客戶列表使用
pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%m/%d/%Y").to_string()
}

/// en-US date and time, e.g. `01/20/2024, 10:00 AM`. Always rendered in UTC.
pub fn format_date_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%m/%d/%Y, %I:%M %p").to_string()
}

/// Narrows all rules down to the ones owned by `client_id`.
pub fn rules_for_client(rules: Vec<Rule>, client_id: &str) -> Vec<Rule> {
    rules
        .into_iter()
        .filter(|rule| rule.client_id == client_id)
        .collect()
}

pub fn rule_matches(rule: &Rule, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [
        rule.id.as_str(),
        rule.bin.as_str(),
        rule.pcn.as_str(),
        rule.group_number.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
        || format_date_time(&rule.created_at)
            .to_lowercase()
            .contains(&needle)
}

/// Rules whose id, BIN, PCN, group number or formatted creation date contain
/// `query`, ignoring case. Relative order is preserved.
pub fn filter_rules<'a>(rules: &'a [Rule], query: &str) -> Vec<&'a Rule> {
    rules.iter().filter(|rule| rule_matches(rule, query)).collect()
}
