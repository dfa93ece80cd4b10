use crate::core::search::{filter_rules, rules_for_client};
use crate::domain::model::Rule;
use crate::domain::ports::RuleSource;
use crate::utils::error::Result;

pub const LOAD_RULES_ERROR: &str = "Unable to load rules";

/// Empty-state variants of the rules table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyRules {
    NoMatches,
    NoRulesForClient,
}

impl EmptyRules {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyRules::NoMatches => "No rules found",
            EmptyRules::NoRulesForClient => "No rules found for this client",
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            EmptyRules::NoMatches => Some("Try adjusting your search terms"),
            EmptyRules::NoRulesForClient => None,
        }
    }
}

/// Rules page state for a single client.
#[derive(Debug, Clone)]
pub struct RuleSettingsState {
    client_id: String,
    rules: Vec<Rule>,
    loading: bool,
    error: Option<String>,
    search_term: String,
}

impl RuleSettingsState {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            rules: Vec::new(),
            loading: true,
            error: None,
            search_term: String::new(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// 收到所有規則後只保留此客戶的
    pub fn loaded(&mut self, all_rules: Vec<Rule>) {
        self.rules = rules_for_client(all_rules, &self.client_id);
        self.loading = false;
        self.error = None;
    }

    pub fn failed(&mut self) {
        self.loading = false;
        self.error = Some(LOAD_RULES_ERROR.to_string());
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn clear_search(&mut self) {
        self.search_term.clear();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Recomputed in full on every call.
    pub fn filtered(&self) -> Vec<&Rule> {
        filter_rules(&self.rules, &self.search_term)
    }

    /// e.g. `2 of 3 rules`
    pub fn summary(&self) -> String {
        let total = self.rules.len();
        format!(
            "{} of {} {}",
            self.filtered().len(),
            total,
            if total == 1 { "rule" } else { "rules" }
        )
    }

    pub fn empty_state(&self) -> Option<EmptyRules> {
        if self.loading || self.error.is_some() || !self.filtered().is_empty() {
            return None;
        }
        if self.search_term.is_empty() {
            Some(EmptyRules::NoRulesForClient)
        } else {
            Some(EmptyRules::NoMatches)
        }
    }
}

pub struct RuleSettingsController<R: RuleSource> {
    source: R,
    state: RuleSettingsState,
    retryable_failure: bool,
}

impl<R: RuleSource> RuleSettingsController<R> {
    pub fn new(source: R, client_id: impl Into<String>) -> Self {
        Self {
            source,
            state: RuleSettingsState::new(client_id),
            retryable_failure: false,
        }
    }

    pub fn state(&self) -> &RuleSettingsState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RuleSettingsState {
        &mut self.state
    }

    pub fn into_state(self) -> RuleSettingsState {
        self.state
    }

    /// 只有網路類的失敗值得再按一次「Try Again」
    pub fn can_retry(&self) -> bool {
        self.state.error().is_some() && self.retryable_failure
    }

    /// Loads (or reloads, for retry) the client's rules. Failures end up in
    /// the state; the returned flag tells whether the load succeeded.
    pub async fn load(&mut self) -> Result<bool> {
        self.state.begin_load();
        tracing::debug!("Fetching rules for client {}", self.state.client_id());

        match self.source.fetch_rules().await {
            Ok(all_rules) => {
                let fetched = all_rules.len();
                self.state.loaded(all_rules);
                tracing::info!(
                    "📥 Loaded {} of {} rules for client {}",
                    self.state.rules().len(),
                    fetched,
                    self.state.client_id()
                );
                Ok(true)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Failed to load rules for client {}: {}",
                    self.state.client_id(),
                    e
                );
                self.retryable_failure = e.is_retryable();
                self.state.failed();
                Ok(false)
            }
        }
    }
}
