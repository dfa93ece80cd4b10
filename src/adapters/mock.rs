//! In-memory data source seeded with the console's demo clients and rules.

use crate::core::pagination::paginate;
use crate::domain::model::{Client, Page, Rule};
use crate::domain::ports::{ClientDirectory, RuleSource};
use crate::utils::error::{ConsoleError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(800);

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

// (id, name, created_at, active)
const CLIENTS: [(&str, &str, (i32, u32, u32, u32, u32), bool); 20] = [
    ("a1b2c3d4-e5f6-7890-abcd-ef1234567890", "Walgreens", (2024, 1, 15, 10, 30), true),
    ("b2c3d4e5-f6a7-8901-bcde-f12345678901", "CVS Pharmacy", (2024, 2, 20, 14, 45), true),
    ("c3d4e5f6-a7b8-9012-cdef-123456789012", "Rite Aid", (2024, 3, 10, 9, 15), false),
    ("d4e5f6a7-b8c9-0123-def1-234567890123", "Walmart Pharmacy", (2024, 4, 5, 16, 20), true),
    ("e5f6a7b8-c9d0-1234-ef12-345678901234", "Kroger Pharmacy", (2024, 5, 12, 11, 0), true),
    ("f6a7b8c9-d0e1-2345-f123-456789012345", "Costco Pharmacy", (2024, 6, 18, 13, 30), true),
    ("a7b8c9d0-e1f2-3456-1234-567890123456", "Albertsons Pharmacy", (2024, 7, 22, 8, 45), false),
    ("b8c9d0e1-f2a3-4567-2345-678901234567", "Target Pharmacy", (2024, 8, 30, 15, 10), true),
    ("c9d0e1f2-a3b4-5678-3456-789012345678", "Publix Pharmacy", (2024, 9, 15, 12, 20), true),
    ("d0e1f2a3-b4c5-6789-4567-890123456789", "Sam's Club Pharmacy", (2024, 10, 1, 10, 0), false),
    ("e1f2a3b4-c5d6-7890-5678-901234567890", "Safeway Pharmacy", (2024, 10, 10, 9, 30), true),
    ("f2a3b4c5-d6e7-8901-6789-012345678901", "Hy-Vee Pharmacy", (2024, 10, 15, 14, 0), true),
    ("a3b4c5d6-e7f8-9012-7890-123456789012", "Meijer Pharmacy", (2024, 10, 20, 11, 15), true),
    ("b4c5d6e7-f8a9-0123-8901-234567890123", "Giant Eagle Pharmacy", (2024, 10, 22, 16, 45), false),
    ("c5d6e7f8-a9b0-1234-9012-345678901234", "Wegmans Pharmacy", (2024, 10, 24, 10, 20), true),
    ("d6e7f8a9-b0c1-2345-0123-456789012345", "H-E-B Pharmacy", (2024, 10, 25, 13, 30), true),
    ("e7f8a9b0-c1d2-3456-1234-567890123456", "ShopRite Pharmacy", (2024, 10, 26, 8, 50), true),
    ("f8a9b0c1-d2e3-4567-2345-678901234567", "Food Lion Pharmacy", (2024, 10, 27, 15, 10), false),
    ("a9b0c1d2-e3f4-5678-3456-789012345678", "Stop & Shop Pharmacy", (2024, 10, 28, 11, 40), true),
    ("b0c1d2e3-f4a5-6789-4567-890123456789", "Winn-Dixie Pharmacy", (2024, 10, 29, 14, 25), true),
];

pub fn seed_clients() -> Vec<Client> {
    CLIENTS
        .iter()
        .map(|&(id, name, (y, mo, d, h, mi), active)| Client {
            id: id.to_string(),
            name: name.to_string(),
            created_at: utc(y, mo, d, h, mi),
            active,
        })
        .collect()
}

struct SeedRule {
    id: &'static str,
    client_id: &'static str,
    bin: &'static str,
    pcn: &'static str,
    group_number: &'static str,
    created_at: (i32, u32, u32, u32, u32),
    excluded_npis: &'static [&'static str],
    excluded_ndcs: &'static [&'static str],
    included_npis: &'static [&'static str],
    allowed_ndcs: &'static [&'static str],
}

const RULES: [SeedRule; 10] = [
    SeedRule {
        id: "rule-001",
        client_id: "a1b2c3d4-e5f6-7890-abcd-ef1234567890",
        bin: "003858",
        pcn: "A4",
        group_number: "WLGN001",
        created_at: (2024, 1, 20, 10, 0),
        excluded_npis: &["1234567890", "2345678901", "3456789012"],
        excluded_ndcs: &["5555566677", "6666677788", "7777788899"],
        included_npis: &["1111111111", "2222222222"],
        allowed_ndcs: &["0045612340", "1234567890", "9876543210", "1111122233"],
    },
    SeedRule {
        id: "rule-002",
        client_id: "a1b2c3d4-e5f6-7890-abcd-ef1234567890",
        bin: "610020",
        pcn: "MEDDADV",
        group_number: "WLGN002",
        created_at: (2024, 2, 15, 14, 30),
        excluded_npis: &["4567890123", "5678901234"],
        excluded_ndcs: &["8888899900", "9999900011"],
        included_npis: &["3333333333", "4444444444", "5555555555"],
        allowed_ndcs: &["2222233344", "3333344455"],
    },
    SeedRule {
        id: "rule-003",
        client_id: "b2c3d4e5-f6a7-8901-bcde-f12345678901",
        bin: "610020",
        pcn: "CAREMARK",
        group_number: "CVS12345",
        created_at: (2024, 1, 25, 9, 15),
        excluded_npis: &["6789012345", "7890123456", "8901234567", "9012345678"],
        excluded_ndcs: &["0000011122", "1111122233", "2222233344"],
        included_npis: &["6666666666"],
        allowed_ndcs: &["4444455566", "5555566677", "6666677788"],
    },
    SeedRule {
        id: "rule-004",
        client_id: "b2c3d4e5-f6a7-8901-bcde-f12345678901",
        bin: "003858",
        pcn: "CN",
        group_number: "CVSHP001",
        created_at: (2024, 3, 10, 11, 20),
        excluded_npis: &["0123456789"],
        excluded_ndcs: &["3333344455", "4444455566"],
        included_npis: &["7777777777", "8888888888"],
        allowed_ndcs: &["7777788899", "8888899900", "9999900011", "0000011122", "1111122233"],
    },
    SeedRule {
        id: "rule-005",
        client_id: "b2c3d4e5-f6a7-8901-bcde-f12345678901",
        bin: "610600",
        pcn: "SILVER",
        group_number: "CVS98765",
        created_at: (2024, 4, 5, 16, 45),
        excluded_npis: &["1357924680", "2468013579"],
        excluded_ndcs: &["5555566677"],
        included_npis: &["9999999999"],
        allowed_ndcs: &["1212134345", "5656578789"],
    },
    SeedRule {
        id: "rule-006",
        client_id: "c3d4e5f6-a7b8-9012-cdef-123456789012",
        bin: "610127",
        pcn: "ENVISION",
        group_number: "RTAID100",
        created_at: (2024, 2, 1, 8, 30),
        excluded_npis: &["9876543210", "8765432109", "7654321098"],
        excluded_ndcs: &["6666677788", "7777788899"],
        included_npis: &["0000000000", "1010101010"],
        allowed_ndcs: &["9090912121", "8080823232"],
    },
    SeedRule {
        id: "rule-007",
        client_id: "d4e5f6a7-b8c9-0123-def1-234567890123",
        bin: "610455",
        pcn: "WALMART",
        group_number: "WMT00123",
        created_at: (2024, 3, 15, 12, 0),
        excluded_npis: &["6543210987"],
        excluded_ndcs: &["8888899900"],
        included_npis: &["2020202020"],
        allowed_ndcs: &["7070734343", "6060645454", "5050556565"],
    },
    SeedRule {
        id: "rule-008",
        client_id: "d4e5f6a7-b8c9-0123-def1-234567890123",
        bin: "600428",
        pcn: "4PLUS",
        group_number: "WMT00456",
        created_at: (2024, 4, 20, 10, 30),
        excluded_npis: &["5432109876", "4321098765", "3210987654", "2109876543", "1098765432"],
        excluded_ndcs: &["9999900011", "0000011122"],
        included_npis: &["3030303030", "4040404040"],
        allowed_ndcs: &["4040467676", "3030378787"],
    },
    SeedRule {
        id: "rule-009",
        client_id: "e5f6a7b8-c9d0-1234-ef12-345678901234",
        bin: "610097",
        pcn: "KROGR",
        group_number: "KRG55789",
        created_at: (2024, 5, 18, 9, 0),
        excluded_npis: &["0987654321", "9876543210"],
        excluded_ndcs: &["1111122233"],
        included_npis: &["5050505050"],
        allowed_ndcs: &["2020289898", "1010190909", "0101012112"],
    },
    SeedRule {
        id: "rule-010",
        client_id: "f6a7b8c9-d0e1-2345-f123-456789012345",
        bin: "610455",
        pcn: "COSTCO",
        group_number: "CST88321",
        created_at: (2024, 6, 22, 14, 15),
        excluded_npis: &["8765432100", "7654321009"],
        excluded_ndcs: &["2222233344", "3333344455"],
        included_npis: &["6060606060", "7070707070"],
        allowed_ndcs: &["9988776655", "8877665544", "7766554433", "6655443322"],
    },
];

fn owned(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

pub fn seed_rules() -> Vec<Rule> {
    RULES
        .iter()
        .map(|seed| {
            let (y, mo, d, h, mi) = seed.created_at;
            Rule {
                id: seed.id.to_string(),
                client_id: seed.client_id.to_string(),
                bin: seed.bin.to_string(),
                pcn: seed.pcn.to_string(),
                group_number: seed.group_number.to_string(),
                created_at: utc(y, mo, d, h, mi),
                excluded_npis: owned(seed.excluded_npis),
                excluded_ndcs: owned(seed.excluded_ndcs),
                included_npis: owned(seed.included_npis),
                allowed_ndcs: owned(seed.allowed_ndcs),
            }
        })
        .collect()
}

/// Static data answered after an artificial delay.
///
/// `fail_next` makes the next N calls fail, which is how the retry path is
/// exercised without a real backend.
pub struct MockBackend {
    clients: Vec<Client>,
    rules: Vec<Rule>,
    delay: Duration,
    failures_left: AtomicUsize,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(delay: Duration) -> Self {
        Self::with_data(seed_clients(), seed_rules(), delay)
    }

    pub fn with_data(clients: Vec<Client>, rules: Vec<Rule>, delay: Duration) -> Self {
        Self {
            clients,
            rules,
            delay,
            failures_left: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, operation: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let injected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if injected {
            tracing::warn!("Mock backend failing {} on request", operation);
            return Err(ConsoleError::SourceUnavailable {
                message: format!("mock failure injected for {}", operation),
            });
        }
        Ok(())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl ClientDirectory for MockBackend {
    async fn fetch_clients(&self, page: usize, page_size: usize) -> Result<Page<Client>> {
        self.respond("fetch_clients").await?;
        paginate(&self.clients, page, page_size)
    }
}

#[async_trait]
impl RuleSource for MockBackend {
    async fn fetch_rules(&self) -> Result<Vec<Rule>> {
        self.respond("fetch_rules").await?;
        Ok(self.rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_sizes_and_unique_ids() {
        let clients = seed_clients();
        assert_eq!(clients.len(), 20);
        let ids: HashSet<&str> = clients.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(clients[0].created_at.to_rfc3339(), "2024-01-15T10:30:00+00:00");

        let rules = seed_rules();
        assert_eq!(rules.len(), 10);
        assert!(rules
            .iter()
            .all(|r| ids.contains(r.client_id.as_str())));
    }

    #[tokio::test]
    async fn test_page_two_of_twenty() {
        let backend = MockBackend::new(Duration::ZERO);
        let page = backend.fetch_clients(2, 10).await.unwrap();
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.data[0].name, "Safeway Pharmacy");
        assert_eq!(page.data[9].name, "Winn-Dixie Pharmacy");
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_injected_failures_then_recovery() {
        let backend = MockBackend::new(Duration::ZERO).fail_next(1);
        assert!(backend.fetch_rules().await.is_err());
        assert_eq!(backend.fetch_rules().await.unwrap().len(), 10);
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_delay_is_applied() {
        tokio_test::block_on(async {
            let backend = MockBackend::new(Duration::from_millis(20));
            let started = std::time::Instant::now();
            backend.fetch_clients(1, 5).await.unwrap();
            assert!(started.elapsed() >= Duration::from_millis(20));
        });
    }
}
