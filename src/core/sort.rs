use crate::domain::model::{Client, SortOrder};
use std::cmp::Ordering;

/// 字元的主要排序類別：空白與標點 < 數字 < 字母
fn char_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

/// Locale-aware name comparison in the style of an en-US collator.
///
/// Primary strength compares case-folded characters, with punctuation and
/// whitespace ordered before digits and digits before letters. Names equal at
/// that strength fall back to case (lowercase first), then to code points.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
        .cmp(b.chars().flat_map(char::to_lowercase).map(|c| (char_class(c), c)));

    primary
        .then_with(|| {
            // 小寫排在大寫前面
            a.chars()
                .map(|c| c.is_uppercase())
                .cmp(b.chars().map(|c| c.is_uppercase()))
        })
        .then_with(|| a.cmp(b))
}

/// Returns the clients ordered by name. Input order is left untouched.
pub fn sort_clients(clients: &[Client], order: SortOrder) -> Vec<&Client> {
    let mut sorted: Vec<&Client> = clients.iter().collect();
    match order {
        SortOrder::Ascending => sorted.sort_by(|a, b| locale_compare(&a.name, &b.name)),
        SortOrder::Descending => sorted.sort_by(|a, b| locale_compare(&b.name, &a.name)),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn named(names: &[&str]) -> Vec<Client> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Client {
                id: i.to_string(),
                name: name.to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                active: true,
            })
            .collect()
    }

    fn names(sorted: &[&Client]) -> Vec<String> {
        sorted.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_case_insensitive_primary_order() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("CVS Pharmacy", "costco Pharmacy"), Ordering::Greater);
        assert_eq!(locale_compare("walgreens", "Walgreens"), Ordering::Less);
        assert_eq!(locale_compare("Walgreens", "Walgreens"), Ordering::Equal);
    }

    #[test]
    fn test_punctuation_sorts_before_letters() {
        assert_eq!(locale_compare("H-E-B Pharmacy", "Hy-Vee Pharmacy"), Ordering::Less);
        assert_eq!(locale_compare("Sam's Club", "Safeway"), Ordering::Greater);
        assert_eq!(locale_compare("Stop & Shop", "ShopRite"), Ordering::Greater);
        assert_eq!(locale_compare("4PLUS", "ACME"), Ordering::Less);
    }

    #[test]
    fn test_ascending_pharmacy_names() {
        let clients = named(&["Walgreens", "CVS Pharmacy", "Rite Aid", "Costco Pharmacy"]);
        assert_eq!(
            names(&sort_clients(&clients, SortOrder::Ascending)),
            vec!["Costco Pharmacy", "CVS Pharmacy", "Rite Aid", "Walgreens"]
        );
    }

    #[test]
    fn test_descending_reverses_ascending_for_distinct_names() {
        let clients = named(&[
            "Walgreens",
            "H-E-B Pharmacy",
            "Hy-Vee Pharmacy",
            "Sam's Club Pharmacy",
            "Safeway Pharmacy",
            "Stop & Shop Pharmacy",
        ]);
        let mut ascending = names(&sort_clients(&clients, SortOrder::Ascending));
        let descending = names(&sort_clients(&clients, SortOrder::Descending));
        ascending.reverse();
        assert_eq!(ascending, descending);
    }
}
