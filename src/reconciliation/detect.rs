//! Text normalization and detection heuristics over ledger narratives

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::AccountClass;

/// Institutions recognised by the bank-name detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BankCode {
    Kbank,
    Scb,
    Bbl,
    Ktb,
    Ttb,
    Bay,
    Gsb,
    Unknown,
}

impl BankCode {
    /// Canonical institution code
    pub fn code(&self) -> &'static str {
        match self {
            BankCode::Kbank => "KBANK",
            BankCode::Scb => "SCB",
            BankCode::Bbl => "BBL",
            BankCode::Ktb => "KTB",
            BankCode::Ttb => "TTB",
            BankCode::Bay => "BAY",
            BankCode::Gsb => "GSB",
            BankCode::Unknown => crate::types::UNKNOWN_BANK,
        }
    }
}

impl fmt::Display for BankCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Alias table, checked top to bottom; the first rule with a hit wins.
/// Reordering rules changes detection for narratives naming two banks.
const BANK_RULES: &[(&[&str], BankCode)] = &[
    (&["KBANK", "KASIKORN"], BankCode::Kbank),
    (&["SCB", "SIAM COMMERCIAL"], BankCode::Scb),
    (&["BBL", "BANGKOK BANK"], BankCode::Bbl),
    (&["KTB", "KRUNG THAI"], BankCode::Ktb),
    (&["TMB", "TTB"], BankCode::Ttb),
    (&["BAY", "KRUNGSRI"], BankCode::Bay),
    (&["GSB"], BankCode::Gsb),
];

/// Keyword table for account classes, first match wins
const ACCOUNT_CLASS_RULES: &[(&[&str], AccountClass)] = &[
    (&["C/A", "CURRENT", "กระแสรายวัน"], AccountClass::CurrentAccount),
    (&["S/A", "SAVING", "ออมทรัพย์"], AccountClass::SavingsAccount),
    (&["FIXED", "ฝากประจำ"], AccountClass::FixedDeposit),
];

static EMBEDDED_ACCOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9][0-9\-\s]{8,}[0-9]").expect("embedded account pattern"));

/// Detect the bank named in free text
pub fn detect_bank(text: &str) -> BankCode {
    let upper = text.to_uppercase();
    BANK_RULES
        .iter()
        .find(|(aliases, _)| aliases.iter().any(|alias| upper.contains(alias)))
        .map(|(_, code)| *code)
        .unwrap_or(BankCode::Unknown)
}

/// Classify a narrative as current, savings or fixed-deposit
pub fn detect_account_class(narrative: &str) -> AccountClass {
    let upper = narrative.to_uppercase();
    ACCOUNT_CLASS_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| upper.contains(keyword)))
        .map(|(_, class)| *class)
        .unwrap_or(AccountClass::Unknown)
}

/// Strip everything except ASCII digits
pub fn normalize_account(account: &str) -> String {
    account.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Find the first account-like digit run in a narrative
pub fn extract_embedded_account(narrative: &str) -> Option<&str> {
    EMBEDDED_ACCOUNT.find(narrative).map(|m| m.as_str())
}

/// Substring identity between a (possibly truncated) candidate and a full
/// statement account number. An empty candidate never matches.
pub fn same_account(candidate: &str, statement_account: &str) -> bool {
    let candidate = normalize_account(candidate);
    !candidate.is_empty() && normalize_account(statement_account).contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_bank_case_insensitive() {
        assert_eq!(detect_bank("Payment via KBANK Kasikorn branch"), BankCode::Kbank);
        assert_eq!(detect_bank("payment via kbank kasikorn branch"), BankCode::Kbank);
        assert_eq!(detect_bank("Siam Commercial Bank - Silom"), BankCode::Scb);
        assert_eq!(detect_bank("Krungsri Bangna"), BankCode::Bay);
        assert_eq!(detect_bank("TMB Thanachart"), BankCode::Ttb);
        assert_eq!(detect_bank("Petty cash"), BankCode::Unknown);
    }

    #[test]
    fn test_detect_bank_first_rule_wins() {
        // Both KTB and SCB aliases appear; SCB is earlier in the table.
        assert_eq!(detect_bank("Transfer KTB to SCB"), BankCode::Scb);
        assert_eq!(detect_bank("GSB via Bangkok Bank"), BankCode::Bbl);
    }

    #[test]
    fn test_bank_code_display() {
        assert_eq!(BankCode::Kbank.to_string(), "KBANK");
        assert_eq!(BankCode::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_detect_account_class() {
        assert_eq!(detect_account_class("KBANK C/A 123"), AccountClass::CurrentAccount);
        assert_eq!(detect_account_class("Current account"), AccountClass::CurrentAccount);
        assert_eq!(detect_account_class("บัญชีกระแสรายวัน"), AccountClass::CurrentAccount);
        assert_eq!(detect_account_class("kbank savings"), AccountClass::SavingsAccount);
        assert_eq!(detect_account_class("ออมทรัพย์ สาขาสีลม"), AccountClass::SavingsAccount);
        assert_eq!(detect_account_class("Fixed 12M"), AccountClass::FixedDeposit);
        assert_eq!(detect_account_class("เงินฝากประจำ"), AccountClass::FixedDeposit);
        assert_eq!(detect_account_class("Cash on hand"), AccountClass::Unknown);
    }

    #[test]
    fn test_account_class_first_match_wins() {
        assert_eq!(
            detect_account_class("S/A sweep to current"),
            AccountClass::CurrentAccount
        );
    }

    #[test]
    fn test_normalize_account() {
        assert_eq!(normalize_account("123-456 789"), "123456789");
        assert_eq!(normalize_account("123456789"), "123456789");
        assert_eq!(normalize_account("A/C No. 001-2"), "0012");
        assert_eq!(normalize_account("n/a"), "");
    }

    #[test]
    fn test_same_account_substring_rule() {
        assert!(same_account("456789", "123456789"));
        assert!(same_account("123-456 789", "123456789"));
        assert!(!same_account("999", "123456789"));
        assert!(!same_account("", "123456789"));
    }

    #[test]
    fn test_extract_embedded_account() {
        assert_eq!(
            extract_embedded_account("KBANK C/A 123-4-56789-0 Silom"),
            Some("123-4-56789-0")
        );
        assert_eq!(
            extract_embedded_account("SCB 0011223344 main"),
            Some("0011223344")
        );
        // Needs at least ten characters bounded by digits.
        assert_eq!(extract_embedded_account("Ref 12345678"), None);
        assert_eq!(extract_embedded_account("No digits here"), None);
    }

    #[test]
    fn test_extract_embedded_account_takes_first_run() {
        assert_eq!(
            extract_embedded_account("from 1111111111 to 2222222222"),
            Some("1111111111")
        );
    }
}
