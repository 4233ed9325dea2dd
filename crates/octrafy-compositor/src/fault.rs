//! Page-level fault filtering.
//!
//! Browser extensions (wallets in particular) inject scripts that throw
//! into the page's global error handlers. Those faults have nothing to
//! do with this application and must not swap the UI for the recovery
//! screen. [`IgnoreList`] decides which faults to let through.

use serde::{Deserialize, Serialize};

/// Case-insensitive substrings identifying faults to ignore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IgnoreList(Vec<String>);

impl IgnoreList {
    /// Substrings ignored by default.
    pub const DEFAULT_PATTERNS: &'static [&'static str] = &["wallet", "sender"];

    /// Build a list from arbitrary patterns. Empty patterns are dropped,
    /// since they would match every message.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            patterns
                .into_iter()
                .map(Into::into)
                .filter(|p| !p.is_empty())
                .map(|p| p.to_lowercase())
                .collect(),
        )
    }

    /// A list that ignores nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// The lowercased patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    /// Whether a fault with this message should be ignored.
    #[must_use]
    pub fn should_ignore(&self, message: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let message = message.to_lowercase();
        self.0.iter().any(|p| message.contains(p.as_str()))
    }
}

impl From<Vec<String>> for IgnoreList {
    fn from(value: Vec<String>) -> Self {
        Self::new(value)
    }
}

impl From<IgnoreList> for Vec<String> {
    fn from(value: IgnoreList) -> Self {
        value.0
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERNS.iter().copied())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_ignores_wallet_and_sender_faults() {
        let list = IgnoreList::default();
        assert!(list.should_ignore("Cannot read properties of undefined (reading 'wallet')"));
        assert!(list.should_ignore("MetaMask: WALLET not connected"));
        assert!(list.should_ignore("Sender extension failed to inject"));
    }

    #[test]
    fn default_keeps_unrelated_faults() {
        let list = IgnoreList::default();
        assert!(!list.should_ignore("RuntimeError: unreachable executed"));
        assert!(!list.should_ignore(""));
    }

    #[test]
    fn empty_list_ignores_nothing() {
        assert!(!IgnoreList::empty().should_ignore("wallet"));
    }

    #[test]
    fn empty_patterns_are_dropped() {
        let list = IgnoreList::new(["", "Phantom"]);
        assert_eq!(list.patterns(), ["phantom"]);
        assert!(!list.should_ignore("anything else"));
        assert!(list.should_ignore("phantom provider missing"));
    }

    #[test]
    fn serializes_as_plain_array() {
        let json = serde_json::to_string(&IgnoreList::default()).unwrap();
        assert_eq!(json, r#"["wallet","sender"]"#);
        let list: IgnoreList = serde_json::from_str(r#"["Solana", ""]"#).unwrap();
        assert_eq!(list.patterns(), ["solana"]);
        assert!(list.should_ignore("Solana object not found"));
    }
}
