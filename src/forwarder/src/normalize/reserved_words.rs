//! Attribute names the Insights query language reserves.
//!
//! See <https://docs.newrelic.com/docs/insights/new-relic-insights/adding-querying-data/inserting-custom-events#keywords>

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a reserved attribute name is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedPolicy {
    /// `word` becomes `word_moved`
    Moved,
    /// `word` becomes `` `word` ``
    Backticks,
    /// `word` becomes the given replacement
    Literal(&'static str),
}

impl ReservedPolicy {
    pub fn apply(&self, key: &str) -> String {
        match self {
            ReservedPolicy::Moved => format!("{}_moved", key),
            ReservedPolicy::Backticks => format!("`{}`", key),
            ReservedPolicy::Literal(replacement) => replacement.to_string(),
        }
    }
}

const MOVED: &[&str] = &["accountId", "appId", "timestamp", "type"];

const BACKTICKS: &[&str] = &[
    "ago",
    "and",
    "as",
    "auto",
    "begin",
    "begintime",
    "compare",
    "day",
    "days",
    "end",
    "endtime",
    "explain",
    "facet",
    "from",
    "hour",
    "hours",
    "in",
    "is",
    "like",
    "limit",
    "minute",
    "minutes",
    "month",
    "months",
    "not",
    "null",
    "offset",
    "or",
    "second",
    "seconds",
    "select",
    "since",
    "timeseries",
    "until",
    "week",
    "weeks",
    "where",
    "with",
];

/// Read-only lookup from reserved attribute name to its rewrite policy.
#[derive(Debug, Clone)]
pub struct ReservedWordTable {
    words: HashMap<&'static str, ReservedPolicy>,
}

static INSIGHTS_RESERVED_WORDS: Lazy<ReservedWordTable> = Lazy::new(|| {
    let words = MOVED
        .iter()
        .map(|word| (*word, ReservedPolicy::Moved))
        .chain(BACKTICKS.iter().map(|word| (*word, ReservedPolicy::Backticks)))
        .collect();
    ReservedWordTable { words }
});

impl ReservedWordTable {
    /// The process-wide table for the Insights API.
    pub fn insights() -> &'static ReservedWordTable {
        &INSIGHTS_RESERVED_WORDS
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (&'static str, ReservedPolicy)>) -> Self {
        ReservedWordTable {
            words: entries.into_iter().collect(),
        }
    }

    pub fn policy(&self, key: &str) -> Option<ReservedPolicy> {
        self.words.get(key).copied()
    }

    pub fn is_reserved(&self, key: &str) -> bool {
        self.words.contains_key(key)
    }

    /// The name `key` is emitted under: rewritten when reserved, unchanged otherwise.
    pub fn compliant_name(&self, key: &str) -> String {
        match self.policy(key) {
            Some(policy) => policy.apply(key),
            None => key.to_string(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ReservedPolicy)> + '_ {
        self.words.iter().map(|(word, policy)| (*word, *policy))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn insights_table_has_four_moved_entries() {
        let table = ReservedWordTable::insights();

        let moved: Vec<_> = table
            .iter()
            .filter(|(_, policy)| *policy == ReservedPolicy::Moved)
            .collect();

        assert_eq!(moved.len(), 4);
        assert_eq!(table.len(), MOVED.len() + BACKTICKS.len());
        assert!(table
            .iter()
            .all(|(_, policy)| matches!(policy, ReservedPolicy::Moved | ReservedPolicy::Backticks)));
    }

    #[rstest]
    #[case::moved(ReservedPolicy::Moved, "type", "type_moved")]
    #[case::backticks(ReservedPolicy::Backticks, "select", "`select`")]
    #[case::literal(ReservedPolicy::Literal("source_host"), "host", "source_host")]
    fn policy_branches(#[case] policy: ReservedPolicy, #[case] key: &str, #[case] expected: &str) {
        assert_eq!(policy.apply(key), expected);
    }

    #[rstest]
    #[case("accountId", "accountId_moved")]
    #[case("appId", "appId_moved")]
    #[case("timestamp", "timestamp_moved")]
    #[case("type", "type_moved")]
    #[case("from", "`from`")]
    #[case("where", "`where`")]
    #[case("message", "message")]
    #[case("Type", "Type")]
    fn compliant_names(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(ReservedWordTable::insights().compliant_name(key), expected);
    }

    #[test]
    fn custom_table_applies_literal_policy() {
        let table = ReservedWordTable::from_entries([
            ("host", ReservedPolicy::Literal("hostname")),
            ("limit", ReservedPolicy::Backticks),
        ]);

        assert_eq!(table.compliant_name("host"), "hostname");
        assert_eq!(table.compliant_name("limit"), "`limit`");
        assert_eq!(table.compliant_name("type"), "type");
    }
}
