//! Denylist of content patterns that are never accepted in the contact form.
//!
//! Patterns are checked in a fixed order and the first match wins. The matched
//! category is reported to the caller for logging only; user-facing messages
//! stay generic so the list can't be probed one pattern at a time.
//!
//! All patterns are compiled with the `regex` crate, which guarantees linear
//! time matching, so unbounded alternations can't backtrack catastrophically.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use strum::{Display, EnumIter};

/// Class of disallowed content a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DenyCategory {
    /// Security / attack terminology.
    AttackKeyword,
    /// Names of tags that carry active content.
    TagKeyword,
    /// SQL statements that modify or dump tables.
    SqlKeyword,
    /// Runs of three or more of `{[$%#*`.
    SpecialRun,
    /// URI schemes that execute or embed content.
    DangerousScheme,
    /// Tautologies used in naive SQL injection.
    BooleanSql,
}

impl DenyCategory {
    fn pattern(self) -> &'static str {
        match self {
            DenyCategory::AttackKeyword => {
                r"(?i)\b(?:hack(?:ing|er|ed)?|exploit|malware|phishing|ransomware|keylogger|botnet|ddos|xss|csrf|backdoor|rootkit|sql\s*injection)\b"
            }
            DenyCategory::TagKeyword => r"(?i)\b(?:script|iframe|frameset|applet|embed)\b",
            DenyCategory::SqlKeyword => {
                r"(?i)\b(?:drop\s+(?:table|database)|union\s+(?:all\s+)?select|insert\s+into|delete\s+from|truncate\s+table|alter\s+table|exec(?:ute)?\s+xp_\w+)\b"
            }
            DenyCategory::SpecialRun => r"[{\[$%#*]{3,}",
            DenyCategory::DangerousScheme => {
                r"(?i)\b(?:javascript|vbscript|livescript)\s*:|\bdata\s*:\s*[a-z]+/[a-z0-9.+-]+"
            }
            DenyCategory::BooleanSql => r"(?i)\b(?:or|and)\s+(\d+)\s*=\s*\d+|;\s*--",
        }
    }
}

/// Ordered set of compiled denylist patterns.
#[derive(Debug)]
pub struct Denylist {
    patterns: Vec<(DenyCategory, Regex)>,
}

lazy_static! {
    static ref STANDARD: Denylist = Denylist::compile(&[
        DenyCategory::AttackKeyword,
        DenyCategory::TagKeyword,
        DenyCategory::SqlKeyword,
        DenyCategory::SpecialRun,
        DenyCategory::DangerousScheme,
        DenyCategory::BooleanSql,
    ]);
}

impl Denylist {
    /// The shared standard list, compiled once.
    pub fn standard() -> &'static Denylist {
        &STANDARD
    }

    fn compile(order: &[DenyCategory]) -> Self {
        let patterns = order
            .iter()
            .map(|category| {
                let regex = Regex::new(category.pattern())
                    .unwrap_or_else(|e| panic!("invalid denylist pattern {category}: {e}"));
                (*category, regex)
            })
            .collect();
        Self { patterns }
    }

    /// First category whose pattern matches `text`, in list order.
    pub fn first_match(&self, text: &str) -> Option<DenyCategory> {
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(category, _)| *category)
    }

    /// Categories in evaluation order.
    pub fn categories(&self) -> impl Iterator<Item = DenyCategory> + '_ {
        self.patterns.iter().map(|(category, _)| *category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_category_compiles_and_is_listed() {
        let listed: Vec<_> = Denylist::standard().categories().collect();
        let all: Vec<_> = DenyCategory::iter().collect();
        assert_eq!(listed, all);
    }

    #[test]
    fn matches_each_category() {
        let list = Denylist::standard();
        let cases = [
            ("teach me hacking please", DenyCategory::AttackKeyword),
            ("an iframe here", DenyCategory::TagKeyword),
            ("DROP TABLE users", DenyCategory::SqlKeyword),
            ("1 UNION ALL SELECT password", DenyCategory::SqlKeyword),
            ("price $$$ now", DenyCategory::SpecialRun),
            ("{{{template}}}", DenyCategory::SpecialRun),
            ("vbscript:msgbox", DenyCategory::DangerousScheme),
            ("data:text/html;base64,AAAA", DenyCategory::DangerousScheme),
            ("admin or 1=1", DenyCategory::BooleanSql),
            ("x; --", DenyCategory::BooleanSql),
        ];
        for (text, expected) in cases {
            assert_eq!(list.first_match(text), Some(expected), "{text:?}");
        }
    }

    #[test]
    fn first_match_wins() {
        // both an attack keyword and SQL: the earlier category is reported
        assert_eq!(
            Denylist::standard().first_match("exploit: drop table users"),
            Some(DenyCategory::AttackKeyword)
        );
    }

    #[test]
    fn ordinary_messages_pass() {
        let list = Denylist::standard();
        for text in [
            "Hello, checking in.",
            "Alice",
            "a@b.com",
            "Could we schedule a call on Tuesday? My data: attached later.",
            "Orders 100% done, 2 = 2 and all good",
            "Please select a time from the calendar",
        ] {
            assert_eq!(list.first_match(text), None, "{text:?}");
        }
    }
}
