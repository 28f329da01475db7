//! Recipient list parsing for bulk email.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

/// One bulk-email recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl Recipient {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Recipient {
            email: email.into(),
            name: name.into(),
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Parses pasted CSV text into recipients.
///
/// Expects `email,name` per line with an optional header row. Rows whose
/// first column is not a plausible email address are dropped without
/// reporting. A trailing name containing commas is rejoined.
pub fn parse_csv(text: &str) -> Vec<Recipient> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut cols = line.split(',');
        let email = cols.next().unwrap_or("").trim();
        let name = cols.collect::<Vec<_>>().join(",").trim().to_string();
        if !is_valid_email(email) {
            // The first row is usually a header; everything else malformed
            // is silently skipped so one bad row never blocks a batch.
            let _ = idx;
            continue;
        }
        out.push(Recipient::new(email, name));
    }
    out
}

/// Parses a manually typed address list.
///
/// Addresses may be separated by commas, semicolons, or any whitespace.
/// Invalid tokens are dropped. Manual entries carry no display name.
pub fn parse_manual(text: &str) -> Vec<Recipient> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty() && is_valid_email(token))
        .map(|email| Recipient::new(email, ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_parse_csv_skips_header_and_malformed() {
        let text = "email,name\njane@example.com,Jane Doe\nbroken line\nbob@example.com,Bob\n";
        let recipients = parse_csv(text);
        assert_eq!(
            recipients,
            vec![
                Recipient::new("jane@example.com", "Jane Doe"),
                Recipient::new("bob@example.com", "Bob"),
            ]
        );
    }

    #[test]
    fn test_parse_csv_rejoins_comma_names() {
        let recipients = parse_csv("jane@example.com,Doe, Jane");
        assert_eq!(recipients, vec![Recipient::new("jane@example.com", "Doe, Jane")]);
    }

    #[test]
    fn test_parse_csv_empty_name_allowed() {
        let recipients = parse_csv("jane@example.com\nbob@example.com,");
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].name, "");
        assert_eq!(recipients[1].name, "");
    }

    #[test]
    fn test_parse_manual_mixed_separators() {
        let recipients = parse_manual("a@x.com, b@y.org;c@z.net");
        assert_eq!(recipients.len(), 3);
        assert_eq!(recipients[0].email, "a@x.com");
        assert_eq!(recipients[1].email, "b@y.org");
        assert_eq!(recipients[2].email, "c@z.net");
        assert!(recipients.iter().all(|r| r.name.is_empty()));
    }

    #[test]
    fn test_parse_manual_whitespace_and_newlines() {
        let recipients = parse_manual("a@x.com\nb@y.org\t c@z.net");
        assert_eq!(recipients.len(), 3);
    }

    #[test]
    fn test_parse_manual_drops_invalid_tokens() {
        let recipients = parse_manual("a@x.com, nonsense, b@y.org");
        assert_eq!(recipients.len(), 2);
    }
}
