//! Placeholder substitution for email templates.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap();
}

/// Replaces `{{key}}` markers with values from `vars`.
///
/// Unknown placeholders are left in place so a typo in a template is
/// visible in the delivered mail instead of disappearing silently.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            match vars.get(key) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Builds the standard variable map for a single recipient.
pub fn recipient_vars(name: &str, email: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("name".to_string(), name.to_string());
    vars.insert("email".to_string(), email.to_string());
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_known_placeholders() {
        let vars = recipient_vars("Jane", "jane@example.com");
        let out = render("Dear {{name}}, we wrote to {{email}}.", &vars);
        assert_eq!(out, "Dear Jane, we wrote to jane@example.com.");
    }

    #[test]
    fn test_render_tolerates_inner_spaces() {
        let vars = recipient_vars("Jane", "jane@example.com");
        assert_eq!(render("Hi {{ name }}!", &vars), "Hi Jane!");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let vars = recipient_vars("Jane", "jane@example.com");
        assert_eq!(render("Code: {{code}}", &vars), "Code: {{code}}");
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let vars = recipient_vars("Jane", "jane@example.com");
        assert_eq!(render("{{name}} {{name}}", &vars), "Jane Jane");
    }

    #[test]
    fn test_render_no_placeholders_is_identity() {
        let vars = HashMap::new();
        assert_eq!(render("plain text", &vars), "plain text");
    }
}
