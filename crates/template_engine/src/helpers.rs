//! Custom Handlebars helpers for webhook message templates.
//!
//! Webhook payloads are loosely typed: fields that a template references may be
//! `null` or missing entirely. Every text helper therefore accepts any JSON
//! value and treats `null` as an empty string instead of failing the render.

use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod tests;

/// Marker appended to text cut short by the `truncate` helper.
pub const ELLIPSIS: char = '…';

/// Number of characters kept by the `short_sha` helper.
pub const SHORT_SHA_LENGTH: usize = 7;

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Shortens `text` to at most `max` characters, ending in [`ELLIPSIS`] when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    if max == 0 {
        return String::new();
    }

    let mut shortened: String = text.chars().take(max - 1).collect();
    shortened.push(ELLIPSIS);
    shortened
}

/// Strips the `refs/heads/` or `refs/tags/` prefix from a git ref.
pub fn short_ref(git_ref: &str) -> &str {
    git_ref
        .strip_prefix("refs/heads/")
        .or_else(|| git_ref.strip_prefix("refs/tags/"))
        .unwrap_or(git_ref)
}

handlebars_helper!(short_sha: |sha: Json| as_text(sha).chars().take(SHORT_SHA_LENGTH).collect::<String>());

handlebars_helper!(ref_name: |git_ref: Json| short_ref(&as_text(git_ref)).to_string());

handlebars_helper!(first_line: |text: Json| as_text(text).lines().next().unwrap_or("").trim_end().to_string());

handlebars_helper!(truncate: |text: Json, max: u64| truncate_chars(&as_text(text), max as usize));

handlebars_helper!(count: |items: Json| match items {
    Value::Array(values) => values.len(),
    Value::Object(map) => map.len(),
    _ => 0,
});

handlebars_helper!(lower_case: |text: Json| as_text(text).to_lowercase());

handlebars_helper!(upper_case: |text: Json| as_text(text).to_uppercase());

// Picks the first non-blank value; Grafana's legacy and unified alert formats
// put the same information under different keys.
handlebars_helper!(or_default: |value: Json, fallback: Json| if is_blank(value) {
    fallback.clone()
} else {
    value.clone()
});

// GitHub reports a merged pull request as action "closed" with merged=true.
handlebars_helper!(pr_action: |action: Json, merged: Json| {
    let action = as_text(action);
    if action == "closed" && merged.as_bool() == Some(true) {
        "merged".to_string()
    } else {
        action
    }
});

/// Registers every message helper on `handlebars`.
pub fn register_helpers(handlebars: &mut Handlebars<'static>) {
    handlebars.register_helper("short_sha", Box::new(short_sha));
    handlebars.register_helper("ref_name", Box::new(ref_name));
    handlebars.register_helper("first_line", Box::new(first_line));
    handlebars.register_helper("truncate", Box::new(truncate));
    handlebars.register_helper("count", Box::new(count));
    handlebars.register_helper("lower_case", Box::new(lower_case));
    handlebars.register_helper("upper_case", Box::new(upper_case));
    handlebars.register_helper("default", Box::new(or_default));
    handlebars.register_helper("pr_action", Box::new(pr_action));
}
