//! URL formulas and the line-preserving merge for tier env files.
//!
//! The merge only touches lines that assign one of the managed keys. Every
//! other byte of the file (comments, blank lines, unrelated variables, line
//! terminators) is carried over untouched, so running the merge twice with
//! the same inputs yields identical text.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::EnvTier;

/// Public origin of the app itself.
pub const APP_URL: &str = "APP_URL";
/// Auth callback origin; always equals `APP_URL`.
pub const AUTH_URL: &str = "AUTH_URL";
/// Origin of the backend sibling (or the app itself).
pub const API_URL: &str = "API_URL";

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*(?:export\s+)?)([A-Za-z_][A-Za-z0-9_]*)(\s*=\s*)(.*)$").unwrap()
});

/// `APP_URL` for a tier.
///
/// - production: `https://{project}.{domain}`
/// - staging: `https://{project}-env-staging-{team}.{domain}`
/// - preview: `https://{project}-{team}.{domain}`
pub fn tier_app_url(tier: EnvTier, project: &str, team_slug: &str, domain: &str) -> String {
    match tier {
        EnvTier::Production => format!("https://{project}.{domain}"),
        EnvTier::Staging => format!("https://{project}-env-staging-{team_slug}.{domain}"),
        EnvTier::Preview => format!("https://{project}-{team_slug}.{domain}"),
    }
}

/// The three managed assignments for one tier, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedValues {
    pub app_url: String,
    pub auth_url: String,
    pub api_url: String,
}

impl ManagedValues {
    /// Values for an app whose API origin is `api_url` (or itself when `None`).
    pub fn new(app_url: String, api_url: Option<String>) -> Self {
        Self {
            auth_url: app_url.clone(),
            api_url: api_url.unwrap_or_else(|| app_url.clone()),
            app_url,
        }
    }

    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (APP_URL, self.app_url.as_str()),
            (AUTH_URL, self.auth_url.as_str()),
            (API_URL, self.api_url.as_str()),
        ]
    }
}

/// True if `key` assigns the managed `name`, bare or under a public prefix.
pub fn is_managed_key(key: &str, name: &str, prefixes: &[String]) -> bool {
    key == name
        || prefixes
            .iter()
            .any(|prefix| key.strip_prefix(prefix.as_str()) == Some(name))
}

/// Merge managed assignments into existing env text.
///
/// Existing assignments (including prefixed and `export` forms) are rewritten
/// in place; keys that never appear are appended as `KEY=VALUE` lines.
pub fn merge_env(original: &str, values: &[(&str, &str)], prefixes: &[String]) -> String {
    let mut out = String::with_capacity(original.len() + 128);
    let mut seen = vec![false; values.len()];

    for segment in original.split_inclusive('\n') {
        let (body, terminator) = split_terminator(segment);
        let replaced = ASSIGNMENT_RE.captures(body).and_then(|caps| {
            let key = caps.get(2)?.as_str();
            let idx = values
                .iter()
                .position(|(name, _)| is_managed_key(key, name, prefixes))?;
            seen[idx] = true;
            Some(format!(
                "{}{}{}{}",
                &caps[1],
                key,
                &caps[3],
                requote(&caps[4], values[idx].1)
            ))
        });
        match replaced {
            Some(line) => {
                out.push_str(&line);
                out.push_str(terminator);
            }
            None => out.push_str(segment),
        }
    }

    for ((name, value), present) in values.iter().zip(&seen) {
        if *present {
            continue;
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(name);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }

    out
}

/// Read the value assigned to `name` (bare key wins over prefixed forms).
pub fn read_env_value(text: &str, name: &str, prefixes: &[String]) -> Option<String> {
    let mut prefixed = None;
    for line in text.lines() {
        let Some(caps) = ASSIGNMENT_RE.captures(line) else {
            continue;
        };
        let key = &caps[2];
        if key == name {
            return non_empty(unquote(&caps[4]));
        }
        if prefixed.is_none() && is_managed_key(key, name, prefixes) {
            prefixed = non_empty(unquote(&caps[4]));
        }
    }
    prefixed
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn split_terminator(segment: &str) -> (&str, &str) {
    if let Some(body) = segment.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = segment.strip_suffix('\n') {
        (body, "\n")
    } else {
        (segment, "")
    }
}

fn quote_char(raw: &str) -> Option<char> {
    let raw = raw.trim_end();
    ['"', '\''].into_iter().find(|q| {
        raw.len() >= 2 && raw.starts_with(*q) && raw.ends_with(*q)
    })
}

fn requote(old: &str, new: &str) -> String {
    match quote_char(old) {
        Some(q) => format!("{q}{new}{q}"),
        None => new.to_string(),
    }
}

fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim_end();
    match quote_char(trimmed) {
        Some(_) => &trimmed[1..trimmed.len() - 1],
        None => trimmed,
    }
}
