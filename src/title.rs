//! Conventional-commit title validation.
//!
//! A title is accepted when the text before its first colon is one of the
//! configured prefix tokens, optionally followed by a non-empty scope in
//! parentheses, and the text after the colon is long enough.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

/// Prefix tokens accepted when no configuration overrides them.
pub const DEFAULT_PREFIXES: &[&str] = &[
    "feat", "fix", "chore", "docs", "style", "refactor", "perf", "test", "build", "ci", "revert",
];

/// Minimum number of characters after the colon.
pub const DEFAULT_MIN_BODY_LEN: usize = 6;

/// Title validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    /// The title was empty or absent.
    #[error("Title is empty. Provide a PR title such as 'feat: add widget'")]
    EmptyInput,

    /// No colon separates the prefix from the message.
    #[error("Title '{0}' is missing the ':' separator after its prefix")]
    MissingColon(String),

    /// The text before the colon is not a known prefix.
    #[error("Unknown prefix '{found}'. Valid prefixes: {valid}{}", hint_suffix(.hint))]
    UnknownPrefix {
        /// Text found before the colon.
        found: String,
        /// Comma-joined list of valid tokens.
        valid: String,
        /// A valid token that the found text starts with or contains.
        hint: Option<String>,
    },

    /// A scope was given as `()`.
    #[error("Scope of prefix '{0}' is empty. Remove the parentheses or name a scope")]
    EmptyScope(String),

    /// The prefix region contains whitespace.
    #[error("Prefix '{0}' must not contain whitespace")]
    WhitespaceInPrefix(String),

    /// The message after the colon is too short.
    #[error("Message after the prefix is {actual} characters long, at least {min} required")]
    MessageTooShort {
        /// Characters found after the colon.
        actual: usize,
        /// Configured minimum.
        min: usize,
    },

    /// The prefix region contains an uppercase character.
    #[error("Prefix '{0}' must be lowercase")]
    UppercaseInPrefix(String),
}

impl TitleError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TitleError::EmptyInput => ErrorKind::Input,
            _ => ErrorKind::Format,
        }
    }
}

/// Rules a title is validated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleRules {
    /// Ordered set of valid prefix tokens.
    pub prefixes: Vec<String>,
    /// Minimum message length after the colon.
    pub min_body_len: usize,
    /// Accepts a `!` breaking-change marker right before the colon.
    pub allow_breaking_marker: bool,
}

impl Default for TitleRules {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            min_body_len: DEFAULT_MIN_BODY_LEN,
            allow_breaking_marker: false,
        }
    }
}

/// A title that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleCheck {
    /// Matched prefix token.
    pub prefix: String,
    /// Scope given in parentheses, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Whether the `!` breaking-change marker was present.
    pub breaking: bool,
    /// Everything after the colon.
    pub body: String,
}

/// Validates `title` against `rules`.
pub fn validate_title(title: &str, rules: &TitleRules) -> Result<TitleCheck, TitleError> {
    if title.trim().is_empty() {
        return Err(TitleError::EmptyInput);
    }

    let (region, body) = title
        .split_once(':')
        .ok_or_else(|| TitleError::MissingColon(title.to_string()))?;
    tracing::debug!("Prefix region {region:?}, body {body:?}");

    if region.chars().any(char::is_whitespace) {
        return Err(TitleError::WhitespaceInPrefix(region.to_string()));
    }
    if region.chars().any(char::is_uppercase) {
        return Err(TitleError::UppercaseInPrefix(region.to_string()));
    }

    let (head, breaking) = match region.strip_suffix('!') {
        Some(head) if rules.allow_breaking_marker => (head, true),
        _ => (region, false),
    };
    let (token, scope) = split_scope(head).ok_or_else(|| unknown_prefix(region, rules))?;

    if !rules.prefixes.iter().any(|p| p == token) {
        return Err(unknown_prefix(region, rules));
    }
    if scope == Some("") {
        return Err(TitleError::EmptyScope(token.to_string()));
    }

    let actual = body.chars().count();
    if actual < rules.min_body_len {
        return Err(TitleError::MessageTooShort {
            actual,
            min: rules.min_body_len,
        });
    }

    Ok(TitleCheck {
        prefix: token.to_string(),
        scope: scope.map(str::to_string),
        breaking,
        body: body.to_string(),
    })
}

/// Splits `token(scope)` into its parts. Returns `None` for unbalanced or
/// trailing parentheses.
fn split_scope(head: &str) -> Option<(&str, Option<&str>)> {
    match head.split_once('(') {
        None if head.contains(')') => None,
        None => Some((head, None)),
        Some((token, rest)) => {
            let scope = rest.strip_suffix(')')?;
            if scope.contains(['(', ')']) {
                return None;
            }
            Some((token, Some(scope)))
        }
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!(" (did you mean '{h}'?)"))
        .unwrap_or_default()
}

fn unknown_prefix(region: &str, rules: &TitleRules) -> TitleError {
    let hint = rules
        .prefixes
        .iter()
        .find(|p| region.starts_with(p.as_str()))
        .or_else(|| rules.prefixes.iter().find(|p| region.contains(p.as_str())))
        .cloned();

    TitleError::UnknownPrefix {
        found: region.to_string(),
        valid: rules.prefixes.join(", "),
        hint,
    }
}
