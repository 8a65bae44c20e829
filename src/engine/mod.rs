//! Placeholder extraction and substitution engine.
//!
//! Templates mark substitution points with bracketed tokens (`[customer_name]`).
//! Tokens are user-typed, so the same logical variable may appear with
//! different casing or spacing across sessions. The engine resolves this by
//! canonicalizing at write-time (`normalize_template`) and matching tokens by
//! canonical name at read-time (`substitute`), so a variable has one stable
//! identity regardless of how it was typed.
//!
//! All functions here are pure and infallible; validation (duplicate names,
//! empty variable sets, incomplete bindings) lives with the callers.

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // Non-greedy, leftmost-first: the first `]` after each `[` closes the
    // token, so "[a][b]" yields the tokens "a" and "b".
    static ref TOKEN_RE: Regex = Regex::new(r"\[(.*?)\]").unwrap();
}

/// Canonical form of a raw placeholder token: lower-cased, spaces replaced
/// with underscores.
pub fn canonical_name(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_")
}

/// Extract the set of canonical variable names from template text.
///
/// Duplicates collapse; text with no bracketed tokens yields an empty set
/// (callers reject such text at creation time).
pub fn extract_variable_names(text: &str) -> BTreeSet<String> {
    TOKEN_RE
        .captures_iter(text)
        .map(|caps| canonical_name(&caps[1]))
        .collect()
}

/// Rewrite every placeholder occurrence to its canonical spelling, so
/// `[Name]` and `[NAME]` both become `[name]` throughout the text.
///
/// Idempotent; applied before template text is ever persisted.
pub fn normalize_template(text: &str) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures<'_>| {
            format!("[{}]", canonical_name(&caps[1]))
        })
        .into_owned()
}

/// Replace each bound placeholder with its value and return the new string.
///
/// Matching is by canonical token name, so `[Name]`, `[name]` and `[NAME]`
/// all match a binding keyed `name`. The text is scanned exactly once:
/// inserted values are never re-scanned for other keys. Keys without a
/// matching placeholder are ignored; placeholders without a binding are left
/// in place.
pub fn substitute(text: &str, bindings: &BTreeMap<String, String>) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures<'_>| {
            match bindings.get(&canonical_name(&caps[1])) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
