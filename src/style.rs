//! Shorthand style tokens
//!
//! Style bodies are `;`-separated shorthand tokens such as `bg blue` or `rd 8`.
//! A [`StyleResolver`] maps each token to a CSS-like declaration; tokens it does
//! not understand are reported as warnings by the caller.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Resolved styles of a template, keyed by property name
pub type StyleMap = BTreeMap<String, String>;

/// A single resolved `key: value` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleDeclaration {
    pub key: String,
    pub value: String,
}

impl StyleDeclaration {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Maps a shorthand token to a declaration, or `None` when unsupported
pub trait StyleResolver {
    fn resolve(&self, token: &str) -> Option<StyleDeclaration>;
}

impl<F> StyleResolver for F
where
    F: Fn(&str) -> Option<StyleDeclaration>,
{
    fn resolve(&self, token: &str) -> Option<StyleDeclaration> {
        self(token)
    }
}

static NUMBER_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());
static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?%$").unwrap());
static CSS_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-zA-Z-]+)\s+(.+)$").unwrap());

/// Class names that may be used as bare tokens
const CLASS_TOKENS: &[&str] = &["tab", "card", "label"];

/// Built-in shorthand dictionary
///
/// | token        | result                       |
/// |--------------|------------------------------|
/// | `bg <v>`     | `background-color: <v>`      |
/// | `rd <n>`     | `border-radius: <n>px`       |
/// | `tab`        | `class: tab`                 |
/// | `50`         | `width: 50%`                 |
/// | `50%`        | `width: 50%`                 |
/// | `<key> <v>`  | `<key>: <v>`                 |
#[derive(Debug, Clone, Copy, Default)]
pub struct ShorthandResolver;

impl StyleResolver for ShorthandResolver {
    fn resolve(&self, token: &str) -> Option<StyleDeclaration> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut words = trimmed.split_whitespace();
        let head = words.next()?;
        let rest = words.collect::<Vec<_>>().join(" ");

        if head == "bg" && !rest.is_empty() {
            return Some(StyleDeclaration::new("background-color", rest));
        }

        if head == "rd" && !rest.is_empty() {
            return Some(StyleDeclaration::new("border-radius", ensure_px(&rest)));
        }

        if CLASS_TOKENS.contains(&head) {
            return Some(StyleDeclaration::new("class", head));
        }

        if NUMBER_ONLY.is_match(trimmed) {
            return Some(StyleDeclaration::new("width", format!("{}%", trimmed)));
        }

        if PERCENT.is_match(trimmed) {
            return Some(StyleDeclaration::new("width", trimmed));
        }

        CSS_LIKE
            .captures(trimmed)
            .map(|caps| StyleDeclaration::new(&caps[1], &caps[2]))
    }
}

/// Bare numbers become pixel lengths
fn ensure_px(value: &str) -> String {
    if NUMBER_ONLY.is_match(value) {
        format!("{}px", value)
    } else {
        value.to_string()
    }
}

/// Split a style body on `;` into trimmed, non-empty tokens
pub fn split_tokens(body: &str) -> Vec<String> {
    body.split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
