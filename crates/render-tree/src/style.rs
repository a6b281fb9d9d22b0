use std::collections::BTreeMap;

use cssparser::{Parser, ParserInput, Token};
use serde::{Deserialize, Serialize};

/// Resolved style values keyed by lowercase property name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct ComputedStyle {
    values: BTreeMap<String, String>,
}

impl ComputedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: &str, value: &str) -> Self {
        self.insert(property, value);
        self
    }

    pub fn insert(&mut self, property: &str, value: &str) {
        self.values
            .insert(property.trim().to_ascii_lowercase(), value.to_string());
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.values
            .get(&property.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Trimmed, lowercased keyword value, or `""` when unset.
    pub fn keyword(&self, property: &str) -> String {
        self.get(property)
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<BTreeMap<String, String>> for ComputedStyle {
    fn from(values: BTreeMap<String, String>) -> Self {
        let mut style = ComputedStyle::new();
        for (key, value) in values {
            style.insert(&key, &value);
        }
        style
    }
}

impl From<ComputedStyle> for BTreeMap<String, String> {
    fn from(style: ComputedStyle) -> Self {
        style.values
    }
}

/// Leading number of a length, percentage or bare number value, read
/// with the CSS tokenizer. Returns `None` when the value does not start with
/// a number (`auto`, `""`).
pub fn parse_css_float(raw: &str) -> Option<f64> {
    let mut input = ParserInput::new(raw);
    let mut parser = Parser::new(&mut input);
    match parser.next().ok()? {
        Token::Number { value, .. } | Token::Dimension { value, .. } => Some(f64::from(*value)),
        Token::Percentage { unit_value, .. } => Some(f64::from(*unit_value) * 100.0),
        _ => None,
    }
}
