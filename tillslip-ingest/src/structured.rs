//! Structured payloads from an AI completion.
//!
//! Models often wrap the JSON in a code fence or preface it with prose, so the
//! object is located by its outermost braces before parsing.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use tillslip_core::{Error, Result};

use crate::amount::parse_amount;
use crate::date::{date_in_line, DateOrder};

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").expect("code fence pattern"));

/// Receipt fields exactly as the model supplied them
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StructuredReceipt {
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: Option<f64>,
    #[serde(default)]
    pub items: Option<Vec<StructuredItem>>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StructuredItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: Option<f64>,
}

impl StructuredReceipt {
    /// ISO date first, then any shape the line heuristics understand.
    pub fn parsed_date(&self, order: DateOrder) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| date_in_line(raw, order))
    }
}

/// Accepts `12.5`, `"12.50"` and `"$1,012.50"`; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(&s),
        _ => None,
    }))
}

/// Remove markdown code fence markers (```json ... ```), keeping whatever
/// shares a line with them.
pub fn strip_code_fences(response: &str) -> String {
    CODE_FENCE_RE.replace_all(response, "").into_owned()
}

/// The span from the first `{` to the last `}`.
pub fn extract_json_object(response: &str) -> Result<&str> {
    let start = response.find('{');
    let end = response.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::MalformedResponse(format!(
            "no JSON object found | raw: {}",
            truncate(response, 200)
        ))),
    }
}

/// Locate and parse the receipt object in a completion response.
pub fn parse_structured(response: &str) -> Result<StructuredReceipt> {
    let cleaned = strip_code_fences(response.trim());
    let json = extract_json_object(&cleaned)?;
    serde_json::from_str(json).map_err(|e| {
        Error::MalformedResponse(format!("invalid receipt JSON: {e} | raw: {}", truncate(json, 200)))
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
