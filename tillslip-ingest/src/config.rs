//! Tunables for the text heuristics

use serde::{Deserialize, Serialize};

use crate::date::DateOrder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How to read ambiguous `NN/NN/YYYY` dates
    pub date_order: DateOrder,
    /// Lowercase substrings that mark a line as carrying the grand total
    pub total_keywords: Vec<String>,
    pub max_items: usize,
    /// How many leading lines may be considered for the merchant name
    pub merchant_scan_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            date_order: DateOrder::MonthFirst,
            total_keywords: ["total", "amount due", "balance", "grand total"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            max_items: tillslip_core::MAX_ITEMS,
            merchant_scan_lines: 5,
        }
    }
}
