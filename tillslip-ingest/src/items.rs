//! Line item extraction.
//!
//! Every line whose last amount is positive and not above the grand total is
//! a candidate: the text before that amount becomes the item name. Subtotal,
//! tax and total lines usually survive this filter and are then dropped by
//! price deduplication against the real items.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use tillslip_core::LineItem;

use crate::amount::last_amount;

static QUANTITY_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+\s*x?\s*").expect("quantity prefix pattern"));

static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*x").expect("quantity pattern"));

static NAME_NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s\-']").expect("name noise pattern"));

/// Item names must be longer than this...
const MIN_NAME_CHARS: usize = 2;
/// ...and shorter than this
const MAX_NAME_CHARS: usize = 50;

/// Prices below this are never collapsed by deduplication
const DEDUP_PRICE_FLOOR: f64 = 1.0;

/// Candidate items in detection order, before deduplication.
pub fn candidate_items<S: AsRef<str>>(lines: &[S], total: f64) -> Vec<LineItem> {
    lines
        .iter()
        .filter_map(|line| candidate_from_line(line.as_ref(), total))
        .collect()
}

fn candidate_from_line(line: &str, total: f64) -> Option<LineItem> {
    let token = last_amount(line)?;
    if token.value <= 0.0 || token.value > total {
        return None;
    }

    let name = item_name(&line[..token.start])?;
    let quantity = QUANTITY_RE
        .captures(line)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .unwrap_or(1);

    Some(LineItem::new(name, token.value, quantity))
}

/// Strip a leading quantity, replace punctuation with spaces and trim.
fn item_name(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim();
    let without_qty = QUANTITY_PREFIX_RE.replace(trimmed, "");
    let cleaned = NAME_NOISE_RE.replace_all(&without_qty, " ");
    let name = cleaned.trim();

    let len = name.chars().count();
    (len > MIN_NAME_CHARS && len < MAX_NAME_CHARS).then(|| name.to_string())
}

/// Keep an item unless its price was already seen and is at least one dollar,
/// then cap the list.
pub fn dedup_items(items: Vec<LineItem>, max_items: usize) -> Vec<LineItem> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut out = Vec::with_capacity(items.len().min(max_items));

    for item in items {
        let cents = item.price_cents();
        let repeated = seen.contains(&cents);
        seen.insert(cents);
        if repeated && item.price >= DEDUP_PRICE_FLOOR {
            debug!(name = %item.name, price = item.price, "dropping duplicate-priced item");
            continue;
        }
        out.push(item);
    }

    out.truncate(max_items);
    out
}

/// Full item pass: candidates, synthetic fallback, dedup, cap.
pub fn extract_items<S: AsRef<str>>(lines: &[S], total: f64, max_items: usize) -> Vec<LineItem> {
    let mut items = candidate_items(lines, total);
    if items.is_empty() && total > 0.0 {
        items.push(LineItem::synthetic(total));
    }
    let items = dedup_items(items, max_items);
    debug!(count = items.len(), "line items extracted");
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillslip_core::{MAX_ITEMS, SYNTHETIC_ITEM_NAME};

    #[test]
    fn test_basic_line() {
        let items = candidate_items(&["Coffee 4.50"], 4.50);
        assert_eq!(items, vec![LineItem::new("Coffee", 4.50, 1)]);
    }

    #[test]
    fn test_rejects_price_above_total() {
        let items = candidate_items(&["Cash 20.00", "Bagel 2.25"], 5.00);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Bagel");
    }

    #[test]
    fn test_rejects_zero_price_and_bad_names() {
        let too_long = format!("{} 1.00", "n".repeat(50));
        let lines = ["Free Refill 0.00", "AB 1.00", "12 1.00", too_long.as_str()];
        assert!(candidate_items(&lines, 10.0).is_empty());
    }

    #[test]
    fn test_quantity_prefix_and_quantity() {
        let items = candidate_items(&["2 x Bagel 3.00"], 10.0);
        assert_eq!(items, vec![LineItem::new("Bagel", 3.00, 2)]);

        let items = candidate_items(&["Eggs Large 3x 5.97"], 10.0);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].name, "Eggs Large 3x");
    }

    #[test]
    fn test_quantity_glued_to_unit_price() {
        let items = candidate_items(&["Soda 2x1.99 3.98"], 10.0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].price, 3.98);
    }

    #[test]
    fn test_punctuation_replaced() {
        let items = candidate_items(&["Ben&Jerry's* 5.49"], 10.0);
        assert_eq!(items[0].name, "Ben Jerry's");
    }

    #[test]
    fn test_dedup_by_price() {
        let items = vec![
            LineItem::new("Coffee", 4.50, 1),
            LineItem::new("TOTAL", 4.50, 1),
            LineItem::new("Gum", 0.99, 1),
            LineItem::new("Mints", 0.99, 1),
        ];
        let out = dedup_items(items, MAX_ITEMS);
        let names: Vec<_> = out.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Coffee", "Gum", "Mints"]);
    }

    #[test]
    fn test_cap_preserves_order() {
        let items: Vec<_> = (1..=30)
            .map(|i| LineItem::new(format!("Item {i}"), i as f64, 1))
            .collect();
        let out = dedup_items(items, MAX_ITEMS);
        assert_eq!(out.len(), 20);
        assert_eq!(out[0].name, "Item 1");
        assert_eq!(out[19].name, "Item 20");
    }

    #[test]
    fn test_synthetic_purchase() {
        let items = extract_items(&["THANK YOU", "TOTAL $25.00"], 25.0, MAX_ITEMS);
        // "THANK YOU" has no amount; the TOTAL line itself is a candidate
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "TOTAL");

        let items = extract_items(&["$25.00"], 25.0, MAX_ITEMS);
        assert_eq!(items, vec![LineItem::new(SYNTHETIC_ITEM_NAME, 25.0, 1)]);

        assert!(extract_items(&["nothing here"], 0.0, MAX_ITEMS).is_empty());
    }

    #[test]
    fn test_never_exceeds_total() {
        let lines = ["Steak 32.00", "Wine 48.00", "Salad 9.50", "TOTAL 41.50"];
        let items = extract_items(&lines, 41.50, MAX_ITEMS);
        assert!(items.iter().all(|i| i.price <= 41.50));
        assert_eq!(items.len(), 3);
    }
}
