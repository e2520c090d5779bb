//! Display filters over a receipt collection

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::receipt::Receipt;

/// Date window relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    /// Dated at most 7 days before today (future dates included)
    Week,
    /// Same calendar month and year as today
    Month,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Period::All),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(format!("unknown period: {other} (expected all, week or month)")),
        }
    }
}

impl Period {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Period::All => true,
            Period::Week => (today - date).num_days() <= 7,
            Period::Month => date.year() == today.year() && date.month() == today.month(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptFilter {
    /// Exact category label; `None` matches every category
    pub category: Option<String>,
    /// Case-insensitive substring of the merchant or any item name
    pub search: Option<String>,
    pub period: Period,
}

impl ReceiptFilter {
    pub fn matches(&self, receipt: &Receipt, today: NaiveDate) -> bool {
        if let Some(category) = &self.category {
            if &receipt.category != category {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() && !receipt.mentions(&search.to_lowercase()) {
                return false;
            }
        }
        self.period.contains(receipt.date, today)
    }

    /// Matching receipts, in collection order
    pub fn apply<'a>(&self, receipts: &'a [Receipt], today: NaiveDate) -> Vec<&'a Receipt> {
        receipts
            .iter()
            .filter(|r| self.matches(r, today))
            .collect()
    }
}
