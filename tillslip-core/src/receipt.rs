//! Receipt entity types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on line items kept per receipt
pub const MAX_ITEMS: usize = 20;

/// Merchant used when no header line qualifies
pub const UNKNOWN_MERCHANT: &str = "Unknown Store";

/// Name of the single item synthesized when only a total was found
pub const SYNTHETIC_ITEM_NAME: &str = "Purchase";

/// Creation-time-derived identifier (milliseconds since the epoch, strictly increasing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(pub u64);

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReceiptId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ReceiptId)
    }
}

/// One purchased good or service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub name: String,
    /// Non-negative, two-decimal currency value
    pub price: f64,
    /// Always at least 1
    pub quantity: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price: price.max(0.0),
            quantity: quantity.max(1),
        }
    }

    /// The single item standing in for the whole purchase
    pub fn synthetic(total: f64) -> Self {
        Self::new(SYNTHETIC_ITEM_NAME, total, 1)
    }

    /// Price in whole cents, used as the dedup key
    pub fn price_cents(&self) -> i64 {
        (self.price * 100.0).round() as i64
    }
}

/// A structured, de-duplicated expense record
///
/// Persisted with camelCase keys (`manuallyEdited`, `addedDate`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: ReceiptId,
    pub merchant: String,
    /// Purchase date (serialized as YYYY-MM-DD)
    pub date: NaiveDate,
    pub total: f64,
    /// Detection order, at most [`MAX_ITEMS`]
    pub items: Vec<LineItem>,
    /// Always a member of the configured category set
    pub category: String,
    /// Opaque image reference owned by the caller; passed through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub manually_edited: bool,
    pub added_date: DateTime<Utc>,
}

impl Receipt {
    /// Case-insensitive match against the merchant and every item name.
    /// `needle` must already be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        self.merchant.to_lowercase().contains(needle)
            || self
                .items
                .iter()
                .any(|item| item.name.to_lowercase().contains(needle))
    }
}

/// A user edit; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReceiptEdit {
    pub merchant: Option<String>,
    pub date: Option<NaiveDate>,
    pub total: Option<f64>,
    pub category: Option<String>,
}

impl ReceiptEdit {
    pub fn is_empty(&self) -> bool {
        self.merchant.is_none()
            && self.date.is_none()
            && self.total.is_none()
            && self.category.is_none()
    }
}
