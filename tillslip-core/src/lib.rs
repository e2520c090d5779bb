//! tillslip-core: receipt entities, category configuration and spend analytics

pub mod book;
pub mod category;
pub mod error;
pub mod filter;
pub mod receipt;
pub mod stats;
pub mod time;

pub use book::ReceiptBook;
pub use category::{CategoryConfig, KeywordRule, MerchantCategorizer, DEFAULT_CATEGORY};
pub use error::{Error, Result};
pub use filter::{Period, ReceiptFilter};
pub use receipt::{
    LineItem, Receipt, ReceiptEdit, ReceiptId, MAX_ITEMS, SYNTHETIC_ITEM_NAME, UNKNOWN_MERCHANT,
};
pub use stats::{compute_stats, percent_change, StatsSnapshot, NO_BASELINE_PERCENT_CHANGE};
pub use time::{local_date, parse_timezone};
