//! tillslip-ingest: heuristic field extraction from OCR text, plus parsing of
//! structured AI transcriptions.

pub mod amount;
pub mod config;
pub mod date;
pub mod items;
pub mod lines;
pub mod structured;
pub mod total;

pub use amount::{find_amounts, last_amount, parse_amount, AmountToken};
pub use config::ExtractionConfig;
pub use date::{date_in_line, resolve_date, DateOrder};
pub use items::{candidate_items, dedup_items, extract_items};
pub use lines::{detect_merchant, prepare_lines};
pub use structured::{parse_structured, StructuredItem, StructuredReceipt};
pub use total::{resolve_total, ResolvedTotal, TotalSource};
