//! Assemble a [`Receipt`] from recognized text or from a structured AI payload.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use tillslip_core::{
    local_date, CategoryConfig, LineItem, MerchantCategorizer, Receipt, ReceiptId, Result,
    UNKNOWN_MERCHANT,
};
use tillslip_ingest::{
    detect_merchant, extract_items, parse_structured, prepare_lines, resolve_date, resolve_total,
    ExtractionConfig, StructuredReceipt,
};

use crate::id::IdGenerator;

/// Name given to structured items that arrive without one
const UNNAMED_ITEM: &str = "Item";

/// What a scan produced, before any field has been interpreted
#[derive(Debug, Clone, PartialEq)]
pub enum ScanInput {
    /// Raw OCR text; fields are recovered heuristically
    RawText { text: String, image: Option<String> },
    /// A completion response carrying a JSON receipt, possibly wrapped in prose
    StructuredPayload { response: String, image: Option<String> },
}

impl ScanInput {
    pub fn raw_text(text: impl Into<String>) -> Self {
        ScanInput::RawText {
            text: text.into(),
            image: None,
        }
    }

    pub fn structured(response: impl Into<String>) -> Self {
        ScanInput::StructuredPayload {
            response: response.into(),
            image: None,
        }
    }

    /// Attach the caller's image reference; it is carried through untouched.
    pub fn with_image(self, image: impl Into<String>) -> Self {
        let image = Some(image.into());
        match self {
            ScanInput::RawText { text, .. } => ScanInput::RawText { text, image },
            ScanInput::StructuredPayload { response, .. } => {
                ScanInput::StructuredPayload { response, image }
            }
        }
    }
}

#[derive(Debug)]
pub struct ReceiptBuilder {
    categorizer: MerchantCategorizer,
    extraction: ExtractionConfig,
    timezone: Tz,
    ids: IdGenerator,
}

impl Default for ReceiptBuilder {
    fn default() -> Self {
        Self::new(CategoryConfig::default(), ExtractionConfig::default())
    }
}

impl ReceiptBuilder {
    pub fn new(categories: CategoryConfig, extraction: ExtractionConfig) -> Self {
        Self {
            categorizer: MerchantCategorizer::new(categories),
            extraction,
            timezone: Tz::UTC,
            ids: IdGenerator::new(),
        }
    }

    /// Timezone that decides the default (processing) date.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn categorizer(&self) -> &MerchantCategorizer {
        &self.categorizer
    }

    pub fn extraction(&self) -> &ExtractionConfig {
        &self.extraction
    }

    /// Keep new ids above everything already stored.
    pub fn advance_ids_past(&self, id: ReceiptId) {
        self.ids.advance_past(id);
    }

    pub fn build(&self, input: ScanInput) -> Result<Receipt> {
        self.build_at(input, Utc::now())
    }

    /// Build with an explicit creation time.
    ///
    /// The text path never fails. The structured path fails with
    /// `Error::MalformedResponse` when no JSON receipt can be parsed.
    pub fn build_at(&self, input: ScanInput, now: DateTime<Utc>) -> Result<Receipt> {
        match input {
            ScanInput::RawText { text, image } => Ok(self.from_text(&text, image, now)),
            ScanInput::StructuredPayload { response, image } => {
                let payload = parse_structured(&response)?;
                Ok(self.from_structured(payload, image, now))
            }
        }
    }

    fn from_text(&self, text: &str, image: Option<String>, now: DateTime<Utc>) -> Receipt {
        let lines = prepare_lines(text);
        debug!(lines = lines.len(), "building receipt from text");

        let merchant = detect_merchant(&lines, self.extraction.merchant_scan_lines)
            .unwrap_or(UNKNOWN_MERCHANT)
            .to_string();
        let date = resolve_date(&lines, self.extraction.date_order)
            .unwrap_or_else(|| self.today(now));
        let total = resolve_total(&lines, &self.extraction.total_keywords);
        let items = extract_items(&lines, total.value, self.extraction.max_items);
        let category = self.categorizer.categorize(&merchant).to_string();

        debug!(%merchant, %date, total = total.value, source = ?total.source, %category, "text receipt assembled");

        Receipt {
            id: self.ids.next_id(now),
            merchant,
            date,
            total: total.value,
            items,
            category,
            image,
            manually_edited: false,
            added_date: now,
        }
    }

    fn from_structured(
        &self,
        payload: StructuredReceipt,
        image: Option<String>,
        now: DateTime<Utc>,
    ) -> Receipt {
        let merchant = payload
            .merchant
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(UNKNOWN_MERCHANT)
            .to_string();

        let date = payload
            .parsed_date(self.extraction.date_order)
            .unwrap_or_else(|| {
                if let Some(raw) = &payload.date {
                    warn!(date = %raw, "unreadable date in structured receipt, using today");
                }
                self.today(now)
            });

        let total = payload
            .total
            .filter(|t| t.is_finite())
            .unwrap_or(0.0)
            .max(0.0);

        let mut items: Vec<LineItem> = payload
            .items
            .unwrap_or_default()
            .into_iter()
            .take(self.extraction.max_items)
            .map(|item| {
                let name = item
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(UNNAMED_ITEM)
                    .to_string();
                let price = item.price.filter(|p| p.is_finite()).unwrap_or(0.0);
                let quantity = item
                    .quantity
                    .filter(|q| q.is_finite() && *q >= 1.0)
                    .map(|q| q.round() as u32)
                    .unwrap_or(1);
                LineItem::new(name, price, quantity)
            })
            .collect();
        if items.is_empty() && total > 0.0 {
            items.push(LineItem::synthetic(total));
        }

        let category = match payload.category.as_deref() {
            Some(label) => {
                let resolved = self.categorizer.resolve(label);
                if !resolved.eq_ignore_ascii_case(label.trim()) {
                    warn!(category = %label, fallback = %resolved, "unrecognized category in structured receipt");
                }
                resolved.to_string()
            }
            None => self.categorizer.resolve("").to_string(),
        };

        debug!(%merchant, %date, total, %category, items = items.len(), "structured receipt assembled");

        Receipt {
            id: self.ids.next_id(now),
            merchant,
            date,
            total,
            items,
            category,
            image,
            manually_edited: false,
            added_date: now,
        }
    }

    fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        local_date(now, self.timezone)
    }
}
