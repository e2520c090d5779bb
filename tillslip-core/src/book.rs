//! The ordered receipt collection and its user-driven mutations

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::CategoryConfig;
use crate::error::{Error, Result};
use crate::receipt::{Receipt, ReceiptEdit, ReceiptId};

/// Receipts, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptBook {
    receipts: Vec<Receipt>,
}

impl ReceiptBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(receipts: Vec<Receipt>) -> Self {
        Self { receipts }
    }

    pub fn into_vec(self) -> Vec<Receipt> {
        self.receipts
    }

    pub fn as_slice(&self) -> &[Receipt] {
        &self.receipts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Receipt> {
        self.receipts.iter()
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    pub fn get(&self, id: ReceiptId) -> Option<&Receipt> {
        self.receipts.iter().find(|r| r.id == id)
    }

    /// Prepend a freshly built receipt.
    pub fn add(&mut self, receipt: Receipt) {
        debug!(id = %receipt.id, merchant = %receipt.merchant, "adding receipt");
        self.receipts.insert(0, receipt);
    }

    /// Apply a user edit and mark the receipt as manually edited.
    ///
    /// The edit is validated as a whole before anything changes.
    pub fn update(
        &mut self,
        id: ReceiptId,
        edit: ReceiptEdit,
        categories: &CategoryConfig,
    ) -> Result<&Receipt> {
        validate_edit(&edit, categories)?;

        let receipt = self
            .receipts
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::NotFound(id))?;

        if let Some(merchant) = edit.merchant {
            receipt.merchant = merchant.trim().to_string();
        }
        if let Some(date) = edit.date {
            receipt.date = date;
        }
        if let Some(total) = edit.total {
            receipt.total = total;
        }
        if let Some(category) = edit.category {
            receipt.category = category;
        }
        receipt.manually_edited = true;

        debug!(%id, "receipt edited");
        Ok(receipt)
    }

    pub fn delete(&mut self, id: ReceiptId) -> Result<Receipt> {
        let pos = self
            .receipts
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::NotFound(id))?;
        debug!(%id, "receipt deleted");
        Ok(self.receipts.remove(pos))
    }
}

fn validate_edit(edit: &ReceiptEdit, categories: &CategoryConfig) -> Result<()> {
    if let Some(merchant) = &edit.merchant {
        if merchant.trim().is_empty() {
            return Err(Error::InvalidEdit("merchant cannot be empty".into()));
        }
    }
    if let Some(total) = edit.total {
        if !total.is_finite() || total < 0.0 {
            return Err(Error::InvalidEdit(format!("total must be non-negative, got {total}")));
        }
    }
    if let Some(category) = &edit.category {
        if !categories.contains(category) {
            return Err(Error::InvalidEdit(format!(
                "unknown category {category:?} (expected one of: {})",
                categories.categories().join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::LineItem;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn receipt(id: u64, merchant: &str) -> Receipt {
        Receipt {
            id: ReceiptId(id),
            merchant: merchant.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            total: 18.25,
            items: vec![LineItem::synthetic(18.25)],
            category: "Other".to_string(),
            image: Some("receipt-1.jpg".to_string()),
            manually_edited: false,
            added_date: Utc.with_ymd_and_hms(2024, 5, 4, 18, 30, 0).unwrap(),
        }
    }

    fn book() -> ReceiptBook {
        let mut book = ReceiptBook::new();
        book.add(receipt(1, "Corner Store"));
        book.add(receipt(2, "Chevron 0091"));
        book
    }

    #[test]
    fn test_add_prepends() {
        let book = book();
        let ids: Vec<_> = book.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_update_marks_manual() {
        let mut book = book();
        let cats = CategoryConfig::basic();
        let edit = ReceiptEdit {
            merchant: Some("  Chevron  ".into()),
            total: Some(42.0),
            category: Some("Transport".into()),
            ..Default::default()
        };
        let updated = book.update(ReceiptId(2), edit, &cats).unwrap();
        assert_eq!(updated.merchant, "Chevron");
        assert_eq!(updated.total, 42.0);
        assert_eq!(updated.category, "Transport");
        assert!(updated.manually_edited);
        // untouched fields survive
        assert_eq!(updated.image.as_deref(), Some("receipt-1.jpg"));
        assert!(!book.get(ReceiptId(1)).unwrap().manually_edited);
    }

    #[test]
    fn test_update_rejects_invalid_edit_atomically() {
        let mut book = book();
        let cats = CategoryConfig::basic();
        let edit = ReceiptEdit {
            merchant: Some("Renamed".into()),
            category: Some("Groceries".into()),
            ..Default::default()
        };
        let err = book.update(ReceiptId(2), edit, &cats).unwrap_err();
        assert!(matches!(err, Error::InvalidEdit(_)));
        assert_eq!(book.get(ReceiptId(2)).unwrap().merchant, "Chevron 0091");

        let edit = ReceiptEdit {
            total: Some(-1.0),
            ..Default::default()
        };
        assert!(book.update(ReceiptId(2), edit, &cats).is_err());
    }

    #[test]
    fn test_update_unknown_id() {
        let mut book = book();
        let err = book
            .update(ReceiptId(99), ReceiptEdit::default(), &CategoryConfig::basic())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ReceiptId(99))));
    }

    #[test]
    fn test_delete() {
        let mut book = book();
        let removed = book.delete(ReceiptId(1)).unwrap();
        assert_eq!(removed.merchant, "Corner Store");
        assert_eq!(book.len(), 1);
        assert!(book.delete(ReceiptId(1)).is_err());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let json = serde_json::to_value(book()).unwrap();
        assert!(json.is_array());
        let back: ReceiptBook = serde_json::from_value(json).unwrap();
        assert_eq!(back, book());
    }
}
