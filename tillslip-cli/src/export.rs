use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use tillslip_core::Receipt;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: u64,
    date: String,
    merchant: &'a str,
    category: &'a str,
    total: String,
    item_count: usize,
    items: String,
    manually_edited: bool,
    added_date: String,
}

impl<'a> ExportRow<'a> {
    fn from_receipt(r: &'a Receipt) -> Self {
        let items = r
            .items
            .iter()
            .map(|i| {
                if i.quantity > 1 {
                    format!("{} x{} {:.2}", i.name, i.quantity, i.price)
                } else {
                    format!("{} {:.2}", i.name, i.price)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            id: r.id.0,
            date: r.date.format("%Y-%m-%d").to_string(),
            merchant: &r.merchant,
            category: &r.category,
            total: format!("{:.2}", r.total),
            item_count: r.items.len(),
            items,
            manually_edited: r.manually_edited,
            added_date: r.added_date.to_rfc3339(),
        }
    }
}

/// One row per receipt, header included.
pub fn write_csv<'a, W: Write>(out: W, receipts: impl IntoIterator<Item = &'a Receipt>) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    let mut n = 0;
    for r in receipts {
        wtr.serialize(ExportRow::from_receipt(r))
            .with_context(|| format!("write row for receipt {}", r.id))?;
        n += 1;
    }
    wtr.flush().context("flush csv")?;
    Ok(n)
}

pub fn export_csv<'a>(path: &Path, receipts: impl IntoIterator<Item = &'a Receipt>) -> Result<usize> {
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(file, receipts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tillslip_core::{LineItem, ReceiptId};

    #[test]
    fn test_rows_and_quoting() {
        let r = Receipt {
            id: ReceiptId(42),
            merchant: "Joe's Diner, Inc".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            total: 17.5,
            items: vec![LineItem::new("Pancakes", 9.5, 1), LineItem::new("Juice", 4.0, 2)],
            category: "Food".to_string(),
            image: None,
            manually_edited: true,
            added_date: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        };

        let mut buf = Vec::new();
        assert_eq!(write_csv(&mut buf, [&r]).unwrap(), 1);
        let s = String::from_utf8(buf).unwrap();
        let mut lines = s.lines();
        assert_eq!(
            lines.next(),
            Some("id,date,merchant,category,total,item_count,items,manually_edited,added_date")
        );
        assert_eq!(
            lines.next(),
            Some("42,2024-05-01,\"Joe's Diner, Inc\",Food,17.50,2,Pancakes 9.50; Juice x2 4.00,true,2024-05-01T08:30:00+00:00")
        );
    }
}
