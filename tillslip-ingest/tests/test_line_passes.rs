use chrono::NaiveDate;
use tillslip_ingest::{
    detect_merchant, extract_items, prepare_lines, resolve_date, resolve_total, DateOrder,
    ExtractionConfig, TotalSource,
};

const RECEIPT: &str = "
  ACE HARDWARE #1182
  12/05/23 14:02
  Wood Screws 1-1/4 6.98
  2 x Paint Brush 4.50
  Drop Cloth 12.99
  SUBTOTAL 24.47
  TAX 2.02
  BALANCE DUE $26.49
";

#[test]
fn test_independent_passes_over_one_line_list() {
    let config = ExtractionConfig::default();
    let lines = prepare_lines(RECEIPT);

    assert_eq!(detect_merchant(&lines, config.merchant_scan_lines), Some("ACE HARDWARE #1182"));
    assert_eq!(
        resolve_date(&lines, config.date_order),
        Some(NaiveDate::from_ymd_opt(2023, 12, 5).unwrap())
    );

    // SUBTOTAL is the first line carrying a total keyword
    let total = resolve_total(&lines, &config.total_keywords);
    assert_eq!(total.value, 24.47);
    assert!(matches!(total.source, TotalSource::Keyword { ref keyword, line: 5 } if keyword == "total"));

    let items = extract_items(&lines, total.value, config.max_items);
    assert!(items.iter().all(|i| i.price > 0.0 && i.price <= total.value));
    assert!(items.iter().any(|i| i.name == "Paint Brush" && i.quantity == 2));
    assert!(items.iter().all(|i| i.name != "BALANCE DUE"));
}

#[test]
fn test_day_first_deployment() {
    let lines = prepare_lines("BOULANGERIE\n05/12/2023\nBaguette 1.20\nTOTAL 1.20");
    assert_eq!(
        resolve_date(&lines, DateOrder::DayFirst),
        Some(NaiveDate::from_ymd_opt(2023, 12, 5).unwrap())
    );
    assert_eq!(
        resolve_date(&lines, DateOrder::MonthFirst),
        Some(NaiveDate::from_ymd_opt(2023, 5, 12).unwrap())
    );
}

#[test]
fn test_nothing_recognizable() {
    let lines = prepare_lines("~~\n..\nTHANK YOU");
    let config = ExtractionConfig::default();
    let total = resolve_total(&lines, &config.total_keywords);
    assert_eq!(total.value, 0.0);
    assert_eq!(total.source, TotalSource::Missing);
    assert!(extract_items(&lines, total.value, config.max_items).is_empty());
    assert_eq!(resolve_date(&lines, config.date_order), None);
}
