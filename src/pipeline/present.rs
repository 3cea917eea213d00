//! Result presentation: view data and export bytes for one result.
//!
//! Every function here is pure. Absent optional fields degrade to a fixed
//! label instead of failing, and the export encoders are deterministic, so
//! calling them twice on the same result yields identical bytes. Writing
//! those bytes somewhere is the caller's job (see [`crate::export`]).

use crate::model::ExtractionResult;
use serde::{Deserialize, Serialize};

/// Label shown for an absent vendor, date or total.
pub const NOT_DETECTED: &str = "Not detected";

/// Label shown for an absent category.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Placeholder for absent values in the CSV export.
pub const CSV_MISSING: &str = "N/A";

/// Visual emphasis bucket for the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Above 0.80.
    High,
    /// Above 0.60, up to and including 0.80.
    Medium,
    /// 0.60 and below.
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.8 {
            ConfidenceTier::High
        } else if confidence > 0.6 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Display-ready strings for one result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewData {
    pub vendor: String,
    pub date: String,
    pub total_amount: String,
    pub category: String,
    /// Percentage with one decimal, e.g. `93.0%`.
    pub confidence: String,
    pub confidence_tier: ConfidenceTier,
    pub raw_text: String,
}

/// Derive view data from a result.
pub fn present(result: &ExtractionResult) -> ViewData {
    ViewData {
        vendor: result.vendor().unwrap_or(NOT_DETECTED).to_string(),
        date: result.date().unwrap_or(NOT_DETECTED).to_string(),
        total_amount: result
            .total_amount
            .map(format_amount)
            .unwrap_or_else(|| NOT_DETECTED.to_string()),
        category: result.category().unwrap_or(DEFAULT_CATEGORY).to_string(),
        confidence: format_confidence(result.confidence),
        confidence_tier: ConfidenceTier::from_confidence(result.confidence),
        raw_text: result.raw_text.clone(),
    }
}

/// `42.5` → `$42.50`. Ties round away from zero (`10.125` → `$10.13`).
pub fn format_amount(amount: f64) -> String {
    format!("${:.2}", round_half_up(amount, 100.0))
}

/// `0.93` → `93.0%`. Ties round away from zero (`0.8125` → `81.3%`).
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", round_half_up(confidence * 100.0, 10.0))
}

// `{:.N}` rounds exact ties to even; displayed figures round them up.
fn round_half_up(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

/// Pretty-printed JSON of the result, fields in declaration order.
pub fn to_json(result: &ExtractionResult) -> Vec<u8> {
    // A struct of strings, options and finite floats always serialises.
    serde_json::to_vec_pretty(result).unwrap_or_default()
}

/// Two-column `Field,Value` table with five rows in fixed order.
///
/// Lines are joined with `\n` and there is no trailing newline. Values are
/// flattened onto one line and quoted when they contain a comma or quote,
/// so the output is always exactly six lines.
pub fn to_csv(result: &ExtractionResult) -> Vec<u8> {
    let total = result
        .total_amount
        .map(format_amount)
        .unwrap_or_else(|| CSV_MISSING.to_string());

    let rows: [(&str, String); 6] = [
        ("Field", "Value".to_string()),
        ("Vendor", result.vendor().unwrap_or(CSV_MISSING).to_string()),
        ("Date", result.date().unwrap_or(CSV_MISSING).to_string()),
        ("Total Amount", total),
        ("Category", result.category().unwrap_or(CSV_MISSING).to_string()),
        ("Confidence", format_confidence(result.confidence)),
    ];

    rows.iter()
        .map(|(field, value)| format!("{},{}", field, csv_field(value)))
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes()
}

fn csv_field(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    if flat.contains(',') || flat.contains('"') {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> ExtractionResult {
        ExtractionResult {
            raw_text: "ACME CORP\nTotal: $42.50".into(),
            vendor: Some("ACME CORP".into()),
            date: Some("2024-01-15".into()),
            total_amount: Some(42.50),
            category: Some("Office Supplies".into()),
            confidence: 0.93,
        }
    }

    fn bare(confidence: f64) -> ExtractionResult {
        ExtractionResult {
            raw_text: "???".into(),
            vendor: None,
            date: None,
            total_amount: None,
            category: None,
            confidence,
        }
    }

    #[test]
    fn presents_full_result() {
        let v = present(&acme());
        assert_eq!(v.vendor, "ACME CORP");
        assert_eq!(v.date, "2024-01-15");
        assert_eq!(v.total_amount, "$42.50");
        assert_eq!(v.category, "Office Supplies");
        assert_eq!(v.confidence, "93.0%");
        assert_eq!(v.confidence_tier, ConfidenceTier::High);
    }

    #[test]
    fn absent_fields_use_fallback_labels() {
        let v = present(&bare(0.42));
        assert_eq!(v.vendor, NOT_DETECTED);
        assert_eq!(v.date, NOT_DETECTED);
        assert_eq!(v.total_amount, NOT_DETECTED);
        assert_eq!(v.category, DEFAULT_CATEGORY);
        assert_eq!(v.confidence, "42.0%");
        assert_eq!(v.raw_text, "???");
    }

    #[test]
    fn zero_total_is_present() {
        let mut r = bare(0.9);
        r.total_amount = Some(0.0);
        assert_eq!(present(&r).total_amount, "$0.00");
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(ConfidenceTier::from_confidence(0.81), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_confidence(0.80), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(0.61), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(0.60), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_confidence(0.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_confidence(1.0), ConfidenceTier::High);
    }

    #[test]
    fn amount_rounds_to_cents() {
        assert_eq!(format_amount(20.24), "$20.24");
        assert_eq!(format_amount(7.0), "$7.00");
        assert_eq!(format_amount(1234.5), "$1234.50");
    }

    #[test]
    fn ties_round_up() {
        assert_eq!(format_amount(10.125), "$10.13");
        assert_eq!(format_amount(0.375), "$0.38");
        assert_eq!(format_confidence(0.8125), "81.3%");
        assert_eq!(format_confidence(0.0625), "6.3%");

        let mut r = bare(0.8125);
        r.total_amount = Some(10.125);
        let v = present(&r);
        assert_eq!(v.total_amount, "$10.13");
        assert_eq!(v.confidence, "81.3%");

        let csv = String::from_utf8(to_csv(&r)).unwrap();
        assert!(csv.contains("Total Amount,$10.13\n"), "{csv}");
        assert!(csv.ends_with("Confidence,81.3%"), "{csv}");
    }

    #[test]
    fn json_is_idempotent_and_ordered() {
        let r = acme();
        let a = to_json(&r);
        let b = to_json(&r);
        assert_eq!(a, b);

        let s = String::from_utf8(a).unwrap();
        let order = ["raw_text", "vendor", "date", "total_amount", "category", "confidence"];
        let positions: Vec<usize> = order
            .iter()
            .map(|k| s.find(&format!("\"{k}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{s}");
        assert!(s.contains("\n  \"vendor\": \"ACME CORP\""));
    }

    #[test]
    fn json_keeps_absent_fields_as_null() {
        let s = String::from_utf8(to_json(&bare(0.5))).unwrap();
        assert!(s.contains("\"vendor\": null"));
    }

    #[test]
    fn csv_full_result() {
        let csv = String::from_utf8(to_csv(&acme())).unwrap();
        assert_eq!(
            csv,
            "Field,Value\n\
             Vendor,ACME CORP\n\
             Date,2024-01-15\n\
             Total Amount,$42.50\n\
             Category,Office Supplies\n\
             Confidence,93.0%"
        );
    }

    #[test]
    fn csv_always_six_lines() {
        let mut tricky = acme();
        tricky.vendor = Some("Smith, Jones & \"Co\"\nLtd".into());
        tricky.category = Some("Food & Dining".into());

        for r in [acme(), bare(0.3), tricky] {
            let csv = String::from_utf8(to_csv(&r)).unwrap();
            assert_eq!(csv.lines().count(), 6, "{csv}");
        }
    }

    #[test]
    fn csv_absent_values_are_na() {
        let csv = String::from_utf8(to_csv(&bare(0.755))).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "Vendor,N/A");
        assert_eq!(lines[2], "Date,N/A");
        assert_eq!(lines[3], "Total Amount,N/A");
        assert_eq!(lines[4], "Category,N/A");
    }

    #[test]
    fn csv_quotes_delimiters() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "two lines");
    }
}
