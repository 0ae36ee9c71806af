//! Record extraction
//!
//! Projects the first row of a snapshot onto the combined field ordering
//! (dimensions, then metrics). Every value becomes a string using the
//! host runtime's conversion rules, so a receiver sees exactly what the
//! report displayed.

use export_core::{ExtractedRecord, TableSnapshot};
use serde_json::{Number, Value};

/// Key the host gives to a cell that has no field name
pub const UNNAMED_FIELD: &str = "undefined";

/// Host rendering of any object value
const OBJECT_STRING: &str = "[object Object]";

/// Integers beyond this magnitude lose precision in the host's number type
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Extract the single record of a snapshot.
///
/// Rows after the first are ignored and the cell count is not checked
/// against the field count: field names without a cell are left out, and
/// cells past the last field name share the key [`UNNAMED_FIELD`] (the last
/// one wins). A snapshot without rows yields an empty record.
pub fn extract_record(snapshot: &TableSnapshot) -> ExtractedRecord {
    let mut record = ExtractedRecord::new();

    let Some(row) = snapshot.first_row() else {
        return record;
    };

    let mut names = snapshot.field_names();
    for cell in &row.cells {
        let name = names.next().unwrap_or(UNNAMED_FIELD);
        let value = cell
            .as_ref()
            .and_then(|c| c.v.as_ref())
            .map(stringify_value)
            .unwrap_or_default();
        record.insert(name, value);
    }

    record
}

/// String conversion matching the host runtime: integral numbers have no
/// fraction, arrays join their elements with `,`, and objects render as
/// `[object Object]` wherever they appear.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => stringify_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => OBJECT_STRING.to_string(),
    }
}

fn stringify_number(n: &Number) -> String {
    if let Some(i) = n.as_i64().filter(|i| i.unsigned_abs() <= MAX_SAFE_INTEGER) {
        return i.to_string();
    }
    // Larger integers are rounded to the nearest double, as the host stores them
    match n.as_f64() {
        Some(f) => format_js_number(f),
        None => n.to_string(),
    }
}

/// Shortest round-trip digits laid out the way the host prints numbers:
/// plain notation for decimal exponents in `-6..21`, exponent form otherwise.
fn format_js_number(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    if !f.is_finite() {
        return if f.is_nan() {
            "NaN".to_string()
        } else if f > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let sign = if f < 0.0 { "-" } else { "" };
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // value = 0.d1d2..dk * 10^n
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let exp_sign = if n - 1 >= 0 { "+" } else { "-" };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, exp_sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, exp_sign, (n - 1).abs())
        }
    };

    format!("{}{}", sign, body)
}
