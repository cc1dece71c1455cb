//! # Coercion Module
//!
//! Turns loosely-typed record fields into numbers, text and flags.
//!
//! Upstream records come from a document store and from spreadsheet rows, so
//! a "price" can arrive as `12.5`, `"12.5"`, `" 12.5 "`, `null`, `true`, or not
//! at all. Every consumer in this crate goes through the functions here so
//! the validator and the calculator agree on what a field means.
//!
//! ## Numeric Coercion Table
//! ```text
//! ┌───────────────────────────┬──────────────────────────────┐
//! │  Raw value                │  parse_number_or_default     │
//! ├───────────────────────────┼──────────────────────────────┤
//! │  (absent)                 │  default                     │
//! │  null                     │  0                           │
//! │  true / false             │  1 / 0                       │
//! │  12.5                     │  12.5                        │
//! │  " 12.5 " / "1e3"         │  12.5 / 1000                 │
//! │  "" / "   "               │  0                           │
//! │  "0x1F"                   │  31                          │
//! │  "abc" / "Infinity"       │  default                     │
//! │  [..] / {..}              │  default                     │
//! └───────────────────────────┴──────────────────────────────┘
//! ```

use serde_json::Value;

// =============================================================================
// Numbers
// =============================================================================

/// Coerces a raw field into a finite number, never failing.
///
/// ## Example
/// ```rust
/// use landed_core::coerce::parse_number_or_default;
/// use serde_json::json;
///
/// assert_eq!(parse_number_or_default(Some(&json!(" 12.5 ")), 0.0), 12.5);
/// assert_eq!(parse_number_or_default(Some(&json!("abc")), 7.0), 7.0);
/// assert_eq!(parse_number_or_default(None, 7.0), 7.0);
/// assert_eq!(parse_number_or_default(Some(&json!(null)), 7.0), 0.0);
/// ```
pub fn parse_number_or_default(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        None => return default,
        Some(Value::Null) => Some(0.0),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_numeric_text(s),
        Some(Value::Array(_)) | Some(Value::Object(_)) => None,
    };

    match parsed {
        Some(x) if x.is_finite() => x,
        _ => default,
    }
}

/// Same as [`parse_number_or_default`] for values that already are numbers.
#[inline]
pub fn finite_or(x: f64, default: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        default
    }
}

/// Parses numeric text the way a loose record field is read.
///
/// Returns `None` for text that is not a number. Blank text is zero.
fn parse_numeric_text(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    // Radix literals carry no sign
    let with_prefix = |prefix_lower: &str, prefix_upper: &str, radix: u32| {
        s.strip_prefix(prefix_lower)
            .or_else(|| s.strip_prefix(prefix_upper))
            .map(|digits| {
                if digits.is_empty() {
                    None
                } else {
                    u64::from_str_radix(digits, radix).ok().map(|n| n as f64)
                }
            })
    };
    if let Some(n) = with_prefix("0x", "0X", 16) {
        return n;
    }
    if let Some(n) = with_prefix("0o", "0O", 8) {
        return n;
    }
    if let Some(n) = with_prefix("0b", "0B", 2) {
        return n;
    }

    // f64::from_str also accepts "inf"/"nan"; those end up non-finite and
    // fall back to the default in the caller.
    s.parse::<f64>().ok()
}

// =============================================================================
// Text
// =============================================================================

/// Returns `true` for values a loose record treats as "not set".
pub fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |x| x == 0.0 || x.is_nan()),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

/// Coerces a raw field into trimmed text; falsy values become `""`.
///
/// ## Example
/// ```rust
/// use landed_core::coerce::coerce_text;
/// use serde_json::json;
///
/// assert_eq!(coerce_text(Some(&json!("  Total "))), "Total");
/// assert_eq!(coerce_text(Some(&json!(0))), "");
/// assert_eq!(coerce_text(Some(&json!(12))), "12");
/// ```
pub fn coerce_text(value: Option<&Value>) -> String {
    if is_falsy(value) {
        return String::new();
    }
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Lower-cased [`coerce_text`], the form every enum-like field is matched in.
pub fn normalize_key(value: Option<&Value>) -> String {
    coerce_text(value).to_lowercase()
}

// =============================================================================
// Flags
// =============================================================================

/// Coerces a raw profile flag to a boolean.
///
/// `"1"`, `"true"`, `"yes"` are true; `"0"`, `"false"`, `"no"` are false
/// (case-insensitive, trimmed). Other numbers are true only when equal to 1.
/// Anything else yields `fallback`.
pub fn coerce_flag(value: Option<&Value>, fallback: bool) -> bool {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_lowercase(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    };

    match text.as_str() {
        "1" | "true" | "yes" => return true,
        "0" | "false" | "no" => return false,
        _ => {}
    }

    match value {
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::Bool(b)) => *b,
        _ => fallback,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
