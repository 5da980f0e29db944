//! The wording of validation messages is part of the public contract. Numbers
//! are rendered in shortest round-trip form with a mandatory fractional part
//! (`200.0`), switching to a signed two-digit exponent outside
//! `[1e-4, 1e16)` (`1e+20`, `1e-05`). Echoed request values use literal
//! spellings: `None`, `True`, `['a', 1]`.

use serde_json::Value;

/// Render a float for an error message
///
/// ```
/// use croprec::display::format_float;
///
/// assert_eq!(format_float(200.0), "200.0");
/// assert_eq!(format_float(21.5), "21.5");
/// assert_eq!(format_float(1e20), "1e+20");
/// assert_eq!(format_float(0.00001), "1e-05");
/// ```
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Debug already picks shortest round-trip digits and the same
    // decimal/exponent cut-over; only the exponent spelling differs.
    let debug = format!("{value:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        },
        None => debug,
    }
}

/// Render a received JSON value the way it is echoed back in
/// invalid-type messages
///
/// Strings appear verbatim; everything else uses its literal spelling.
#[must_use]
pub fn format_received(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => literal(other),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                n.as_f64().map_or_else(|| n.to_string(), format_float)
            }
        },
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", inner.join(", "))
        },
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), literal(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        },
    }
}

/// Single-quoted string literal; double quotes when the text holds a single
/// quote and no double quote
fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            },
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}
