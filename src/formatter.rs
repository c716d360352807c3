// =============================================================================
// Display formatting for prices and large figures
// =============================================================================
//
// Non-finite inputs render as their `Display` text (`NaN`, `inf`, `-inf`).
// Digits are grouped from the decimal rendering, so magnitudes beyond `u64`
// keep every digit.

/// `$1,234.56`; negatives render as `-$1,234.56`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}${}.{frac}", sign_of(value, &fixed), group_thousands(whole))
}

/// `2.80T`, `1.75B`, `45.23M`, `12.00K`; below one thousand a grouped
/// integer with no decimals.
pub fn format_large_number(value: f64) -> String {
    const SUFFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    if !value.is_finite() {
        return value.to_string();
    }

    let magnitude = value.abs();
    for (scale, suffix) in SUFFIXES {
        if magnitude >= scale {
            return format!("{:.2}{suffix}", value / scale);
        }
    }

    let whole = format!("{magnitude:.0}");
    format!("{}{}", sign_of(value, &whole), group_thousands(&whole))
}

/// `-` for negative values that do not round to zero.
fn sign_of(value: f64, rendered: &str) -> &'static str {
    if value < 0.0 && rendered.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        "-"
    } else {
        ""
    }
}

/// Insert `,` every three digits of a plain digit string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
