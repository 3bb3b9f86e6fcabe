//! Display formatting for prices, percentages and large amounts.
//!
//! Statistics carry their value as a ready-to-render string, so the
//! formatting rules live in the core rather than in each frontend.

/// `1234.5` → `"$1,234.50"`, `-3.2` → `"-$3.20"`.
pub fn as_currency_with_2_decimals(value: f64) -> String {
    currency(value, 2, 2)
}

/// Like [`as_currency_with_2_decimals`] but keeps up to six fraction digits
/// for low-priced coins: `0.000123` → `"$0.000123"`, `12.5` → `"$12.50"`.
pub fn as_currency_with_6_decimals(value: f64) -> String {
    currency(value, 2, 6)
}

/// `1.2345` → `"1.23"`.
pub fn as_number_string(value: f64) -> String {
    format!("{value:.2}")
}

/// `2.345` → `"2.35%"` (input is already a percentage, not a ratio).
pub fn as_percent_string(value: f64) -> String {
    format!("{}%", as_number_string(value))
}

/// Abbreviate large amounts: `12_345_678_900.0` → `"12.35Bn"`.
///
/// Suffixes: `Tr` (10^12), `Bn` (10^9), `M` (10^6), `K` (10^3). The sign is
/// preserved; values below one thousand keep two decimals. An amount that
/// rounds to 1000 of one unit is shown as `1.00` of the next.
pub fn formatted_with_abbreviations(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [
        (1_000_000_000_000.0, "Tr"),
        (1_000_000_000.0, "Bn"),
        (1_000_000.0, "M"),
        (1_000.0, "K"),
    ];

    let num = value.abs();
    let scaled = |unit: usize| {
        let scale = UNITS.get(unit).map_or(1.0, |&(scale, _)| scale);
        as_number_string(num / scale)
    };

    let mut unit = UNITS
        .iter()
        .position(|&(scale, _)| num >= scale)
        .unwrap_or(UNITS.len());
    if unit > 0 && scaled(unit).starts_with("1000.") {
        unit -= 1;
    }

    let digits = scaled(unit);
    let suffix = UNITS.get(unit).map_or("", |&(_, suffix)| suffix);
    format!("{}{digits}{suffix}", sign(value, &digits))
}

/// `-` only when the rounded digits are not all zero.
fn sign(value: f64, digits: &str) -> &'static str {
    if value < 0.0 && digits.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        "-"
    } else {
        ""
    }
}

fn currency(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let minus = sign(value, &fixed);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_fraction {
        frac.push('0');
    }

    if frac.is_empty() {
        format!("{minus}${}", group_thousands(int_part))
    } else {
        format!("{minus}${}.{frac}", group_thousands(int_part))
    }
}

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
