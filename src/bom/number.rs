//! Locale-tolerant number parsing and the numeric formatting used for
//! canonical values and price columns.

/// Parse free text into a float.
///
/// Spaces are ignored. When the text contains a period, commas are treated
/// as thousands separators ("1,234.5"); otherwise a single comma is the
/// decimal point ("4,7"). Anything else that fails strict parsing is `None`,
/// as are empty input and non-finite results.
pub fn parse_number(text: &str) -> Option<f64> {
    let mut s: String = text.trim().chars().filter(|c| *c != ' ').collect();
    if s.contains('.') {
        s.retain(|c| c != ',');
    } else if s.matches(',').count() == 1 {
        s = s.replace(',', ".");
    }

    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a unit price, ignoring any `$` signs.
pub fn parse_money(text: &str) -> Option<f64> {
    let s: String = text.chars().filter(|c| *c != '$').collect();
    parse_number(&s)
}

/// Parse a quantity cell. Commas are always thousands separators here, and
/// the value is rounded half-to-even. Unparseable input coerces to 0.
pub fn parse_quantity(text: &str) -> i64 {
    let s: String = text.chars().filter(|c| *c != ',').collect();
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v.round_ties_even() as i64,
        _ => 0,
    }
}

/// Round to a fixed number of fractional digits using the correctly rounded
/// decimal expansion rather than `x * 10^n`.
pub fn round_to(value: f64, digits: usize) -> f64 {
    format!("{:.*}", digits, value).parse().unwrap_or(value)
}

/// Render a float the way C's `%g` does: six significant digits, trailing
/// zeros trimmed, exponent notation below 1e-4 or from 1e6 upwards.
pub fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // The exponent must be taken after rounding to the target precision.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// Render a price for output: shortest round-trip form, always with a
/// fractional part ("3.0", "0.35").
pub fn format_decimal(value: f64) -> String {
    let s = value.to_string();
    if s.contains('.') || !value.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
