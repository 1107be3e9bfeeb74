//! Resistor and capacitor value normalization.
//!
//! Free-text values such as "10 kOhm", "4k7" or "0.1uF" are reduced to a base
//! SI magnitude and re-rendered at the smallest tier whose mantissa is at
//! least 1: `R`/`k`/`M` for ohms, `p`/`n`/`u` for farads.

use deunicode::deunicode_char;
use once_cell::sync::Lazy;
use regex::Regex;

use super::number::{format_general, parse_number, round_to};

/// `<number><unit>` where the unit letter directly follows the magnitude.
static RESISTANCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)([rkm])").expect("valid regex"));

/// Shorthand with the unit as decimal point ("4k7", "2r2"), only as a whole
/// token so trailing tolerances or packages ("10k 1%") are not glued on.
static INFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w.,])(\d+)([rkm])(\d+)r?(?:[^\w.,]|$)").expect("valid regex")
});

static CAPACITANCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)([pnu]?f?)").expect("valid regex"));

/// Mantissa digits kept after the decimal point.
const MANTISSA_DIGITS: usize = 4;

/// Magnitude tiers, largest first: (threshold, divisor, suffix).
const OHM_TIERS: [(f64, f64, &str); 3] =
    [(1e6, 1e6, "M"), (1e3, 1e3, "k"), (f64::MIN, 1.0, "R")];
const FARAD_TIERS: [(f64, f64, &str); 3] =
    [(1e-6, 1e-6, "u"), (1e-9, 1e-9, "n"), (f64::MIN, 1e-12, "p")];

/// Fold text to lower-case ASCII, keeping the unit glyphs that matter.
///
/// Accented Latin letters lose their accent; every other non-ASCII symbol
/// is dropped rather than transliterated.
pub fn fold_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{03a9}' | '\u{03c9}' | '\u{2126}' => Some('r'),
            '\u{00b5}' | '\u{03bc}' => Some('u'),
            c if c.is_ascii() => Some(c),
            '\u{00c0}'..='\u{024f}' => strip_accent(c),
            _ => None,
        })
        .collect::<String>()
        .to_lowercase()
}

fn strip_accent(c: char) -> Option<char> {
    let ascii = deunicode_char(c)?;
    let mut chars = ascii.chars();
    match (chars.next(), chars.next()) {
        (Some(base), None) if base.is_ascii_alphabetic() => Some(base),
        _ => None,
    }
}

/// Normalize a resistance to its canonical string ("4.7k", "10R", "1M").
pub fn parse_resistance(text: &str) -> Option<String> {
    let spaced = fold_text(text)
        .replace("kohm", "k")
        .replace("mohm", "m")
        .replace("ohms", "ohm")
        .replace("ohm", "r");
    let s = spaced.replace(' ', "");

    let Some(caps) = RESISTANCE_RE.captures(&s) else {
        let ohms = parse_number(&s)?;
        return Some(render(ohms, &OHM_TIERS));
    };
    let start = caps.get(0)?.start();

    // The infix token wins only when it is where the first unit match starts
    // once spaces are removed.
    let infix = INFIX_RE.captures(&spaced).filter(|infix| {
        infix.get(1).is_some_and(|digits| {
            spaced[..digits.start()].bytes().filter(|b| *b != b' ').count() == start
        })
    });

    let (mantissa, unit) = match infix {
        Some(infix) => (format!("{}.{}", &infix[1], &infix[3]), infix[2].to_string()),
        None => (caps[1].to_string(), caps[2].to_string()),
    };

    let value = parse_number(&mantissa)?;
    let multiplier = match unit.as_str() {
        "k" => 1e3,
        "m" => 1e6,
        _ => 1.0,
    };

    Some(render(value * multiplier, &OHM_TIERS))
}

/// Normalize a capacitance to its canonical string ("100n", "4.7u", "22p").
///
/// A value without a prefix is read as farads and still rendered in the
/// micro tier, so "2F" becomes "2e+06u".
pub fn parse_capacitance(text: &str) -> Option<String> {
    let s = fold_text(text).replace(' ', "");
    let caps = CAPACITANCE_RE.captures(&s)?;

    let value = parse_number(&caps[1])?;
    let multiplier = match caps[2].trim_end_matches('f') {
        "p" => 1e-12,
        "n" => 1e-9,
        "u" => 1e-6,
        _ => 1.0,
    };

    Some(render(value * multiplier, &FARAD_TIERS))
}

fn render(base: f64, tiers: &[(f64, f64, &str)]) -> String {
    let (_, divisor, suffix) = tiers
        .iter()
        .find(|(threshold, _, _)| base >= *threshold)
        .unwrap_or(&tiers[tiers.len() - 1]);

    format!(
        "{}{}",
        format_general(round_to(base / divisor, MANTISSA_DIGITS)),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(s: &str) -> Option<String> {
        parse_resistance(s)
    }

    fn cap(s: &str) -> Option<String> {
        parse_capacitance(s)
    }

    #[test]
    fn test_resistance_spellings_agree() {
        for text in ["10k", "10 kOhm", "10000", "10K", "10 kohms", "10kΩ", "10.0k"] {
            assert_eq!(res(text).as_deref(), Some("10k"), "input {:?}", text);
        }
    }

    #[test]
    fn test_resistance_infix() {
        assert_eq!(res("4k7").as_deref(), Some("4.7k"));
        assert_eq!(res("2R2").as_deref(), Some("2.2R"));
        assert_eq!(res("1M5").as_deref(), Some("1.5M"));
        assert_eq!(res("R 4k7 0603").as_deref(), Some("4.7k"));
        assert_eq!(res("4k7Ω").as_deref(), Some("4.7k"));
    }

    #[test]
    fn test_trailing_tokens_are_not_infix() {
        assert_eq!(res("1k 5%").as_deref(), Some("1k"));
        assert_eq!(res("10k 1%").as_deref(), Some("10k"));
        assert_eq!(res("RES 10k 0402").as_deref(), Some("10k"));
        assert_eq!(res("100R 1%").as_deref(), Some("100R"));
        assert_eq!(res("10k ±1%").as_deref(), Some("10k"));
    }

    #[test]
    fn test_fold_text_drops_non_latin_symbols() {
        assert_eq!(fold_text("Résistance"), "resistance");
        assert_eq!(fold_text("±1% 电容"), "1% ");
        assert_eq!(fold_text("4.7µF"), "4.7uf");
        assert_eq!(fold_text("100Ω"), "100r");
    }

    #[test]
    fn test_resistance_spelled_units() {
        assert_eq!(res("100 ohm").as_deref(), Some("100R"));
        assert_eq!(res("100Ω").as_deref(), Some("100R"));
        assert_eq!(res("2.2 MOhm").as_deref(), Some("2.2M"));
        assert_eq!(res("4,7k").as_deref(), Some("4.7k"));
    }

    #[test]
    fn test_resistance_tier_boundaries() {
        assert_eq!(res("1000").as_deref(), Some("1k"));
        assert_eq!(res("1000R").as_deref(), Some("1k"));
        assert_eq!(res("1000000").as_deref(), Some("1M"));
        assert_eq!(res("1000k").as_deref(), Some("1M"));
        assert_eq!(res("999").as_deref(), Some("999R"));
        assert_eq!(res("0.5").as_deref(), Some("0.5R"));
    }

    #[test]
    fn test_resistance_rejects_non_values() {
        assert_eq!(res("USB-C Connector"), None);
        assert_eq!(res(""), None);
        assert_eq!(res("100nF"), None);
    }

    #[test]
    fn test_capacitance_equivalents() {
        for text in ["100nF", "100n", "0.1uF", "100 nF", "0,1µF"] {
            assert_eq!(cap(text).as_deref(), Some("100n"), "input {:?}", text);
        }
    }

    #[test]
    fn test_capacitance_tiers() {
        assert_eq!(cap("4.7uF").as_deref(), Some("4.7u"));
        assert_eq!(cap("1uF").as_deref(), Some("1u"));
        assert_eq!(cap("22pF").as_deref(), Some("22p"));
        assert_eq!(cap("22p").as_deref(), Some("22p"));
        assert_eq!(cap("10nF 50V").as_deref(), Some("10n"));
    }

    #[test]
    fn test_capacitance_farad_quirk() {
        // No tier above micro: whole farads stay in the micro tier.
        assert_eq!(cap("2F").as_deref(), Some("2e+06u"));
        assert_eq!(cap("1F").as_deref(), Some("1e+06u"));
        assert_eq!(cap("5").as_deref(), Some("5e+06u"));
    }

    #[test]
    fn test_capacitance_requires_digits() {
        assert_eq!(cap("USB-C Connector"), None);
        assert_eq!(cap("cap"), None);
    }

    #[test]
    fn test_canonical_values_are_idempotent() {
        for canonical in ["4.7k", "10R", "1M", "0.5R", "100k"] {
            assert_eq!(res(canonical).as_deref(), Some(canonical));
        }
        for canonical in ["100n", "4.7u", "22p", "1u"] {
            assert_eq!(cap(canonical).as_deref(), Some(canonical));
        }
    }
}
