//! Component classification and grouping keys.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::value::{fold_text, parse_capacitance, parse_resistance};
use super::ComponentKind;

static RESISTOR_CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\br(es|esistor)?\b|(^|\W)r(\W|$)").expect("valid regex")
});

static CAPACITOR_CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bc(ap|apacitor)?\b|(^|\W)c(\W|$)").expect("valid regex")
});

/// Two rows describe the same part iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupingKey {
    /// Canonical value, or whitespace-normalized text for `Other`
    pub value: String,
    /// Footprint, verbatim
    pub footprint: String,
}

/// Result of classifying one BOM line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: ComponentKind,
    pub value: String,
    pub key: GroupingKey,
}

type Cue = fn(&str) -> bool;
type ValueParser = fn(&str) -> Option<String>;

/// Ordered attempts: lexical cues first, then unconditional parsing.
/// The first attempt whose cue holds and whose parser succeeds wins.
const ATTEMPTS: [(Cue, ComponentKind, ValueParser); 4] = [
    (has_resistor_cue, ComponentKind::Resistor, parse_resistance),
    (has_capacitor_cue, ComponentKind::Capacitor, parse_capacitance),
    (always, ComponentKind::Resistor, parse_resistance),
    (always, ComponentKind::Capacitor, parse_capacitance),
];

fn has_resistor_cue(folded: &str) -> bool {
    RESISTOR_CUE_RE.is_match(folded)
}

fn has_capacitor_cue(folded: &str) -> bool {
    CAPACITOR_CUE_RE.is_match(folded)
}

fn always(_: &str) -> bool {
    true
}

/// Classify a designator/footprint pair.
///
/// Rows that parse as neither resistor nor capacitor become `Other`, keyed by
/// their whitespace-collapsed text. Case is kept, so differently spelled
/// texts never collapse together.
pub fn classify(designator: &str, footprint: &str) -> Classification {
    let folded = fold_text(designator);

    let parsed = ATTEMPTS.iter().find_map(|(cue, kind, parse)| {
        if cue(&folded) {
            parse(designator).map(|value| (*kind, value))
        } else {
            None
        }
    });

    let (kind, value) =
        parsed.unwrap_or_else(|| (ComponentKind::Other, normalize_space(designator)));

    Classification {
        kind,
        key: GroupingKey {
            value: value.clone(),
            footprint: footprint.to_string(),
        },
        value,
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
