//! Detailed mathematical content analysis.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum number of distinct formulas or notations reported.
pub const MAX_REPORTED_MATCHES: usize = 10;

const KNOWN_COMPOUNDS: &[&str] = &[
    "H2O", "CO2", "NaCl", "CH4", "O2", "N2", "Ca(OH)2", "H2SO4",
];

static RE_EQUATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\$[^$]+\$",
        r"\$\$[^$]+\$\$",
        r"[a-zA-Z0-9\s]*=\s*[a-zA-Z0-9\s+\-*/()^]+",
        r"\\[A-Za-z0-9_]+",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("equation pattern is valid"))
    .collect()
});

static RE_FORMULA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[A-Z][a-z]?[0-9]*)+(?:\((?:[A-Z][a-z]?[0-9]*)+\)[0-9]*)*\b")
        .expect("formula pattern is valid")
});

static RE_SINGLE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]$").expect("element pattern is valid"));

static RE_SUPERSUB_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\^[a-zA-Z0-9]+",
        r"_[a-zA-Z0-9]+",
        r"[0-9]+\^[0-9]+",
        r"[a-zA-Z]+_[0-9]+",
        r"x²|x³|m²|cm³|kg/m³",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("superscript/subscript pattern is valid"))
    .collect()
});

/// Breakdown of the mathematical content found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathContentReport {
    /// Whether any equation, formula or notation was found.
    pub detected: bool,
    /// Total matches across the equation patterns.
    pub equations_count: usize,
    /// Distinct chemical formulas in first-seen order.
    pub chemical_formulas: Vec<String>,
    /// Distinct superscript/subscript notations in first-seen order.
    pub superscript_subscript_usage: Vec<String>,
}

/// Analyzes the mathematical content of `text`.
///
/// Formula tokens are kept when they contain a known compound, carry an
/// atom count, or are a two-letter element symbol.
pub fn analyze_math_content(text: &str) -> MathContentReport {
    let equations_count = RE_EQUATION_PATTERNS
        .iter()
        .map(|pattern| pattern.find_iter(text).count())
        .sum();

    let chemical_formulas = distinct(
        RE_FORMULA
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|formula| is_chemical_formula(formula)),
    );

    let superscript_subscript_usage = distinct(
        RE_SUPERSUB_PATTERNS
            .iter()
            .flat_map(|pattern| pattern.find_iter(text).map(|m| m.as_str())),
    );

    MathContentReport {
        detected: equations_count > 0
            || !chemical_formulas.is_empty()
            || !superscript_subscript_usage.is_empty(),
        equations_count,
        chemical_formulas,
        superscript_subscript_usage,
    }
}

fn is_chemical_formula(formula: &str) -> bool {
    KNOWN_COMPOUNDS.iter().any(|known| formula.contains(known))
        || formula.chars().any(|c| c.is_ascii_digit())
        || RE_SINGLE_ELEMENT.is_match(formula)
}

fn distinct<'a>(matches: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    matches
        .filter(|m| seen.insert(*m))
        .take(MAX_REPORTED_MATCHES)
        .map(str::to_owned)
        .collect()
}
