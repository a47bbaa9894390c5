//! Heuristic content feature detection.
//!
//! Detection is a triage signal for richer rendering downstream: it favours
//! recall over precision, so plain arithmetic operators are enough to flag a
//! span as containing equations and almost any capitalized token looks like an
//! element symbol.
//!
//! Call sites depend on the [`ContentDetector`] trait so the detection strategy
//! can be swapped without touching the chunker or the estimator.

mod analysis;

use std::sync::LazyLock;

pub use analysis::{MAX_REPORTED_MATCHES, MathContentReport, analyze_math_content};
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_EQUATIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\$.*\$|\\[A-Za-z0-9_]+|=|\+|-|\*|/|\^|\(|\)|∑|∫|π|α|β|γ|δ|θ|λ|μ|σ|φ|ψ|ω",
    )
    .expect("equation pattern is valid")
});

static RE_CHEMICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z][a-z]?[0-9]*|H2O|CO2|NaCl|CH4|O2|N2|Ca\(OH\)2|H2SO4|HCl|NaOH")
        .expect("chemical pattern is valid")
});

static RE_SUPERSUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\^[a-zA-Z0-9]+|_{1,2}[a-zA-Z0-9]+|[0-9]+\^[0-9]+|[a-zA-Z]+_[0-9]+|x²|x³|m²|cm³|kg/m³",
    )
    .expect("superscript/subscript pattern is valid")
});

/// Content feature flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentFeatures {
    /// LaTeX, math operators or Greek letters are present.
    pub has_equations: bool,
    /// Element-like tokens or named compounds are present.
    pub has_chemical: bool,
    /// Caret/underscore notation or superscript glyphs are present.
    pub has_supersub: bool,
}

impl ContentFeatures {
    /// Returns true if any flag is set.
    pub fn any(&self) -> bool {
        self.has_equations || self.has_chemical || self.has_supersub
    }
}

/// Classifies text spans into [`ContentFeatures`].
pub trait ContentDetector: Send + Sync {
    /// Detects features present in `text`.
    fn detect(&self, text: &str) -> ContentFeatures;

    /// Detects features, or returns all-false without inspecting `text` when
    /// detection is disabled.
    fn detect_if(&self, text: &str, enabled: bool) -> ContentFeatures {
        if enabled {
            self.detect(text)
        } else {
            ContentFeatures::default()
        }
    }
}

/// Regular-expression based detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternDetector;

impl PatternDetector {
    /// Creates a new pattern detector.
    pub fn new() -> Self {
        Self
    }
}

impl ContentDetector for PatternDetector {
    fn detect(&self, text: &str) -> ContentFeatures {
        ContentFeatures {
            has_equations: RE_EQUATIONS.is_match(text),
            has_chemical: RE_CHEMICAL.is_match(text),
            has_supersub: RE_SUPERSUB.is_match(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_no_features() {
        assert_eq!(PatternDetector.detect(""), ContentFeatures::default());
    }

    #[test]
    fn test_operators_flag_equations() {
        let features = PatternDetector.detect("E = mc^2");
        assert!(features.has_equations);
        assert!(features.has_supersub);
    }

    #[test]
    fn test_latex_and_greek_flag_equations() {
        assert!(PatternDetector.detect(r"\frac ab").has_equations);
        assert!(PatternDetector.detect("angle θ").has_equations);
        assert!(!PatternDetector.detect("plain words only").has_equations);
    }

    #[test]
    fn test_any_letter_flags_chemical() {
        assert!(PatternDetector.detect("hello").has_chemical);
        assert!(PatternDetector.detect("NaCl").has_chemical);
        assert!(!PatternDetector.detect("1234 5678").has_chemical);
    }

    #[test]
    fn test_supersub_notation() {
        assert!(PatternDetector.detect("x_1 and x_2").has_supersub);
        assert!(PatternDetector.detect("volume in cm³").has_supersub);
        assert!(PatternDetector.detect("area x²").has_supersub);
        assert!(!PatternDetector.detect("no notation here").has_supersub);
    }

    #[test]
    fn test_disabled_detection_short_circuits() {
        let features = PatternDetector.detect_if("E = mc^2 with H2O", false);
        assert_eq!(features, ContentFeatures::default());
        assert!(!features.any());
    }
}
