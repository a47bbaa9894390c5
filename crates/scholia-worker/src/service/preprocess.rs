//! OCR text cleanup applied before chunking.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static RE_REPEATED_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("space pattern is valid"));

static RE_LETTER_O_AS_ZERO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)[oO](\d)").expect("zero pattern is valid"));

static RE_LETTER_AS_ONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)[Il](\d)").expect("one pattern is valid"));

static RE_CAMEL_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("camel case pattern is valid"));

static RE_DIGIT_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)([A-Za-z])").expect("digit letter pattern is valid"));

static RE_LETTER_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z])(\d)").expect("letter digit pattern is valid"));

static RE_MULTIPLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*\*\s*(\d)").expect("multiply pattern is valid"));

static RE_DIVIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*/\s*(\d)").expect("divide pattern is valid"));

static RE_EQUALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*=\s*").expect("equals pattern is valid"));

static RE_PLUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\+\s*").expect("plus pattern is valid"));

static RE_MINUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*-\s*(\d)").expect("minus pattern is valid"));

const PUNCTUATION: [char; 4] = ['.', ',', ';', ':'];

/// Cleans up OCR output.
///
/// With `preserve_equations` set, tokens mixing letters and digits (`H2O`,
/// `x2`) are left intact; otherwise digit/letter boundaries are split.
pub fn preprocess_document_text(text: &str, preserve_equations: bool) -> String {
    let mut processed = RE_WHITESPACE.replace_all(text, " ").trim().to_string();

    processed = replace_until_stable(&RE_LETTER_O_AS_ZERO, processed, "${1}0${2}");
    processed = RE_LETTER_AS_ONE
        .replace_all(&processed, "${1}1${2}")
        .into_owned();
    processed = RE_CAMEL_CASE.replace_all(&processed, "$1 $2").into_owned();

    if !preserve_equations {
        processed = RE_DIGIT_LETTER.replace_all(&processed, "$1 $2").into_owned();
        processed = RE_LETTER_DIGIT.replace_all(&processed, "$1 $2").into_owned();
    }

    processed = replace_until_stable(&RE_MULTIPLY, processed, "$1 × $2");
    processed = replace_until_stable(&RE_DIVIDE, processed, "$1 ÷ $2");
    processed = RE_EQUALS.replace_all(&processed, " = ").into_owned();
    processed = RE_PLUS.replace_all(&processed, " + ").into_owned();
    processed = replace_until_stable(&RE_MINUS, processed, "$1 - $2");

    let processed = normalize_punctuation(&processed);
    RE_REPEATED_SPACES
        .replace_all(&processed, " ")
        .trim()
        .to_string()
}

/// Reapplies `pattern` until the text stops changing, so matches sharing a
/// digit (`1o0o1`, `2*3*4`) are all rewritten.
fn replace_until_stable(pattern: &Regex, mut text: String, replacement: &str) -> String {
    loop {
        match pattern.replace_all(&text, replacement) {
            Cow::Borrowed(_) => return text,
            Cow::Owned(next) if next == text => return text,
            Cow::Owned(next) => text = next,
        }
    }
}

/// Drops whitespace before `. , ; :` and leaves exactly one space after,
/// except inside numbers (`3.14`, `10:30`, `1,000`) and before other punctuation.
fn normalize_punctuation(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + text.len() / 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !PUNCTUATION.contains(&c) {
            output.push(c);
            continue;
        }

        let after_digit = output.chars().last().is_some_and(|p| p.is_ascii_digit());
        let before_digit = chars.peek().is_some_and(|n| n.is_ascii_digit());
        if after_digit && before_digit {
            output.push(c);
            continue;
        }

        output.truncate(output.trim_end().len());
        output.push(c);

        while chars.peek().is_some_and(|n| n.is_whitespace()) {
            chars.next();
        }
        if chars
            .peek()
            .is_some_and(|n| !PUNCTUATION.contains(n) && !matches!(n, '!' | '?' | ')'))
        {
            output.push(' ');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixes_letter_o_and_spacing() {
        assert_eq!(
            preprocess_document_text("The  value is 1o5 ,\n and x=3.14", true),
            "The value is 105, and x = 3.14"
        );
    }

    #[test]
    fn test_repeated_letter_o() {
        assert_eq!(preprocess_document_text("1o0o1", true), "10001");
    }

    #[test]
    fn test_letter_l_before_digit() {
        assert_eq!(
            preprocess_document_text("l5 apples and I2 pears", true),
            "15 apples and 12 pears"
        );
    }

    #[test]
    fn test_splits_camel_case() {
        assert_eq!(preprocess_document_text("helloWorld", true), "hello World");
    }

    #[test]
    fn test_equation_tokens_respect_preservation() {
        assert_eq!(preprocess_document_text("Mix H2O", true), "Mix H2O");
        assert_eq!(preprocess_document_text("Mix H2O", false), "Mix H 2 O");
        assert_eq!(preprocess_document_text("5kg of sand", false), "5 kg of sand");
    }

    #[test]
    fn test_operators() {
        assert_eq!(preprocess_document_text("2*3*4", true), "2 × 3 × 4");
        assert_eq!(preprocess_document_text("8 /2", true), "8 ÷ 2");
        assert_eq!(preprocess_document_text("a+b=c", true), "a + b = c");
        assert_eq!(preprocess_document_text("7-2", true), "7 - 2");
        assert_eq!(preprocess_document_text("well-known", true), "well-known");
    }

    #[test]
    fn test_punctuation_keeps_numbers_intact() {
        assert_eq!(
            preprocess_document_text("Time 10:30 , total 1,000 ;done.", true),
            "Time 10:30, total 1,000; done."
        );
        assert_eq!(preprocess_document_text("Wait... what", true), "Wait... what");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(preprocess_document_text("", true), "");
        assert_eq!(preprocess_document_text(" \n\t ", true), "");
    }
}
