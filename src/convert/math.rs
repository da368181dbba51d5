//! Math Delimiter Escaping
//!
//! Markdown treats `\(` as an escaped parenthesis and drops the backslash,
//! which would leave the typesetter without its delimiters. Doubling the
//! backslash survives the markdown pass as a single backslash.

use regex::Regex;
use std::sync::LazyLock;

static MATH_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([()\[\]])").expect("valid math delimiter regex"));

/// Double every backslash that directly precedes `(`, `)`, `[` or `]`.
pub fn escape_math_delimiters(text: &str) -> String {
    MATH_DELIMITER.replace_all(text, r"\\$1").into_owned()
}
