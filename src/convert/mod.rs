//! Text Preprocessing
//!
//! Pure text transforms applied to the raw source before it reaches the
//! markdown renderer.

pub mod math;
pub mod table;

pub use math::escape_math_delimiters;
pub use table::convert;

/// Prepare raw source text for the markdown renderer.
///
/// Math delimiters are escaped first (only when a typesetting pass follows),
/// then the table dialect is converted. The input is never modified.
pub fn prepare_markdown(source: &str, escape_math: bool) -> String {
    if escape_math {
        convert(&escape_math_delimiters(source))
    } else {
        convert(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_with_math() {
        let source = "||x||y||\n|\\(a\\)|b|";
        assert_eq!(
            prepare_markdown(source, true),
            "| x | y |\n| --- | --- |\n|\\\\(a\\\\)|b|"
        );
    }

    #[test]
    fn test_prepare_without_math() {
        assert_eq!(prepare_markdown("\\(a\\)", false), "\\(a\\)");
    }
}
