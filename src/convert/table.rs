//! Table Dialect Conversion
//!
//! Rewrites the `||a||b||` header syntax into standard markdown tables.
//! Rows that are already single-pipe delimited are left untouched.

use regex::Regex;
use std::sync::LazyLock;

/// Two-character marker that opens, closes and separates header cells
pub const HEADER_MARKER: &str = "||";

/// Cell text used for every column of the synthesized separator row
pub const SEPARATOR_CELL: &str = "---";

/// Any line whose trimmed form starts and ends with a pipe
static PIPE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\|.*\|[ \t\r]*$").expect("valid pipe row regex"));

/// Header row: optional indent, `||`, content, `||`, optional trailing space
static HEADER_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)\|\|(.*)\|\|[ \t\r]*$").expect("valid header row regex")
});

/// Convert custom header rows into markdown header + separator rows.
///
/// The conversion runs in a fixed order:
///
/// 1. Text without any full-line pipe row is returned unchanged.
/// 2. Header rows broken across physical lines are rejoined (see
///    [`join_broken_headers`]).
/// 3. Every header row becomes a `| a | b |` row followed by a
///    `| --- | --- |` separator. All other lines pass through byte-for-byte.
///
/// This never fails; malformed markers are split literally.
pub fn convert(text: &str) -> String {
    if !has_pipe_rows(text) {
        return text.to_string();
    }

    let joined = join_broken_headers(text);

    joined
        .split('\n')
        .map(|line| match convert_header_line(line) {
            Some(rows) => rows,
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether any line of `text` looks like a pipe-delimited table row
pub fn has_pipe_rows(text: &str) -> bool {
    PIPE_ROW.is_match(text)
}

/// Convert a single header-marker line into its header and separator rows.
///
/// Returns `None` when the line is not a header row. A header needs both an
/// opening and a closing marker, so `||` and `|||` are not headers.
pub fn convert_header_line(line: &str) -> Option<String> {
    let captures = HEADER_ROW.captures(line)?;
    let indent = captures.get(1).map_or("", |m| m.as_str());
    let content = captures.get(2).map_or("", |m| m.as_str());

    let cells: Vec<&str> = content.split(HEADER_MARKER).map(str::trim).collect();

    let header = format_row(indent, cells.iter().copied());
    let separator = format_row(indent, cells.iter().map(|_| SEPARATOR_CELL));

    Some(format!("{header}\n{separator}"))
}

/// Rejoin header rows that were split across lines.
///
/// A line that opens a header (`||` after optional indent), ends in a pipe
/// but does not end in the closing marker is unterminated. When the next
/// line starts with a pipe, the line break and the horizontal whitespace
/// around it are dropped, so the two pipes fuse into one `||` separator.
/// Repeats until the row is terminated or the next line no longer starts
/// with a pipe, so a header may span any number of physical lines.
///
/// Lines of an ordinary `|a|b|` table are never joined, and a run that never
/// reaches a closing `||` is emitted line by line, unchanged.
pub fn join_broken_headers(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    // Physical lines of the header row currently being joined
    let mut pending: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if !pending.is_empty() {
            let continuation = line.trim_start_matches([' ', '\t']);
            if continuation.starts_with('|') {
                pending.push(line);
                let joined = fuse_lines(&pending);
                if !is_unterminated_header(&joined) {
                    out.push(joined);
                    pending.clear();
                }
                continue;
            }
            out.extend(pending.drain(..).map(str::to_string));
        }

        if is_unterminated_header(line) {
            pending.push(line);
        } else {
            out.push(line.to_string());
        }
    }

    // Never terminated: leave every physical line as it was
    out.extend(pending.into_iter().map(str::to_string));

    out.join("\n")
}

/// Fuse physical lines into one logical row; a single line is kept verbatim
fn fuse_lines(lines: &[&str]) -> String {
    if let [line] = lines {
        return line.to_string();
    }

    let mut fused = String::new();
    for (i, line) in lines.iter().enumerate() {
        let line = if i == 0 {
            *line
        } else {
            line.trim_start_matches([' ', '\t'])
        };
        fused.push_str(line.trim_end_matches([' ', '\t', '\r']));
    }
    fused
}

/// Opening marker, at least one more character, then a lone closing pipe.
/// The trailing pipe may not overlap the opening marker, so `||` and `|||`
/// never start a join.
fn is_unterminated_header(line: &str) -> bool {
    let trimmed = line.trim_matches([' ', '\t', '\r']);
    match trimmed.strip_prefix(HEADER_MARKER) {
        Some(rest) => rest.len() > 1 && rest.ends_with('|') && !rest.ends_with(HEADER_MARKER),
        None => false,
    }
}

fn format_row<'a>(indent: &str, cells: impl Iterator<Item = &'a str>) -> String {
    let body = cells.collect::<Vec<_>>().join(" | ");
    format!("{indent}| {body} |")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_header() {
        assert_eq!(convert("||A||B||"), "| A | B |\n| --- | --- |");
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let text = "# Title\n\nsome text with a | pipe inside\n";
        assert_eq!(convert(text), text);
    }

    #[test]
    fn test_header_cells_are_trimmed() {
        assert_eq!(
            convert("|| Name ||  Age||City ||"),
            "| Name | Age | City |\n| --- | --- | --- |"
        );
    }

    #[test]
    fn test_body_rows_pass_through() {
        let text = "||A||B||\n|1|2|\n|  3 |4|";
        assert_eq!(
            convert(text),
            "| A | B |\n| --- | --- |\n|1|2|\n|  3 |4|"
        );
    }

    #[test]
    fn test_empty_header() {
        assert_eq!(convert("||||"), "|  |\n| --- |");
    }

    #[test]
    fn test_short_markers_are_not_headers() {
        assert_eq!(convert("||"), "||");
        assert_eq!(convert("|||"), "|||");
    }

    #[test]
    fn test_indent_is_kept() {
        assert_eq!(convert("  ||A||"), "  | A |\n  | --- |");
    }

    #[test]
    fn test_broken_header_is_joined() {
        assert_eq!(join_broken_headers("||A||B|\n|C||"), "||A||B||C||");
        assert_eq!(
            convert("||A||B|\n|C||\n|1|2|3|"),
            "| A | B | C |\n| --- | --- | --- |\n|1|2|3|"
        );
    }

    #[test]
    fn test_header_spanning_many_lines() {
        assert_eq!(
            convert("||A|\n|B|\n  |C||"),
            "| A | B | C |\n| --- | --- | --- |"
        );
    }

    #[test]
    fn test_ordinary_rows_are_not_joined() {
        let text = "|a|b|\n|c|d|";
        assert_eq!(join_broken_headers(text), text);
    }

    #[test]
    fn test_unterminated_header_at_end() {
        assert_eq!(convert("||A||B|"), "||A||B|");
    }

    #[test]
    fn test_short_markers_do_not_start_a_join() {
        assert_eq!(convert("||\n|a|b|"), "||\n|a|b|");
        assert_eq!(convert("|||\n|a|b|"), "|||\n|a|b|");
        assert_eq!(convert("  |||\n|a|b|\n|c|d|"), "  |||\n|a|b|\n|c|d|");
    }

    #[test]
    fn test_header_never_closed_keeps_body_rows() {
        let text = "||A||B|\n|1|2|\n|3|4|";
        assert_eq!(join_broken_headers(text), text);
        assert_eq!(convert(text), text);

        let text = "||A||B|\n|1|2|\n|3|4|\n\nafter";
        assert_eq!(convert(text), text);
    }

    #[test]
    fn test_converted_output_is_stable() {
        let once = convert("||A||B||\n|1|2|");
        assert_eq!(convert(&once), once);
    }

    #[test]
    fn test_crlf_header() {
        assert_eq!(convert("||A||B||\r\n|1|2|"), "| A | B |\n| --- | --- |\n|1|2|");
    }
}
