//! Integration tests for the table dialect conversion
use mdtabs::convert::table::{convert, has_pipe_rows, join_broken_headers};
use proptest::prelude::*;

#[test]
fn test_header_marker_row() {
    assert_eq!(convert("||A||B||"), "| A | B |\n| --- | --- |");
}

#[test]
fn test_full_table_renders_body_verbatim() {
    let input = "Results:\n\n||Name||Score||\n|alice|  10|\n|bob|7 |\n\nDone.";
    let expected =
        "Results:\n\n| Name | Score |\n| --- | --- |\n|alice|  10|\n|bob|7 |\n\nDone.";
    assert_eq!(convert(input), expected);
}

#[test]
fn test_multiple_tables() {
    let input = "||a||\n|1|\n\ntext\n\n||b||c||\n|2|3|";
    let expected = "| a |\n| --- |\n|1|\n\ntext\n\n| b | c |\n| --- | --- |\n|2|3|";
    assert_eq!(convert(input), expected);
}

#[test]
fn test_standard_markdown_table_untouched() {
    let input = "| a | b |\n| --- | --- |\n| 1 | 2 |";
    assert_eq!(convert(input), input);
}

#[test]
fn test_mismatched_markers_split_literally() {
    assert_eq!(convert("||a|b||c||"), "| a|b | c |\n| --- | --- |");
}

#[test]
fn test_trailing_newline_kept() {
    assert_eq!(convert("||A||\n"), "| A |\n| --- |\n");
}

#[test]
fn test_pipe_row_detection() {
    assert!(has_pipe_rows("text\n  |a|  \nmore"));
    assert!(!has_pipe_rows("a | b\n|open"));
}

#[test]
fn test_header_split_over_lines_with_body() {
    let input = "||Name||Age|\n  |City||\n|x|1|y|";
    assert_eq!(join_broken_headers(input), "||Name||Age||City||\n|x|1|y|");
    assert_eq!(
        convert(input),
        "| Name | Age | City |\n| --- | --- | --- |\n|x|1|y|"
    );
}

#[test]
fn test_unclosed_header_leaves_table_intact() {
    let input = "||Name||Age|\n|ann|3|\n|bob|7|\n\nDone.";
    assert_eq!(convert(input), input);
}

fn body_row() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9 ]{1,5}", 1..4).prop_map(|cells| format!("|{}|", cells.join("|")))
}

proptest! {
    #[test]
    fn prop_identity_without_pipe_rows(text in "[a-z #*\\-\n]{0,64}") {
        prop_assert_eq!(convert(&text), text);
    }

    #[test]
    fn prop_identity_with_inline_pipes(lines in prop::collection::vec("[a-z]{1,4} ?\\| ?[a-z]{1,4}", 0..6)) {
        let text = lines.join("\n");
        prop_assert_eq!(convert(&text), text);
    }

    #[test]
    fn prop_body_rows_pass_through(rows in prop::collection::vec(body_row(), 0..6)) {
        let mut input = String::from("||A||B||");
        let mut expected = String::from("| A | B |\n| --- | --- |");
        for row in &rows {
            input.push('\n');
            input.push_str(row);
            expected.push('\n');
            expected.push_str(row);
        }
        prop_assert_eq!(convert(&input), expected);
    }

    #[test]
    fn prop_conversion_is_idempotent(text in "[|a \t\r\n]{0,48}") {
        let once = convert(&text);
        prop_assert_eq!(convert(&once), once);
    }

    #[test]
    fn prop_header_column_count(cells in prop::collection::vec("[a-z]{0,4}", 1..6)) {
        let input = format!("||{}||", cells.join("||"));
        let output = convert(&input);
        let lines: Vec<&str> = output.split('\n').collect();
        prop_assert_eq!(lines.len(), 2);
        prop_assert_eq!(lines[1].matches("---").count(), cells.len());
    }
}
