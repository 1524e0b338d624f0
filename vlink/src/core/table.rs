//! Header-anchored parsing for the plain-text tables the deployment CLI prints.
//!
//! The CLI surrounds its tables with progress chatter (`> Fetching teams`,
//! spinners, hints). Only lines after the header row are data; everything
//! before it is ignored.

/// Characters that may appear at the start of an identifier column.
fn is_identifier_start(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@')
}

/// Locate the header row: the first line containing every label (case-sensitive).
///
/// Returns the index of that line within `text.lines()`.
pub fn find_header(text: &str, labels: &[&str]) -> Option<usize> {
    text.lines()
        .position(|line| labels.iter().all(|label| line.contains(label)))
}

/// Strip a single leading status glyph (e.g. the `✔` marking the current team).
pub fn strip_status_glyph(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.chars().next() {
        Some(c) if !is_identifier_start(c) => trimmed[c.len_utf8()..].trim_start(),
        _ => trimmed,
    }
}

/// Progress and hint lines the CLI prefixes with `>`.
fn is_cli_hint(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

/// Parse the rows following the header into whitespace-separated columns.
///
/// Returns `None` when no header row is present. Blank rows and `>` lines
/// (CLI hints such as the pagination notice) are skipped.
pub fn parse_table<'a>(text: &'a str, labels: &[&str]) -> Option<Vec<Vec<&'a str>>> {
    let header = find_header(text, labels)?;
    let rows = text
        .lines()
        .skip(header + 1)
        .filter(|line| !is_cli_hint(line))
        .map(strip_status_glyph)
        .filter(|line| !line.is_empty())
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|columns| !columns.is_empty())
        .collect();
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_before_header_are_ignored() {
        let text = "> Fetching teams\n  id    Team name\n  a     Alpha\n";
        let rows = parse_table(text, &["id", "Team name"]).expect("header");
        assert_eq!(rows, vec![vec!["a", "Alpha"]]);
    }

    #[test]
    fn missing_header_yields_none() {
        assert!(parse_table("nothing here\n", &["id", "Team name"]).is_none());
    }

    #[test]
    fn glyph_is_stripped_once() {
        assert_eq!(strip_status_glyph("✔ my-team  Mine"), "my-team  Mine");
        assert_eq!(strip_status_glyph("  plain  Row"), "plain  Row");
        assert_eq!(strip_status_glyph("> > nested"), "> nested");
    }

    #[test]
    fn hint_lines_after_rows_are_not_data() {
        let text = "  id    Team name\n✔ a     Alpha\n\n> To display the next page, run `vercel teams ls --next 1`\n";
        let rows = parse_table(text, &["id", "Team name"]).expect("header");
        assert_eq!(rows, vec![vec!["a", "Alpha"]]);
    }

    #[test]
    fn header_match_is_case_sensitive() {
        assert!(find_header("ID    TEAM NAME\n", &["id", "Team name"]).is_none());
    }
}
