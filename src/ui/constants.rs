pub(crate) const PROMPT: &str = "> ";
pub(crate) const HELP_TEXT: &str =
    "↑/↓ navigate • Enter select • Esc cancel • Type to filter (words are AND-matched)";
pub(crate) const NO_NAME_LABEL: &str = "(no name)";
pub(crate) const NO_MATCHES_LABEL: &str = "  No instances match";

pub(crate) const QUERY_HEIGHT: u16 = 1;
pub(crate) const SEPARATOR_HEIGHT: u16 = 1;
pub(crate) const HELP_HEIGHT: u16 = 1;

pub(crate) const NAME_COLUMN_WIDTH: usize = 30;

/// Rows left for the instance list in an area of `height` rows.
pub(crate) fn list_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(QUERY_HEIGHT + SEPARATOR_HEIGHT + HELP_HEIGHT))
}
