use ratatui::widgets::ListState;

use crate::model::Candidate;
use crate::ui::constants::{NAME_COLUMN_WIDTH, NO_NAME_LABEL};

pub(crate) fn truncate_text(value: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let count = value.chars().count();
    if count <= max_width {
        return value.to_string();
    }
    if max_width <= 3 {
        return value.chars().take(max_width).collect();
    }
    let mut trimmed: String = value.chars().take(max_width - 3).collect();
    trimmed.push_str("...");
    trimmed
}

pub(crate) fn instance_line(candidate: &Candidate) -> String {
    let name = if candidate.display_name.is_empty() {
        NO_NAME_LABEL
    } else {
        candidate.display_name.as_str()
    };
    let name = truncate_text(name, NAME_COLUMN_WIDTH);
    format!(
        "{}  {name:<width$}  {}",
        candidate.id,
        candidate.address,
        width = NAME_COLUMN_WIDTH
    )
}

pub(crate) fn list_state(selected: usize, len: usize) -> ListState {
    let mut state = ListState::default();
    if len == 0 {
        state.select(None);
    } else {
        state.select(Some(selected.min(len.saturating_sub(1))));
    }
    state
}
