use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};

use crate::model::Candidate;
use crate::picker::state::PickerState;
use crate::ui::constants::{
    HELP_HEIGHT, HELP_TEXT, NO_MATCHES_LABEL, PROMPT, QUERY_HEIGHT, SEPARATOR_HEIGHT,
};
use crate::ui::helpers::{instance_line, list_state};

/// Everything one frame of the instance picker shows.
pub(crate) struct PickerView<'a> {
    pub(crate) state: &'a PickerState,
    pub(crate) filtered: &'a [Candidate],
    pub(crate) total: usize,
    pub(crate) recent: &'a HashSet<String>,
}

pub(crate) fn draw_instance_picker(frame: &mut Frame<'_>, view: &PickerView<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(QUERY_HEIGHT),
                Constraint::Length(SEPARATOR_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(HELP_HEIGHT),
            ]
            .as_ref(),
        )
        .split(frame.area());

    let prompt_style = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);
    let count_style = Style::default().fg(Color::Yellow);
    let dim_style = Style::default().fg(Color::Gray);

    let query_line = Line::from(vec![
        Span::styled(PROMPT, prompt_style),
        Span::raw(view.state.query.clone()),
        Span::styled(
            format!("  {}/{}", view.filtered.len(), view.total),
            count_style,
        ),
    ]);
    frame.render_widget(Paragraph::new(query_line), layout[0]);

    let separator = "─".repeat(usize::from(layout[1].width));
    frame.render_widget(Paragraph::new(separator).style(dim_style), layout[1]);

    let rows = usize::from(layout[2].height);
    let start = view.state.scroll.min(view.filtered.len());
    let end = (start + rows).min(view.filtered.len());
    let visible = &view.filtered[start..end];

    if visible.is_empty() {
        frame.render_widget(
            Paragraph::new(NO_MATCHES_LABEL).style(dim_style),
            layout[2],
        );
    } else {
        let recent_style = Style::default().fg(Color::Yellow);
        let items: Vec<ListItem> = visible
            .iter()
            .map(|candidate| {
                let item = ListItem::new(instance_line(candidate));
                if view.recent.contains(&candidate.id) {
                    item.style(recent_style)
                } else {
                    item
                }
            })
            .collect();
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(PROMPT);
        let selected = view.state.highlighted.saturating_sub(start);
        frame.render_stateful_widget(
            list,
            layout[2],
            &mut list_state(selected, visible.len()),
        );
    }

    frame.render_widget(Paragraph::new(HELP_TEXT).style(dim_style), layout[3]);

    let before_cursor: usize = view
        .state
        .query
        .chars()
        .take(view.state.cursor)
        .count();
    let cursor_x = layout[0]
        .x
        .saturating_add((PROMPT.len() + before_cursor) as u16)
        .min(layout[0].right().saturating_sub(1));
    frame.set_cursor_position(Position::new(cursor_x, layout[0].y));
}
