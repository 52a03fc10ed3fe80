use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PickerAction {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    KillToStart,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PickerOutcome {
    Continue,
    Confirm(usize),
    Cancel,
}

pub(crate) fn key_action(key: KeyEvent) -> Option<PickerAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Esc => PickerAction::Cancel,
        KeyCode::Enter => PickerAction::Confirm,
        KeyCode::Backspace => PickerAction::Backspace,
        KeyCode::Delete => PickerAction::Delete,
        KeyCode::Left => PickerAction::Left,
        KeyCode::Right => PickerAction::Right,
        KeyCode::Up => PickerAction::Up,
        KeyCode::Down => PickerAction::Down,
        KeyCode::Home => PickerAction::LineStart,
        KeyCode::End => PickerAction::LineEnd,
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'c' => PickerAction::Cancel,
            'p' => PickerAction::Up,
            'n' => PickerAction::Down,
            'a' => PickerAction::LineStart,
            'e' => PickerAction::LineEnd,
            'u' => PickerAction::KillToStart,
            _ => return None,
        },
        KeyCode::Char(c) => PickerAction::Insert(c),
        _ => return None,
    };
    Some(action)
}

/// Query text, cursor and list position of a running picker. The cursor counts
/// characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PickerState {
    pub(crate) query: String,
    pub(crate) cursor: usize,
    pub(crate) highlighted: usize,
    pub(crate) scroll: usize,
    pub(crate) viewport: usize,
}

impl PickerState {
    pub(crate) fn query_len(&self) -> usize {
        self.query.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.query
            .char_indices()
            .nth(char_index)
            .map(|(index, _)| index)
            .unwrap_or(self.query.len())
    }

    /// Re-establishes the highlight and scroll invariants for a view of
    /// `filtered_len` rows.
    pub(crate) fn clamp(&mut self, filtered_len: usize) {
        if filtered_len == 0 {
            self.highlighted = 0;
        } else if self.highlighted >= filtered_len {
            self.highlighted = filtered_len - 1;
        }
        self.follow_highlight(filtered_len);
    }

    pub(crate) fn set_viewport(&mut self, rows: usize, filtered_len: usize) {
        self.viewport = rows;
        self.follow_highlight(filtered_len);
    }

    fn follow_highlight(&mut self, filtered_len: usize) {
        let rows = self.viewport.max(1);
        if self.highlighted < self.scroll {
            self.scroll = self.highlighted;
        } else if self.highlighted >= self.scroll + rows {
            self.scroll = self.highlighted + 1 - rows;
        }
        let max_scroll = filtered_len.saturating_sub(rows);
        if self.scroll > max_scroll {
            self.scroll = max_scroll;
        }
    }

    pub(crate) fn apply(&mut self, action: PickerAction, filtered_len: usize) -> PickerOutcome {
        match action {
            PickerAction::Insert(c) => {
                let at = self.byte_index(self.cursor);
                self.query.insert(at, c);
                self.cursor += 1;
                self.highlighted = 0;
            }
            PickerAction::Backspace => {
                if self.cursor > 0 {
                    let at = self.byte_index(self.cursor - 1);
                    self.query.remove(at);
                    self.cursor -= 1;
                }
            }
            PickerAction::Delete => {
                if self.cursor < self.query_len() {
                    let at = self.byte_index(self.cursor);
                    self.query.remove(at);
                }
            }
            PickerAction::Left => self.cursor = self.cursor.saturating_sub(1),
            PickerAction::Right => {
                if self.cursor < self.query_len() {
                    self.cursor += 1;
                }
            }
            PickerAction::Up => self.highlighted = self.highlighted.saturating_sub(1),
            PickerAction::Down => {
                if self.highlighted + 1 < filtered_len {
                    self.highlighted += 1;
                }
            }
            PickerAction::LineStart => self.cursor = 0,
            PickerAction::LineEnd => self.cursor = self.query_len(),
            PickerAction::KillToStart => {
                let at = self.byte_index(self.cursor);
                self.query.replace_range(..at, "");
                self.cursor = 0;
            }
            PickerAction::Confirm => {
                if filtered_len > 0 {
                    return PickerOutcome::Confirm(self.highlighted.min(filtered_len - 1));
                }
            }
            PickerAction::Cancel => return PickerOutcome::Cancel,
        }
        PickerOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> PickerState {
        let mut state = PickerState::default();
        for c in text.chars() {
            state.apply(PickerAction::Insert(c), 10);
        }
        state
    }

    #[test]
    fn insert_resets_highlight() {
        let mut state = PickerState::default();
        state.apply(PickerAction::Down, 5);
        state.apply(PickerAction::Down, 5);
        assert_eq!(state.highlighted, 2);
        state.apply(PickerAction::Insert('x'), 5);
        assert_eq!(state.highlighted, 0);
        assert_eq!(state.query, "x");
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn editing_respects_cursor_position() {
        let mut state = typed("prod");
        state.apply(PickerAction::Left, 0);
        state.apply(PickerAction::Left, 0);
        state.apply(PickerAction::Backspace, 0);
        assert_eq!(state.query, "pod");
        assert_eq!(state.cursor, 1);
        state.apply(PickerAction::Delete, 0);
        assert_eq!(state.query, "pd");
        state.apply(PickerAction::Insert('r'), 0);
        assert_eq!(state.query, "prd");
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn edits_are_noops_at_boundaries() {
        let mut state = typed("ab");
        state.apply(PickerAction::Delete, 0);
        assert_eq!(state.query, "ab");
        state.apply(PickerAction::Right, 0);
        assert_eq!(state.cursor, 2);
        state.apply(PickerAction::LineStart, 0);
        state.apply(PickerAction::Backspace, 0);
        state.apply(PickerAction::Left, 0);
        assert_eq!(state.query, "ab");
        assert_eq!(state.cursor, 0);
        state.apply(PickerAction::LineEnd, 0);
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn kill_to_start_drops_text_before_cursor() {
        let mut state = typed("prod web");
        for _ in 0..3 {
            state.apply(PickerAction::Left, 0);
        }
        state.apply(PickerAction::KillToStart, 0);
        assert_eq!(state.query, "web");
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn multibyte_characters_are_edited_whole() {
        let mut state = typed("näh");
        state.apply(PickerAction::Left, 0);
        state.apply(PickerAction::Backspace, 0);
        assert_eq!(state.query, "nh");
        state.apply(PickerAction::Insert('ö'), 0);
        assert_eq!(state.query, "nöh");
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn highlight_is_clamped_without_wraparound() {
        let mut state = PickerState::default();
        state.apply(PickerAction::Up, 3);
        assert_eq!(state.highlighted, 0);
        for _ in 0..10 {
            state.apply(PickerAction::Down, 3);
        }
        assert_eq!(state.highlighted, 2);
        state.clamp(1);
        assert_eq!(state.highlighted, 0);
        state.apply(PickerAction::Down, 0);
        state.clamp(0);
        assert_eq!(state.highlighted, 0);
    }

    #[test]
    fn highlight_invariant_holds_for_mixed_sequences() {
        let actions = [
            PickerAction::Down,
            PickerAction::Down,
            PickerAction::Insert('a'),
            PickerAction::Down,
            PickerAction::Backspace,
            PickerAction::Down,
            PickerAction::Down,
            PickerAction::Up,
            PickerAction::KillToStart,
            PickerAction::Down,
        ];
        let sizes = [7usize, 0, 1, 4];
        let mut state = PickerState::default();
        for (step, action) in actions.iter().cycle().take(60).enumerate() {
            let len = sizes[step % sizes.len()];
            state.clamp(len);
            state.apply(*action, len);
            state.clamp(len);
            if len == 0 {
                assert_eq!(state.highlighted, 0);
            } else {
                assert!(state.highlighted < len);
            }
        }
    }

    #[test]
    fn confirm_requires_matches() {
        let mut state = PickerState::default();
        assert_eq!(state.apply(PickerAction::Confirm, 0), PickerOutcome::Continue);
        state.apply(PickerAction::Down, 4);
        assert_eq!(state.apply(PickerAction::Confirm, 4), PickerOutcome::Confirm(1));
        assert_eq!(state.apply(PickerAction::Cancel, 4), PickerOutcome::Cancel);
    }

    #[test]
    fn scroll_follows_highlight() {
        let mut state = PickerState::default();
        state.set_viewport(3, 10);
        for _ in 0..4 {
            state.apply(PickerAction::Down, 10);
            state.clamp(10);
        }
        assert_eq!(state.highlighted, 4);
        assert_eq!(state.scroll, 2);
        for _ in 0..4 {
            state.apply(PickerAction::Up, 10);
            state.clamp(10);
        }
        assert_eq!(state.highlighted, 0);
        assert_eq!(state.scroll, 0);
    }

    #[test]
    fn scroll_shrinks_with_filtered_view() {
        let mut state = PickerState::default();
        state.set_viewport(3, 10);
        for _ in 0..9 {
            state.apply(PickerAction::Down, 10);
        }
        state.clamp(10);
        assert_eq!(state.scroll, 7);
        state.clamp(2);
        assert_eq!(state.highlighted, 1);
        assert_eq!(state.scroll, 0);
    }

    #[test]
    fn keys_map_to_actions() {
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(key_action(ctrl('c')), Some(PickerAction::Cancel));
        assert_eq!(key_action(ctrl('u')), Some(PickerAction::KillToStart));
        assert_eq!(key_action(ctrl('p')), Some(PickerAction::Up));
        assert_eq!(key_action(ctrl('x')), None);
        assert_eq!(key_action(plain(KeyCode::Esc)), Some(PickerAction::Cancel));
        assert_eq!(
            key_action(plain(KeyCode::Char('W'))),
            Some(PickerAction::Insert('W'))
        );
        assert_eq!(key_action(plain(KeyCode::F(2))), None);
    }
}
