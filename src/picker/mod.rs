use std::collections::HashSet;
use std::io;

use crossterm::event::{self, Event};
use ratatui::Terminal;
use ratatui::backend::Backend;

use crate::error::PickError;
use crate::model::Candidate;
use crate::picker::filter::rank_and_filter;
use crate::picker::state::{PickerOutcome, PickerState, key_action};
use crate::picker::terminal::TerminalGuard;
use crate::ui::constants::list_rows;
use crate::ui::{PickerView, draw_instance_picker};

pub(crate) mod filter;
pub(crate) mod state;
mod terminal;

/// Lets the operator pick one of `candidates` interactively. Instances listed in
/// `recent_ids` are shown first and highlighted.
pub(crate) fn pick(candidates: &[Candidate], recent_ids: &[String]) -> Result<Candidate, PickError> {
    if candidates.is_empty() {
        return Err(PickError::EmptyInput);
    }
    let mut guard = TerminalGuard::acquire()?;
    run_picker(guard.terminal(), candidates, recent_ids, event::read)
}

pub(crate) fn run_picker<B, F>(
    terminal: &mut Terminal<B>,
    candidates: &[Candidate],
    recent_ids: &[String],
    mut next_event: F,
) -> Result<Candidate, PickError>
where
    B: Backend,
    F: FnMut() -> io::Result<Event>,
{
    if candidates.is_empty() {
        return Err(PickError::EmptyInput);
    }
    let recent: HashSet<String> = recent_ids.iter().cloned().collect();
    let mut state = PickerState::default();

    loop {
        let filtered = rank_and_filter(candidates, &state.query, recent_ids);
        state.clamp(filtered.len());

        terminal
            .draw(|frame| {
                state.set_viewport(list_rows(frame.area().height), filtered.len());
                draw_instance_picker(
                    frame,
                    &PickerView {
                        state: &state,
                        filtered: &filtered,
                        total: candidates.len(),
                        recent: &recent,
                    },
                );
            })
            .map_err(|err| io::Error::other(format!("draw picker: {err}")))?;

        match next_event()? {
            Event::Key(key) => {
                let Some(action) = key_action(key) else {
                    continue;
                };
                match state.apply(action, filtered.len()) {
                    PickerOutcome::Continue => {}
                    PickerOutcome::Confirm(index) => return Ok(filtered[index].clone()),
                    PickerOutcome::Cancel => return Err(PickError::Cancelled),
                }
            }
            // The next draw picks up the new size.
            Event::Resize(_, _) => {}
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn fleet() -> Vec<Candidate> {
        vec![
            Candidate::new("i-1", "prod-web-1", "10.0.0.1"),
            Candidate::new("i-2", "prod-db-1", "10.0.0.2"),
            Candidate::new("i-3", "staging-web-1", "10.0.1.3"),
        ]
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn typed(text: &str) -> Vec<Event> {
        text.chars().map(|c| key(KeyCode::Char(c))).collect()
    }

    fn run(
        candidates: &[Candidate],
        recent: &[&str],
        events: Vec<Event>,
    ) -> Result<Candidate, PickError> {
        let mut terminal = Terminal::new(TestBackend::new(60, 6)).unwrap();
        let recent: Vec<String> = recent.iter().map(|id| id.to_string()).collect();
        let mut events: VecDeque<Event> = events.into();
        run_picker(&mut terminal, candidates, &recent, || {
            events
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more events"))
        })
    }

    #[test]
    fn typing_filters_and_enter_confirms() {
        let mut events = typed("prod web");
        events.push(key(KeyCode::Enter));
        let picked = run(&fleet(), &[], events).unwrap();
        assert_eq!(picked.id, "i-1");
    }

    #[test]
    fn recent_instances_come_first() {
        let events = vec![key(KeyCode::Down), key(KeyCode::Enter)];
        let picked = run(&fleet(), &["i-3"], events).unwrap();
        assert_eq!(picked.id, "i-1");
        let picked = run(&fleet(), &["i-3"], vec![key(KeyCode::Enter)]).unwrap();
        assert_eq!(picked.id, "i-3");
    }

    #[test]
    fn escape_cancels() {
        let result = run(&fleet(), &[], vec![key(KeyCode::Down), key(KeyCode::Esc)]);
        assert!(matches!(result, Err(PickError::Cancelled)));
    }

    #[test]
    fn ctrl_c_cancels() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        let result = run(&fleet(), &[], vec![ctrl_c]);
        assert!(matches!(result, Err(PickError::Cancelled)));
    }

    #[test]
    fn enter_without_matches_keeps_running() {
        let mut events = typed("nothing");
        events.push(key(KeyCode::Enter));
        events.push(Event::Key(KeyEvent::new(
            KeyCode::Char('u'),
            KeyModifiers::CONTROL,
        )));
        events.extend(typed("db"));
        events.push(key(KeyCode::Enter));
        let picked = run(&fleet(), &[], events).unwrap();
        assert_eq!(picked.id, "i-2");
    }

    #[test]
    fn highlight_survives_shrinking_view() {
        let mut events = vec![key(KeyCode::Down), key(KeyCode::Down)];
        events.extend(typed("w"));
        events.push(key(KeyCode::Backspace));
        events.extend(typed("staging"));
        events.push(key(KeyCode::Down));
        events.push(key(KeyCode::Enter));
        let picked = run(&fleet(), &[], events).unwrap();
        assert_eq!(picked.id, "i-3");
    }

    #[test]
    fn resize_does_not_change_selection() {
        let events = vec![
            key(KeyCode::Down),
            Event::Resize(40, 4),
            key(KeyCode::Enter),
        ];
        let picked = run(&fleet(), &[], events).unwrap();
        assert_eq!(picked.id, "i-2");
    }

    #[test]
    fn scrolls_to_keep_highlight_visible() {
        let many: Vec<Candidate> = (0..20)
            .map(|n| Candidate::new(format!("i-{n:02}"), format!("host-{n}"), ""))
            .collect();
        let mut events = vec![key(KeyCode::Down); 10];
        events.push(key(KeyCode::Enter));
        let picked = run(&many, &[], events).unwrap();
        assert_eq!(picked.id, "i-10");
    }

    #[test]
    fn event_source_errors_propagate() {
        let result = run(&fleet(), &[], vec![]);
        assert!(matches!(result, Err(PickError::Terminal(_))));
    }

    #[test]
    fn empty_candidates_are_rejected_before_terminal_use() {
        assert!(matches!(pick(&[], &[]), Err(PickError::EmptyInput)));
    }
}
