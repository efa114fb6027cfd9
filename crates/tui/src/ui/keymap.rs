use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Refresh,
    Dismiss,
    NextField,
    PrevField,
    Submit,
    Backspace,
    Left,
    Right,
    Input(char),
    None,
}

pub fn map_key(key: KeyEvent) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => AppAction::Quit,
            KeyCode::Char('r') => AppAction::Refresh,
            _ => AppAction::None,
        };
    }

    // Plain letters are text input; quitting needs a modifier.
    match key.code {
        KeyCode::Esc => AppAction::Dismiss,
        KeyCode::Tab => AppAction::NextField,
        KeyCode::BackTab => AppAction::PrevField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Left => AppAction::Left,
        KeyCode::Right => AppAction::Right,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn control_chords() {
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppAction::Quit
        );
        assert_eq!(
            map_key(key(KeyCode::Char('r'), KeyModifiers::CONTROL)),
            AppAction::Refresh
        );
        assert_eq!(
            map_key(key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            AppAction::None
        );
    }

    #[test]
    fn letters_are_input() {
        assert_eq!(
            map_key(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            AppAction::Input('q')
        );
        assert_eq!(
            map_key(key(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            AppAction::Input('R')
        );
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(
            map_key(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            AppAction::PrevField
        );
        assert_eq!(map_key(key(KeyCode::Esc, KeyModifiers::NONE)), AppAction::Dismiss);
        assert_eq!(map_key(key(KeyCode::Left, KeyModifiers::NONE)), AppAction::Left);
    }
}
