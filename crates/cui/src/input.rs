use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    NextFocus,
    PrevFocus,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Toggle,
    Activate,
    Back,
    Day,
    Night,
    ResetSession,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
        KeyCode::Esc => InputAction::Back,
        KeyCode::Tab => InputAction::NextFocus,
        KeyCode::BackTab => InputAction::PrevFocus,
        KeyCode::Up => InputAction::MoveUp,
        KeyCode::Down => InputAction::MoveDown,
        KeyCode::Left => InputAction::MoveLeft,
        KeyCode::Right => InputAction::MoveRight,
        KeyCode::Enter => InputAction::Activate,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Char(' ') => InputAction::Toggle,
        KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Char('h') => InputAction::MoveLeft,
        KeyCode::Char('l') => InputAction::MoveRight,
        KeyCode::Char('d') => InputAction::Day,
        KeyCode::Char('n') => InputAction::Night,
        KeyCode::Char('R') => InputAction::ResetSession,
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_basic_actions() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            InputAction::Activate
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)),
            InputAction::Toggle
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            InputAction::Quit
        );
    }

    #[test]
    fn maps_phase_and_quit_shortcuts() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)),
            InputAction::Night
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE)),
            InputAction::Day
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            InputAction::Quit
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            InputAction::ResetSession
        );
    }
}
