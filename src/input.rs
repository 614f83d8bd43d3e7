//! Key bindings: arrows plus vim-style letters.

use crate::game::Input;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateCw,
    RotateCcw,
    SoftDrop,
    HardDrop,
    Start,
    Pause,
    Restart,
    Quit,
    None,
}

impl Action {
    /// Game input for this action; `None` for actions the app handles itself.
    pub fn as_input(self) -> Option<Input> {
        match self {
            Self::MoveLeft => Some(Input::MoveLeft),
            Self::MoveRight => Some(Input::MoveRight),
            Self::RotateCw => Some(Input::RotateCw),
            Self::RotateCcw => Some(Input::RotateCcw),
            Self::SoftDrop => Some(Input::SoftDrop),
            Self::HardDrop => Some(Input::HardDrop),
            Self::Start => Some(Input::Start),
            Self::Pause => Some(Input::TogglePause),
            Self::Restart => Some(Input::Restart),
            Self::Quit | Self::None => None,
        }
    }
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') => Action::Pause,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Enter | KeyCode::Char('s') => Action::Start,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('x') => Action::RotateCw,
        KeyCode::Char('z') | KeyCode::Char('u') => Action::RotateCcw,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Char(' ') => Action::HardDrop,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::RotateCw);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::HardDrop);
    }

    #[test]
    fn test_vim_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('l'))), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::RotateCw);
        assert_eq!(key_to_action(key(KeyCode::Char('u'))), Action::RotateCcw);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::SoftDrop);
    }

    #[test]
    fn test_session_keys() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Start);
        assert_eq!(key_to_action(key(KeyCode::Char('p'))), Action::Pause);
        assert_eq!(key_to_action(key(KeyCode::Char('r'))), Action::Restart);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_modified_keys_are_ignored() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)),
            Action::None
        );
        assert_eq!(key_to_action(key(KeyCode::Char('w'))), Action::None);
    }

    #[test]
    fn test_actions_map_to_inputs() {
        assert_eq!(Action::Pause.as_input(), Some(Input::TogglePause));
        assert_eq!(Action::RotateCcw.as_input(), Some(Input::RotateCcw));
        assert_eq!(Action::Quit.as_input(), None);
        assert_eq!(Action::None.as_input(), None);
    }
}
