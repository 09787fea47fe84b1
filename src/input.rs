//! Key bindings: arrows, vim (hjkl) and wasd.

use crate::moves::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Restart,
    /// Start from the menu, or keep playing after a win.
    Continue,
    Quit,
    None,
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Up => Action::Move(Direction::Up),
        KeyCode::Down => Action::Move(Direction::Down),
        KeyCode::Left => Action::Move(Direction::Left),
        KeyCode::Right => Action::Move(Direction::Right),
        KeyCode::Esc => Action::Quit,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Continue,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'k' | 'w' => Action::Move(Direction::Up),
            'j' | 's' => Action::Move(Direction::Down),
            'h' | 'a' => Action::Move(Direction::Left),
            'l' | 'd' => Action::Move(Direction::Right),
            'r' => Action::Restart,
            'c' => Action::Continue,
            'q' => Action::Quit,
            _ => Action::None,
        },
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_arrow_and_letter_bindings_agree() {
        let none = KeyModifiers::NONE;
        let pairs = [
            (KeyCode::Up, 'k', 'w', Direction::Up),
            (KeyCode::Down, 'j', 's', Direction::Down),
            (KeyCode::Left, 'h', 'a', Direction::Left),
            (KeyCode::Right, 'l', 'd', Direction::Right),
        ];
        for (arrow, vim, wasd, dir) in pairs {
            assert_eq!(key_to_action(key(arrow, none)), Action::Move(dir));
            assert_eq!(key_to_action(key(KeyCode::Char(vim), none)), Action::Move(dir));
            assert_eq!(key_to_action(key(KeyCode::Char(wasd), none)), Action::Move(dir));
        }
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('R'), KeyModifiers::SHIFT)), Action::Restart);
        assert_eq!(key_to_action(key(KeyCode::Left, KeyModifiers::ALT)), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Enter, KeyModifiers::NONE)), Action::Continue);
    }
}
