//! Key bindings: arrows or vim keys move the cursor; Shift swipes the tile under it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use matchtui::Direction;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Cursor(Direction),
    /// Swap the tile under the cursor with its neighbour.
    Swipe(Direction),
    /// Select / confirm.
    Select,
    Pause,
    Quit,
    NextLevel,
    Retry,
    FirstLevel,
    None,
}

/// Map key event to game action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    if modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER) {
        return Action::None;
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    match code {
        KeyCode::Up if shift => Action::Swipe(Direction::Up),
        KeyCode::Down if shift => Action::Swipe(Direction::Down),
        KeyCode::Left if shift => Action::Swipe(Direction::Left),
        KeyCode::Right if shift => Action::Swipe(Direction::Right),
        // Some terminals report Shift+k as lowercase with SHIFT set.
        KeyCode::Char('K') => Action::Swipe(Direction::Up),
        KeyCode::Char('k') if shift => Action::Swipe(Direction::Up),
        KeyCode::Char('J') => Action::Swipe(Direction::Down),
        KeyCode::Char('j') if shift => Action::Swipe(Direction::Down),
        KeyCode::Char('H') => Action::Swipe(Direction::Left),
        KeyCode::Char('h') if shift => Action::Swipe(Direction::Left),
        KeyCode::Char('L') => Action::Swipe(Direction::Right),
        KeyCode::Char('l') if shift => Action::Swipe(Direction::Right),
        KeyCode::Up | KeyCode::Char('k') => Action::Cursor(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Cursor(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Action::Cursor(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Cursor(Direction::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Char('p') | KeyCode::Char('P') => Action::Pause,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') => Action::NextLevel,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Retry,
        KeyCode::Char('m') | KeyCode::Char('M') => Action::FirstLevel,
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
    fn test_plain_and_vim_cursor() {
        assert_eq!(
            key_to_action(key(KeyCode::Left, KeyModifiers::NONE)),
            Action::Cursor(Direction::Left)
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Action::Cursor(Direction::Down)
        );
    }

    #[test]
    fn test_shift_swipes() {
        assert_eq!(
            key_to_action(key(KeyCode::Right, KeyModifiers::SHIFT)),
            Action::Swipe(Direction::Right)
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('K'), KeyModifiers::SHIFT)),
            Action::Swipe(Direction::Up)
        );
    }

    #[test]
    fn test_ctrl_c_quits_and_alt_is_ignored() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('q'), KeyModifiers::ALT)),
            Action::None
        );
    }
}
