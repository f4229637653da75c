use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::pin::PinKey;
use crate::recovery::Key;

/// Keys handled by the application itself rather than the active dialog
pub fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}

/// Key releases are reported on some platforms; only presses count
pub fn is_press(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
}

impl From<KeyEvent> for Key {
    fn from(key: KeyEvent) -> Self {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return Key::Other;
        }
        match key.code {
            KeyCode::Char(' ') => Key::Space,
            KeyCode::Char(c) => Key::Letter(c),
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Enter => Key::Confirm,
            _ => Key::Other,
        }
    }
}

impl From<KeyEvent> for PinKey {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Char(c @ '1'..='9') => PinKey::Position(c as u8 - b'0'),
            KeyCode::Backspace => PinKey::Backspace,
            KeyCode::Enter => PinKey::Confirm,
            _ => PinKey::Other,
        }
    }
}
