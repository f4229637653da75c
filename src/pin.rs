use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Positions on the device's scrambled keypad, top row first
pub const MATRIX_LAYOUT: [[u8; 3]; 3] = [[7, 8, 9], [4, 5, 6], [1, 2, 3]];

pub const PIN_MAX_LENGTH: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinRequestKind {
    Current,
    NewFirst,
    NewSecond,
}

impl PinRequestKind {
    pub fn title(&self) -> &'static str {
        match self {
            PinRequestKind::Current => "Enter your current PIN",
            PinRequestKind::NewFirst => "Enter a new PIN",
            PinRequestKind::NewSecond => "Re-enter the new PIN",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinKey {
    Position(u8),
    Backspace,
    Confirm,
    Other,
}

/// PIN entered as keypad positions; the host never learns the digits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PinMatrix {
    positions: String,
}

impl PinMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the position is out of range or the PIN is full
    pub fn push(&mut self, position: u8) -> bool {
        if !(1..=9).contains(&position) || self.positions.len() >= PIN_MAX_LENGTH {
            return false;
        }
        self.positions.push(char::from(b'0' + position));
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.positions.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn value(&self) -> &str {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn masked(&self) -> String {
        (0..self.positions.len()).map(|_| '*').join("")
    }

    /// Handles one key; returns the finished value on a confirm with a non-empty PIN.
    pub fn on_key(&mut self, key: PinKey) -> Option<String> {
        match key {
            PinKey::Position(p) => {
                self.push(p);
                None
            }
            PinKey::Backspace => {
                self.backspace();
                None
            }
            PinKey::Confirm if !self.is_empty() => {
                let value = self.positions.clone();
                self.clear();
                Some(value)
            }
            PinKey::Confirm | PinKey::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_accepts_only_keypad_positions() {
        let mut pin = PinMatrix::new();
        assert!(!pin.push(0));
        assert!(!pin.push(10));
        assert!(pin.push(1));
        assert!(pin.push(9));
        assert_eq!(pin.value(), "19");
    }

    #[test]
    fn push_stops_at_max_length() {
        let mut pin = PinMatrix::new();
        for _ in 0..PIN_MAX_LENGTH {
            assert!(pin.push(5));
        }
        assert!(!pin.push(5));
        assert_eq!(pin.len(), PIN_MAX_LENGTH);
    }

    #[test]
    fn masked_hides_positions() {
        let mut pin = PinMatrix::new();
        pin.push(3);
        pin.push(7);
        assert_eq!(pin.masked(), "**");
    }

    #[test]
    fn empty_pin_cannot_be_confirmed() {
        let mut pin = PinMatrix::new();
        assert_eq!(pin.on_key(PinKey::Confirm), None);
        assert!(!pin.backspace());
    }

    #[test]
    fn confirm_returns_value_and_resets() {
        let mut pin = PinMatrix::new();
        pin.on_key(PinKey::Position(4));
        pin.on_key(PinKey::Position(2));
        pin.on_key(PinKey::Backspace);
        pin.on_key(PinKey::Position(8));
        pin.on_key(PinKey::Other);
        assert_eq!(pin.on_key(PinKey::Confirm), Some("48".to_string()));
        assert!(pin.is_empty());
    }

    #[test]
    fn layout_covers_each_position_once() {
        let mut all: Vec<u8> = MATRIX_LAYOUT.iter().flatten().copied().collect();
        all.sort();
        assert_eq!(all, (1..=9).collect::<Vec<u8>>());
    }
}
