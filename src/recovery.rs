use serde::{Deserialize, Serialize};

/// Word positions at which a seed may be declared complete (12, 18 and 24 words)
pub const FINISH_WORD_POSITIONS: [usize; 3] = [11, 17, 23];

/// Firmware auto-completes a word after this many characters
pub const MAX_WORD_CHARACTERS: usize = 4;

/// Longest supported seed
pub const MAX_SEED_WORDS: usize = 24;

/// Auto-completion needs at least this many characters before a word can be accepted
pub const MIN_ACCEPT_CHARACTERS: usize = 3;

/// A keystroke as seen by the recovery dialog
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Letter(char),
    Space,
    Backspace,
    Confirm,
    Other,
}

/// A validated recovery input, ready to be sent to the device
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryEvent {
    Character(char),
    Delete,
    Done,
}

impl RecoveryEvent {
    /// Space: accept the device's auto-completed word
    pub fn is_word_accept(&self) -> bool {
        matches!(self, RecoveryEvent::Character(' '))
    }
}

pub fn is_finish_position(word_position: usize, character_position: usize) -> bool {
    FINISH_WORD_POSITIONS.contains(&word_position) && character_position >= MIN_ACCEPT_CHARACTERS
}

/// Turns a raw key into a recovery event, or `None` if the firmware would not accept it.
///
/// Rejected keys are not errors; the caller simply ignores them.
pub fn classify_key(
    key: Key,
    word_position: usize,
    character_position: usize,
) -> Option<RecoveryEvent> {
    match key {
        Key::Letter(c) if c.is_ascii_alphabetic() => {
            // a 5th non-space character aborts the protocol on the device
            (character_position < MAX_WORD_CHARACTERS)
                .then(|| RecoveryEvent::Character(c.to_ascii_lowercase()))
        }
        Key::Space => {
            (character_position >= MIN_ACCEPT_CHARACTERS).then_some(RecoveryEvent::Character(' '))
        }
        Key::Backspace => {
            (word_position > 0 || character_position > 0).then_some(RecoveryEvent::Delete)
        }
        Key::Confirm => {
            is_finish_position(word_position, character_position).then_some(RecoveryEvent::Done)
        }
        Key::Letter(_) | Key::Other => None,
    }
}

/// Position of an interactive recovery, one keystroke at a time
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecoverySession {
    pub word_position: usize,
    pub character_position: usize,
    pub pending_event: Option<RecoveryEvent>,
    finished: bool,
    // characters typed for each accepted word, used to step back across a word boundary
    word_lengths: Vec<usize>,
}

impl RecoverySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session resumed at a position reported by the device
    pub fn at(word_position: usize, character_position: usize) -> Self {
        let mut session = Self::new();
        session.sync(word_position, character_position);
        session
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn can_accept_word(&self) -> bool {
        !self.finished && self.character_position >= MIN_ACCEPT_CHARACTERS
    }

    pub fn can_finish(&self) -> bool {
        !self.finished && is_finish_position(self.word_position, self.character_position)
    }

    pub fn classify(&self, key: Key) -> Option<RecoveryEvent> {
        if self.finished {
            return None;
        }
        classify_key(key, self.word_position, self.character_position)
    }

    /// Applies an already validated event, returning the next state
    pub fn advance(&self, event: RecoveryEvent) -> RecoverySession {
        let mut next = self.clone();
        match event {
            accept if accept.is_word_accept() => {
                next.word_lengths.push(self.character_position);
                next.word_position += 1;
                next.character_position = 0;
            }
            RecoveryEvent::Character(_) => {
                next.character_position = (self.character_position + 1).min(MAX_WORD_CHARACTERS);
            }
            RecoveryEvent::Delete => {
                if self.character_position > 0 {
                    next.character_position -= 1;
                } else if self.word_position > 0 {
                    next.word_position -= 1;
                    next.character_position =
                        next.word_lengths.pop().unwrap_or(MAX_WORD_CHARACTERS);
                }
            }
            RecoveryEvent::Done => next.finished = true,
        }
        next
    }

    /// Classifies `key` and, when valid, records it as the pending event and moves on.
    pub fn accept_key(&mut self, key: Key) -> Option<RecoveryEvent> {
        let event = self.classify(key)?;
        *self = self.advance(event);
        self.pending_event = Some(event);
        Some(event)
    }

    pub fn take_pending(&mut self) -> Option<RecoveryEvent> {
        self.pending_event.take()
    }

    /// Adopts the position the device reported; the device is authoritative.
    ///
    /// A new request also reopens a session the device did not accept as finished.
    pub fn sync(&mut self, word_position: usize, character_position: usize) {
        let word_position = word_position.min(MAX_SEED_WORDS - 1);
        self.finished = false;
        self.pending_event = None;
        self.word_lengths.truncate(word_position);
        while self.word_lengths.len() < word_position {
            self.word_lengths.push(MAX_WORD_CHARACTERS);
        }
        self.word_position = word_position;
        self.character_position = character_position.min(MAX_WORD_CHARACTERS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_rejected_before_three_characters() {
        for pos in 0..MIN_ACCEPT_CHARACTERS {
            assert_eq!(classify_key(Key::Space, 0, pos), None);
            assert_eq!(classify_key(Key::Space, 5, pos), None);
        }
    }

    #[test]
    fn third_position_accepts_letters_and_space() {
        assert_eq!(
            classify_key(Key::Space, 2, 3),
            Some(RecoveryEvent::Character(' '))
        );
        assert_eq!(
            classify_key(Key::Letter('q'), 2, 3),
            Some(RecoveryEvent::Character('q'))
        );
    }

    #[test]
    fn fourth_position_only_accepts_space() {
        assert_eq!(
            classify_key(Key::Space, 0, 4),
            Some(RecoveryEvent::Character(' '))
        );
        for c in ['a', 'z', 'M'] {
            assert_eq!(classify_key(Key::Letter(c), 0, 4), None);
        }
    }

    #[test]
    fn letters_are_lowercased() {
        assert_eq!(
            classify_key(Key::Letter('Q'), 0, 0),
            Some(RecoveryEvent::Character('q'))
        );
    }

    #[test]
    fn non_ascii_letters_rejected() {
        assert_eq!(classify_key(Key::Letter('é'), 0, 0), None);
        assert_eq!(classify_key(Key::Letter('7'), 0, 0), None);
        assert_eq!(classify_key(Key::Other, 3, 3), None);
    }

    #[test]
    fn done_only_at_finish_positions() {
        for word in FINISH_WORD_POSITIONS {
            assert_eq!(
                classify_key(Key::Confirm, word, 3),
                Some(RecoveryEvent::Done)
            );
            assert_eq!(
                classify_key(Key::Confirm, word, 4),
                Some(RecoveryEvent::Done)
            );
            assert_eq!(classify_key(Key::Confirm, word, 2), None);
        }
        assert_eq!(classify_key(Key::Confirm, 10, 3), None);
        assert_eq!(classify_key(Key::Confirm, 12, 4), None);
    }

    #[test]
    fn delete_needs_something_to_delete() {
        assert_eq!(classify_key(Key::Backspace, 0, 0), None);
        assert_eq!(
            classify_key(Key::Backspace, 0, 1),
            Some(RecoveryEvent::Delete)
        );
        assert_eq!(
            classify_key(Key::Backspace, 1, 0),
            Some(RecoveryEvent::Delete)
        );
    }

    #[test]
    fn delete_from_first_character() {
        let mut session = RecoverySession::at(0, 1);
        assert_eq!(session.accept_key(Key::Backspace), Some(RecoveryEvent::Delete));
        assert_eq!((session.word_position, session.character_position), (0, 0));
    }

    #[test]
    fn typing_a_word_walks_the_grid() {
        let mut session = RecoverySession::new();
        let mut positions = vec![];
        for key in [
            Key::Letter('c'),
            Key::Letter('a'),
            Key::Letter('t'),
            Key::Space,
        ] {
            session.accept_key(key).unwrap();
            positions.push((session.word_position, session.character_position));
        }
        assert_eq!(positions, vec![(0, 1), (0, 2), (0, 3), (1, 0)]);
    }

    #[test]
    fn delete_crosses_back_into_previous_word() {
        let mut session = RecoverySession::new();
        for c in "abcd".chars() {
            session.accept_key(Key::Letter(c));
        }
        session.accept_key(Key::Space);
        assert_eq!((session.word_position, session.character_position), (1, 0));

        session.accept_key(Key::Backspace);
        assert_eq!((session.word_position, session.character_position), (0, 4));
    }

    #[test]
    fn delete_after_sync_lands_on_last_column() {
        let next = RecoverySession::at(3, 0).advance(RecoveryEvent::Delete);
        assert_eq!((next.word_position, next.character_position), (2, 4));
    }

    #[test]
    fn invalid_key_leaves_state_untouched() {
        let mut session = RecoverySession::at(0, 4);
        let before = session.clone();
        for _ in 0..3 {
            assert_eq!(session.accept_key(Key::Letter('x')), None);
            assert_eq!(session, before);
        }
    }

    #[test]
    fn pending_event_is_consumed_once() {
        let mut session = RecoverySession::new();
        session.accept_key(Key::Letter('h'));
        assert_eq!(session.take_pending(), Some(RecoveryEvent::Character('h')));
        assert_eq!(session.take_pending(), None);
    }

    #[test]
    fn done_is_terminal() {
        let mut session = RecoverySession::at(11, 3);
        assert!(session.can_finish());
        assert_eq!(session.accept_key(Key::Confirm), Some(RecoveryEvent::Done));
        assert!(session.is_finished());
        assert_eq!(session.accept_key(Key::Backspace), None);
        assert!(!session.can_accept_word());
    }

    #[test]
    fn confirm_rejected_one_word_early() {
        let mut session = RecoverySession::at(10, 3);
        assert!(!session.can_finish());
        assert_eq!(session.accept_key(Key::Confirm), None);
    }

    #[test]
    fn sync_clamps_character_position() {
        let session = RecoverySession::at(2, 9);
        assert_eq!(session.character_position, MAX_WORD_CHARACTERS);
    }

    #[test]
    fn new_request_reopens_finished_session() {
        let mut session = RecoverySession::at(11, 3);
        session.accept_key(Key::Confirm);
        assert!(session.is_finished());

        session.sync(11, 3);
        assert!(!session.is_finished());
        assert_eq!(session.pending_event, None);
        assert_eq!(session.accept_key(Key::Confirm), Some(RecoveryEvent::Done));
    }

    #[test]
    fn sync_caps_word_position() {
        let session = RecoverySession::at(10_000, 0);
        assert_eq!(session.word_position, MAX_SEED_WORDS - 1);
        let back = session.advance(RecoveryEvent::Delete);
        assert_eq!(back.word_position, MAX_SEED_WORDS - 2);
    }

    #[test]
    fn word_accept_detection() {
        assert!(RecoveryEvent::Character(' ').is_word_accept());
        assert!(!RecoveryEvent::Character('a').is_word_accept());
        assert!(!RecoveryEvent::Done.is_word_accept());
    }
}
