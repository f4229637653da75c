use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::RecoveryError;
use crate::pin::{PinRequestKind, MATRIX_LAYOUT, PIN_MAX_LENGTH};
use crate::protocol::{CharacterAck, DeviceMessage, Features, HostMessage};
use crate::recovery::{MAX_WORD_CHARACTERS, MIN_ACCEPT_CHARACTERS};
use crate::settings::{validate_label, InitMethod, InitSettings, WordCount};

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";
const FIRMWARE_VERSION: (u32, u32, u32) = (1, 0, 0);

/// A hardware wallet as seen by the recovery driver
pub trait Device: Send {
    /// Begins initialisation and returns the device's first request
    fn start(&mut self, settings: &InitSettings) -> Result<DeviceMessage, RecoveryError>;

    fn call(&mut self, msg: HostMessage) -> Result<DeviceMessage, RecoveryError>;

    /// What the device currently shows on its own screen, if the host can know it
    fn display(&self) -> Option<String> {
        None
    }
}

/// Why the device is asking for a new PIN
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PinFlow {
    Init,
    Change,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    PinCurrent { remove: bool },
    PinFirst(PinFlow),
    PinSecond { flow: PinFlow, first: String },
    Recovery,
    Initialised,
}

/// Software stand-in for a device, enforcing the same input rules as the firmware
pub struct EmulatedDevice {
    rng: StdRng,
    phase: Phase,
    settings: InitSettings,
    device_id: String,
    initialised: bool,
    label: String,
    passphrase_protection: bool,
    pin: Option<String>,
    words: Vec<String>,
    current: String,
    // key to press for each plain letter, indexed by letter
    cipher: Vec<char>,
    // digit shown at each keypad position, indexed by position - 1
    pin_digits: Vec<char>,
}

impl EmulatedDevice {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let device_id = format!("{:024X}", rng.gen::<u128>() >> 32);
        Self {
            rng,
            phase: Phase::Idle,
            settings: InitSettings::default(),
            device_id,
            initialised: false,
            label: String::new(),
            passphrase_protection: false,
            pin: None,
            words: vec![],
            current: String::new(),
            cipher: ALPHABET.chars().collect(),
            pin_digits: ('1'..='9').collect(),
        }
    }

    /// Key the user has to press to enter `plain` under the current cipher
    pub fn cipher_key(&self, plain: char) -> Option<char> {
        ALPHABET
            .find(plain.to_ascii_lowercase())
            .map(|idx| self.cipher[idx])
    }

    /// Keypad position currently showing `digit`
    pub fn pin_position(&self, digit: char) -> Option<u8> {
        self.pin_digits
            .iter()
            .position(|d| *d == digit)
            .map(|idx| idx as u8 + 1)
    }

    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    pub fn recovered_words(&self) -> &[String] {
        &self.words
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn features(&self) -> Features {
        let (major_version, minor_version, patch_version) = FIRMWARE_VERSION;
        Features {
            label: self.label.clone(),
            device_id: self.device_id.clone(),
            initialized: self.initialised,
            pin_protection: self.pin.is_some(),
            passphrase_protection: self.passphrase_protection,
            major_version,
            minor_version,
            patch_version,
            language: "english".to_string(),
        }
    }

    /// Drops any workflow in progress; an initialised device keeps its seed
    fn reset(&mut self) {
        self.phase = if self.initialised {
            Phase::Initialised
        } else {
            self.words.clear();
            Phase::Idle
        };
        self.current.clear();
    }

    fn wipe(&mut self) -> DeviceMessage {
        log::info!("emulator wiped");
        self.initialised = false;
        self.label.clear();
        self.passphrase_protection = false;
        self.pin = None;
        self.reset();
        DeviceMessage::Success("Device wiped".to_string())
    }

    fn fail(&mut self, reason: &str) -> DeviceMessage {
        log::debug!("emulator aborting: {}", reason);
        self.reset();
        DeviceMessage::Failure(reason.to_string())
    }

    fn shuffle_cipher(&mut self) {
        self.cipher.shuffle(&mut self.rng);
    }

    fn shuffle_pin(&mut self) {
        self.pin_digits.shuffle(&mut self.rng);
    }

    fn request_pin(&mut self, kind: PinRequestKind) -> DeviceMessage {
        self.shuffle_pin();
        DeviceMessage::PinMatrixRequest(kind)
    }

    fn request_character(&mut self) -> DeviceMessage {
        self.shuffle_cipher();
        DeviceMessage::CharacterRequest {
            word_pos: self.words.len(),
            character_pos: self.current.chars().count(),
        }
    }

    fn decode_pin(&self, positions: &str) -> Option<String> {
        if positions.is_empty() || positions.len() > PIN_MAX_LENGTH {
            return None;
        }
        positions
            .chars()
            .map(|p| match p.to_digit(10) {
                Some(n @ 1..=9) => Some(self.pin_digits[n as usize - 1]),
                _ => None,
            })
            .collect()
    }

    fn decode_character(&self, key: char) -> Option<char> {
        self.cipher
            .iter()
            .position(|c| *c == key)
            .and_then(|idx| ALPHABET.chars().nth(idx))
    }

    fn complete_initialisation(&mut self) {
        self.initialised = true;
        self.phase = Phase::Initialised;
        self.label = self.settings.label.clone();
        self.passphrase_protection = self.settings.passphrase_protection;
    }

    fn after_pin(&mut self) -> DeviceMessage {
        match self.settings.method {
            InitMethod::Recover => {
                self.phase = Phase::Recovery;
                self.words.clear();
                self.current.clear();
                self.request_character()
            }
            InitMethod::New => {
                self.complete_initialisation();
                DeviceMessage::Success(format!(
                    "Device initialised with a new {} seed",
                    self.settings.word_count
                ))
            }
            InitMethod::Mnemonic | InitMethod::PrivateKey => {
                if !self.settings.pin.is_empty() {
                    self.pin = Some(self.settings.pin.clone());
                }
                self.complete_initialisation();
                DeviceMessage::Success("Device loaded".to_string())
            }
        }
    }

    fn on_new_pin(&mut self, flow: PinFlow, pin: String) -> DeviceMessage {
        self.pin = Some(pin);
        match flow {
            PinFlow::Init => self.after_pin(),
            PinFlow::Change => {
                self.phase = Phase::Initialised;
                DeviceMessage::Success("PIN changed".to_string())
            }
        }
    }

    fn on_change_pin(&mut self, remove: bool) -> DeviceMessage {
        if self.pin.is_some() {
            self.phase = Phase::PinCurrent { remove };
            return self.request_pin(PinRequestKind::Current);
        }
        self.start_pin_change(remove)
    }

    fn start_pin_change(&mut self, remove: bool) -> DeviceMessage {
        if remove {
            self.pin = None;
            self.phase = Phase::Initialised;
            return DeviceMessage::Success("PIN removed".to_string());
        }
        self.phase = Phase::PinFirst(PinFlow::Change);
        self.request_pin(PinRequestKind::NewFirst)
    }

    fn on_apply_settings(
        &mut self,
        label: Option<String>,
        use_passphrase: Option<bool>,
    ) -> DeviceMessage {
        if label.is_none() && use_passphrase.is_none() {
            return self.fail("No setting provided");
        }
        if let Some(label) = label {
            match validate_label(&label) {
                Ok(label) => self.label = label,
                Err(_) => return self.fail("Label too long"),
            }
        }
        if let Some(enabled) = use_passphrase {
            self.passphrase_protection = enabled;
        }
        DeviceMessage::Success("Settings applied".to_string())
    }

    fn on_character(&mut self, ack: CharacterAck) -> DeviceMessage {
        let typed = self.current.chars().count();

        if ack.done {
            let total = self.words.len() + 1;
            let complete = WordCount::try_from(total)
                .map(|count| count.words() <= self.settings.word_count.words())
                .unwrap_or(false);
            if !complete || typed < MIN_ACCEPT_CHARACTERS {
                return self.fail("Seed is incomplete");
            }
            self.words.push(std::mem::take(&mut self.current));
            self.complete_initialisation();
            return DeviceMessage::Success(format!("Device recovered with {} words", total));
        }

        if ack.delete {
            if self.current.pop().is_none() {
                if let Some(previous) = self.words.pop() {
                    self.current = previous;
                }
            }
            return self.request_character();
        }

        match ack.character {
            Some(' ') => {
                if typed < MIN_ACCEPT_CHARACTERS {
                    return self.fail("Word too short to auto-complete");
                }
                if self.words.len() >= self.settings.word_count.last_word_position() {
                    return self.fail("Too many words");
                }
                self.words.push(std::mem::take(&mut self.current));
                self.request_character()
            }
            Some(key) => {
                if typed >= MAX_WORD_CHARACTERS {
                    return self.fail("Too many characters");
                }
                match self.decode_character(key) {
                    Some(plain) => {
                        self.current.push(plain);
                        self.request_character()
                    }
                    None => self.fail("Invalid character"),
                }
            }
            None => self.fail("Empty character acknowledgement"),
        }
    }
}

impl Default for EmulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for EmulatedDevice {
    fn start(&mut self, settings: &InitSettings) -> Result<DeviceMessage, RecoveryError> {
        if self.initialised {
            return Ok(self.fail("Device is already initialized. Use Wipe first."));
        }
        self.settings = settings.clone().validated()?;
        self.reset();
        log::info!("emulator starting {} initialisation", self.settings.method);

        if self.settings.pin_protection && self.settings.method.uses_word_count() {
            self.phase = Phase::PinFirst(PinFlow::Init);
            return Ok(self.request_pin(PinRequestKind::NewFirst));
        }
        Ok(self.after_pin())
    }

    fn call(&mut self, msg: HostMessage) -> Result<DeviceMessage, RecoveryError> {
        log::debug!("emulator received {} in {:?}", msg.kind(), self.phase);
        let reply = match (self.phase.clone(), msg) {
            (_, HostMessage::Cancel) => self.fail("Action cancelled by user"),
            (_, HostMessage::WipeDevice) => self.wipe(),
            (Phase::Idle | Phase::Initialised, HostMessage::GetFeatures) => {
                DeviceMessage::Features(self.features())
            }
            (Phase::Idle, HostMessage::ApplySettings { .. } | HostMessage::ChangePin { .. }) => {
                self.fail("Device not initialized")
            }
            (Phase::Initialised, HostMessage::ApplySettings { label, use_passphrase }) => {
                self.on_apply_settings(label, use_passphrase)
            }
            (Phase::Initialised, HostMessage::ChangePin { remove }) => self.on_change_pin(remove),
            (Phase::PinCurrent { remove }, HostMessage::PinMatrixAck(positions)) => {
                match self.decode_pin(&positions) {
                    Some(current) if self.pin.as_deref() == Some(current.as_str()) => {
                        self.start_pin_change(remove)
                    }
                    _ => self.fail("Invalid PIN"),
                }
            }
            (Phase::PinFirst(flow), HostMessage::PinMatrixAck(positions)) => {
                match self.decode_pin(&positions) {
                    Some(first) => {
                        self.phase = Phase::PinSecond { flow, first };
                        self.request_pin(PinRequestKind::NewSecond)
                    }
                    None => self.fail("Invalid PIN"),
                }
            }
            (Phase::PinSecond { flow, first }, HostMessage::PinMatrixAck(positions)) => {
                match self.decode_pin(&positions) {
                    Some(second) if second == first => self.on_new_pin(flow, second),
                    _ => self.fail("PIN mismatch"),
                }
            }
            (Phase::Recovery, HostMessage::CharacterAck(ack)) => self.on_character(ack),
            (_, other) => {
                let reason = format!("Unexpected message {}", other.kind());
                self.fail(&reason)
            }
        };
        Ok(reply)
    }

    fn display(&self) -> Option<String> {
        match self.phase {
            Phase::Recovery => Some(format!(
                "letter  {}\npress   {}",
                ALPHABET.chars().join(" "),
                self.cipher.iter().join(" ")
            )),
            Phase::PinCurrent { .. } | Phase::PinFirst(_) | Phase::PinSecond { .. } => Some(
                MATRIX_LAYOUT
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|pos| self.pin_digits[*pos as usize - 1])
                            .join(" ")
                    })
                    .join("\n"),
            ),
            Phase::Idle | Phase::Initialised => None,
        }
    }
}
