use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const XPRV_LENGTH: usize = 111;
const EXPLICIT_PIN_MAX: usize = 10;

/// Longest label the device stores
pub const MAX_LABEL_LENGTH: usize = 32;

/// How the device is initialised
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display)]
pub enum InitMethod {
    /// generate a fresh seed on the device
    New,
    /// enter an existing seed through the recovery cipher
    Recover,
    /// upload a BIP39 mnemonic
    Mnemonic,
    /// upload an xprv master key
    PrivateKey,
}

impl InitMethod {
    pub fn uses_word_count(&self) -> bool {
        matches!(self, InitMethod::New | InitMethod::Recover)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum WordCount {
    #[value(name = "12")]
    Twelve,
    #[value(name = "18")]
    Eighteen,
    #[value(name = "24")]
    TwentyFour,
}

impl WordCount {
    pub fn words(&self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::Eighteen => 18,
            WordCount::TwentyFour => 24,
        }
    }

    pub fn last_word_position(&self) -> usize {
        self.words() - 1
    }
}

impl TryFrom<usize> for WordCount {
    type Error = SettingsError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        match n {
            12 => Ok(WordCount::Twelve),
            18 => Ok(WordCount::Eighteen),
            24 => Ok(WordCount::TwentyFour),
            other => Err(SettingsError::WordCount(other)),
        }
    }
}

impl std::fmt::Display for WordCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} words", self.words())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitSettings {
    pub method: InitMethod,
    pub label: String,
    pub word_count: WordCount,
    pub pin_protection: bool,
    pub passphrase_protection: bool,
    /// mnemonic or xprv, only for the loading methods
    pub secret: String,
    /// explicit PIN, only for the loading methods
    pub pin: String,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            method: InitMethod::Recover,
            label: String::new(),
            word_count: WordCount::TwentyFour,
            pin_protection: true,
            passphrase_protection: false,
            secret: String::new(),
            pin: String::new(),
        }
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_xprv(text: &str) -> bool {
    text.starts_with("xprv")
        && text.len() == XPRV_LENGTH
        && text.chars().all(|c| BASE58_ALPHABET.contains(c))
}

pub fn validate_pin(pin: &str) -> Result<(), SettingsError> {
    if pin.len() <= EXPLICIT_PIN_MAX && pin.chars().all(|c| ('1'..='9').contains(&c)) {
        Ok(())
    } else {
        Err(SettingsError::InvalidPin)
    }
}

/// Trimmed label, or an error when the device could not store it
pub fn validate_label(label: &str) -> Result<String, SettingsError> {
    let label = label.trim();
    match label.chars().count() {
        n if n > MAX_LABEL_LENGTH => Err(SettingsError::LabelTooLong(n)),
        _ => Ok(label.to_string()),
    }
}

pub fn validate_mnemonic(phrase: &str) -> Result<WordCount, SettingsError> {
    let words: Vec<&str> = phrase.split(' ').filter(|w| !w.is_empty()).collect();
    let count = WordCount::try_from(words.len())
        .map_err(|_| SettingsError::MnemonicLength(words.len()))?;
    if words
        .iter()
        .all(|w| w.chars().all(|c| c.is_ascii_lowercase()))
    {
        Ok(count)
    } else {
        Err(SettingsError::MnemonicCharacters)
    }
}

impl InitSettings {
    /// Normalises free-text fields and checks them for the chosen method
    pub fn validated(mut self) -> Result<Self, SettingsError> {
        self.label = validate_label(&self.label)?;
        match self.method {
            InitMethod::New | InitMethod::Recover => {
                self.secret.clear();
                self.pin.clear();
            }
            InitMethod::Mnemonic => {
                self.secret = clean_text(&self.secret);
                self.word_count = validate_mnemonic(&self.secret)?;
                validate_pin(&self.pin)?;
            }
            InitMethod::PrivateKey => {
                self.secret = clean_text(&self.secret);
                if !is_xprv(&self.secret) {
                    return Err(SettingsError::InvalidXprv);
                }
                validate_pin(&self.pin)?;
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const XPRV: &str = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  abandon\n ability \t able "), "abandon ability able");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn word_count_positions() {
        assert_eq!(WordCount::Twelve.last_word_position(), 11);
        assert_eq!(WordCount::Eighteen.last_word_position(), 17);
        assert_eq!(WordCount::TwentyFour.last_word_position(), 23);
        assert_matches!(WordCount::try_from(15), Err(SettingsError::WordCount(15)));
    }

    #[test]
    fn pin_validation() {
        assert!(validate_pin("").is_ok());
        assert!(validate_pin("1234567899").is_ok());
        assert_eq!(validate_pin("12345678912"), Err(SettingsError::InvalidPin));
        assert_eq!(validate_pin("1230"), Err(SettingsError::InvalidPin));
        assert_eq!(validate_pin("12a"), Err(SettingsError::InvalidPin));
    }

    #[test]
    fn xprv_detection() {
        assert_eq!(XPRV.len(), 111);
        assert!(is_xprv(XPRV));
        assert!(!is_xprv(&XPRV.replacen("xprv", "xpub", 1)));
        assert!(!is_xprv(&XPRV[..110]));
        assert!(!is_xprv(&XPRV.replacen('9', "0", 1)));
    }

    #[test]
    fn mnemonic_settings_take_word_count_from_phrase() {
        let settings = InitSettings {
            method: InitMethod::Mnemonic,
            secret: " abandon  abandon abandon abandon abandon abandon\nabandon abandon abandon abandon abandon about ".into(),
            pin: "1234".into(),
            word_count: WordCount::TwentyFour,
            ..InitSettings::default()
        }
        .validated()
        .unwrap();
        assert_eq!(settings.word_count, WordCount::Twelve);
        assert!(!settings.secret.contains("  "));
    }

    #[test]
    fn mnemonic_with_bad_length_is_rejected() {
        let settings = InitSettings {
            method: InitMethod::Mnemonic,
            secret: "abandon about".into(),
            ..InitSettings::default()
        };
        assert_eq!(
            settings.validated(),
            Err(SettingsError::MnemonicLength(2))
        );
    }

    #[test]
    fn mnemonic_with_uppercase_is_rejected() {
        let phrase = vec!["Abandon"; 12].join(" ");
        let settings = InitSettings {
            method: InitMethod::Mnemonic,
            secret: phrase,
            ..InitSettings::default()
        };
        assert_eq!(settings.validated(), Err(SettingsError::MnemonicCharacters));
    }

    #[test]
    fn private_key_settings_need_xprv() {
        let bad = InitSettings {
            method: InitMethod::PrivateKey,
            secret: "xpub123".into(),
            ..InitSettings::default()
        };
        assert_eq!(bad.validated(), Err(SettingsError::InvalidXprv));

        let good = InitSettings {
            method: InitMethod::PrivateKey,
            secret: format!("  {}  ", XPRV),
            ..InitSettings::default()
        };
        assert_eq!(good.validated().unwrap().secret, XPRV);
    }

    #[test]
    fn recover_drops_loading_fields_and_trims_label() {
        let settings = InitSettings {
            label: "  my device ".into(),
            secret: "leftover".into(),
            pin: "12".into(),
            ..InitSettings::default()
        }
        .validated()
        .unwrap();
        assert_eq!(settings.label, "my device");
        assert!(settings.secret.is_empty());
        assert!(settings.pin.is_empty());
    }

    #[test]
    fn long_labels_are_rejected() {
        assert_eq!(validate_label("  vault  ").unwrap(), "vault");
        let long = "x".repeat(MAX_LABEL_LENGTH + 1);
        assert_eq!(
            validate_label(&long),
            Err(SettingsError::LabelTooLong(MAX_LABEL_LENGTH + 1))
        );
        let settings = InitSettings {
            label: long,
            ..InitSettings::default()
        };
        assert_matches!(settings.validated(), Err(SettingsError::LabelTooLong(_)));
    }

    #[test]
    fn method_display_and_word_count_use() {
        assert_eq!(InitMethod::PrivateKey.to_string(), "PrivateKey");
        assert!(InitMethod::Recover.uses_word_count());
        assert!(!InitMethod::Mnemonic.uses_word_count());
        assert_eq!(WordCount::Eighteen.to_string(), "18 words");
    }
}
