use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("recovery cancelled by user")]
    Cancelled,
    #[error("device failure: {0}")]
    Device(String),
    #[error("recovery channel closed")]
    HostDisconnected,
    #[error("unexpected reply: expected {expected}, got {got}")]
    UnexpectedReply {
        expected: &'static str,
        got: &'static str,
    },
    #[error("unexpected device message: {0}")]
    UnexpectedMessage(String),
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("mnemonic must have 12, 18 or 24 words, got {0}")]
    MnemonicLength(usize),
    #[error("mnemonic words must be lowercase letters")]
    MnemonicCharacters,
    #[error("not an extended private key")]
    InvalidXprv,
    #[error("PIN may only use digits 1-9, at most 10 of them")]
    InvalidPin,
    #[error("unsupported word count {0}")]
    WordCount(usize),
    #[error("device label may be at most 32 characters, got {0}")]
    LabelTooLong(usize),
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}
