//! Request/response bridge between the device worker thread and the UI.
//!
//! The worker asks for one input at a time and blocks until the UI answers.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::device_settings::SettingsAction;
use crate::error::RecoveryError;
use crate::pin::PinRequestKind;
use crate::protocol::{CharacterAck, Features};
use crate::recovery::RecoveryEvent;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoveryOutcome {
    pub message: String,
}

/// Sent from the worker to the UI
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    Character {
        word_pos: usize,
        character_pos: usize,
        display: Option<String>,
    },
    Pin {
        kind: PinRequestKind,
        display: Option<String>,
    },
    Finished(RecoveryOutcome),
    Failed(String),
    /// The device is initialised and waiting for a settings command
    Features {
        features: Features,
        status: Option<String>,
    },
}

impl Prompt {
    /// Whether the worker is blocked waiting for a reply to this prompt
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            Prompt::Character { .. } | Prompt::Pin { .. } | Prompt::Features { .. }
        )
    }
}

/// Sent from the UI back to the worker
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Character(RecoveryEvent),
    Pin(String),
    Command(SettingsAction),
    Cancel,
}

impl Reply {
    fn kind(&self) -> &'static str {
        match self {
            Reply::Character(_) => "character",
            Reply::Pin(_) => "pin",
            Reply::Command(_) => "command",
            Reply::Cancel => "cancel",
        }
    }
}

/// Worker-side end of the bridge
pub struct RecoveryHandler {
    prompts: Sender<Prompt>,
    replies: Receiver<Reply>,
}

/// UI-side end of the bridge
pub struct HostPort {
    pub prompts: Receiver<Prompt>,
    replies: Sender<Reply>,
}

pub fn channel() -> (RecoveryHandler, HostPort) {
    let (prompt_tx, prompt_rx) = mpsc::channel();
    let (reply_tx, reply_rx) = mpsc::channel();
    (
        RecoveryHandler {
            prompts: prompt_tx,
            replies: reply_rx,
        },
        HostPort {
            prompts: prompt_rx,
            replies: reply_tx,
        },
    )
}

impl RecoveryHandler {
    fn ask(&self, prompt: Prompt) -> Result<Reply, RecoveryError> {
        self.prompts
            .send(prompt)
            .map_err(|_| RecoveryError::HostDisconnected)?;
        self.replies
            .recv()
            .map_err(|_| RecoveryError::HostDisconnected)
    }

    pub fn get_char(
        &self,
        word_pos: usize,
        character_pos: usize,
        display: Option<String>,
    ) -> Result<CharacterAck, RecoveryError> {
        match self.ask(Prompt::Character {
            word_pos,
            character_pos,
            display,
        })? {
            Reply::Character(event) => Ok(event.into()),
            Reply::Cancel => Err(RecoveryError::Cancelled),
            other => Err(RecoveryError::UnexpectedReply {
                expected: "character",
                got: other.kind(),
            }),
        }
    }

    pub fn get_pin(
        &self,
        kind: PinRequestKind,
        display: Option<String>,
    ) -> Result<String, RecoveryError> {
        match self.ask(Prompt::Pin { kind, display })? {
            Reply::Pin(positions) => Ok(positions),
            Reply::Cancel => Err(RecoveryError::Cancelled),
            other => Err(RecoveryError::UnexpectedReply {
                expected: "pin",
                got: other.kind(),
            }),
        }
    }

    /// Blocks until the UI picks a settings action; `None` once the UI is done with the device
    pub fn next_command(&self) -> Result<Option<SettingsAction>, RecoveryError> {
        match self.replies.recv() {
            Ok(Reply::Command(action)) => Ok(Some(action)),
            Ok(Reply::Cancel) | Err(_) => Ok(None),
            Ok(other) => Err(RecoveryError::UnexpectedReply {
                expected: "command",
                got: other.kind(),
            }),
        }
    }

    pub fn show_features(
        &self,
        features: Features,
        status: Option<String>,
    ) -> Result<(), RecoveryError> {
        self.prompts
            .send(Prompt::Features { features, status })
            .map_err(|_| RecoveryError::HostDisconnected)
    }

    /// Final notification; the UI may already be gone, which is fine
    pub fn finish(&self, result: &Result<RecoveryOutcome, RecoveryError>) {
        let prompt = match result {
            Ok(outcome) => Prompt::Finished(outcome.clone()),
            Err(err) => Prompt::Failed(err.to_string()),
        };
        let _ = self.prompts.send(prompt);
    }
}

impl HostPort {
    pub fn reply(&self, reply: Reply) -> Result<(), RecoveryError> {
        self.replies
            .send(reply)
            .map_err(|_| RecoveryError::HostDisconnected)
    }

    /// Splits off the prompt receiver so it can be forwarded into an event loop
    pub fn into_parts(self) -> (Receiver<Prompt>, ReplySender) {
        (self.prompts, ReplySender(self.replies))
    }
}

/// Reply half of a [`HostPort`] once the prompt receiver has been moved elsewhere
#[derive(Clone, Debug)]
pub struct ReplySender(Sender<Reply>);

impl From<Sender<Reply>> for ReplySender {
    fn from(tx: Sender<Reply>) -> Self {
        ReplySender(tx)
    }
}

impl ReplySender {
    pub fn reply(&self, reply: Reply) -> Result<(), RecoveryError> {
        self.0
            .send(reply)
            .map_err(|_| RecoveryError::HostDisconnected)
    }
}
