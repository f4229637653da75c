use serde::{Deserialize, Serialize};

use crate::pin::PinRequestKind;
use crate::recovery::RecoveryEvent;

/// Device description returned for `GetFeatures`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub label: String,
    pub device_id: String,
    pub initialized: bool,
    pub pin_protection: bool,
    pub passphrase_protection: bool,
    pub major_version: u32,
    pub minor_version: u32,
    pub patch_version: u32,
    pub language: String,
}

impl Features {
    pub fn version(&self) -> String {
        format!(
            "{}.{}.{}",
            self.major_version, self.minor_version, self.patch_version
        )
    }
}

/// Messages the device sends to the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceMessage {
    CharacterRequest { word_pos: usize, character_pos: usize },
    PinMatrixRequest(PinRequestKind),
    Features(Features),
    Success(String),
    Failure(String),
}

impl DeviceMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceMessage::CharacterRequest { .. } => "CharacterRequest",
            DeviceMessage::PinMatrixRequest(_) => "PinMatrixRequest",
            DeviceMessage::Features(_) => "Features",
            DeviceMessage::Success(_) => "Success",
            DeviceMessage::Failure(_) => "Failure",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterAck {
    pub character: Option<char>,
    pub delete: bool,
    pub done: bool,
}

impl From<RecoveryEvent> for CharacterAck {
    fn from(event: RecoveryEvent) -> Self {
        match event {
            RecoveryEvent::Character(c) => CharacterAck {
                character: Some(c),
                ..Default::default()
            },
            RecoveryEvent::Delete => CharacterAck {
                delete: true,
                ..Default::default()
            },
            RecoveryEvent::Done => CharacterAck {
                done: true,
                ..Default::default()
            },
        }
    }
}

/// Messages the host sends back
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostMessage {
    CharacterAck(CharacterAck),
    PinMatrixAck(String),
    Cancel,
    GetFeatures,
    /// `None` leaves a setting unchanged
    ApplySettings {
        label: Option<String>,
        use_passphrase: Option<bool>,
    },
    ChangePin {
        remove: bool,
    },
    WipeDevice,
}

impl HostMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::CharacterAck(_) => "CharacterAck",
            HostMessage::PinMatrixAck(_) => "PinMatrixAck",
            HostMessage::Cancel => "Cancel",
            HostMessage::GetFeatures => "GetFeatures",
            HostMessage::ApplySettings { .. } => "ApplySettings",
            HostMessage::ChangePin { .. } => "ChangePin",
            HostMessage::WipeDevice => "WipeDevice",
        }
    }
}
