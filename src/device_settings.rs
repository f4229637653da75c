use std::ops::RangeInclusive;

use crate::error::SettingsError;
use crate::protocol::HostMessage;
use crate::settings::validate_label;

/// Allowed idle time on the settings screen, in minutes
pub const SESSION_TIMEOUT_MINUTES: RangeInclusive<u32> = 1..=60;
pub const DEFAULT_SESSION_TIMEOUT_MINUTES: u32 = 5;

pub fn clamp_session_timeout(minutes: u32) -> u32 {
    minutes.clamp(
        *SESSION_TIMEOUT_MINUTES.start(),
        *SESSION_TIMEOUT_MINUTES.end(),
    )
}

/// A change the user can make to an initialised device
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsAction {
    /// re-read the device features without changing anything
    ShowFeatures,
    Rename(String),
    SetPassphrase(bool),
    /// set a PIN, or change the existing one
    ChangePin,
    RemovePin,
    Wipe,
}

impl SettingsAction {
    /// Message that starts the action on the device
    pub fn message(&self) -> Option<HostMessage> {
        match self {
            SettingsAction::ShowFeatures => None,
            SettingsAction::Rename(label) => Some(HostMessage::ApplySettings {
                label: Some(label.clone()),
                use_passphrase: None,
            }),
            SettingsAction::SetPassphrase(enabled) => Some(HostMessage::ApplySettings {
                label: None,
                use_passphrase: Some(*enabled),
            }),
            SettingsAction::ChangePin => Some(HostMessage::ChangePin { remove: false }),
            SettingsAction::RemovePin => Some(HostMessage::ChangePin { remove: true }),
            SettingsAction::Wipe => Some(HostMessage::WipeDevice),
        }
    }

    pub fn validated(self) -> Result<Self, SettingsError> {
        match self {
            SettingsAction::Rename(label) => Ok(SettingsAction::Rename(validate_label(&label)?)),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_actions_map_to_change_pin() {
        assert_eq!(
            SettingsAction::ChangePin.message(),
            Some(HostMessage::ChangePin { remove: false })
        );
        assert_eq!(
            SettingsAction::RemovePin.message(),
            Some(HostMessage::ChangePin { remove: true })
        );
        assert_eq!(SettingsAction::ShowFeatures.message(), None);
    }

    #[test]
    fn passphrase_toggle_leaves_label_alone() {
        assert_eq!(
            SettingsAction::SetPassphrase(true).message(),
            Some(HostMessage::ApplySettings {
                label: None,
                use_passphrase: Some(true)
            })
        );
    }

    #[test]
    fn rename_is_trimmed_and_bounded() {
        assert_eq!(
            SettingsAction::Rename(" hot ".into()).validated(),
            Ok(SettingsAction::Rename("hot".into()))
        );
        assert!(SettingsAction::Rename("y".repeat(40)).validated().is_err());
    }

    #[test]
    fn timeout_stays_in_range() {
        assert_eq!(clamp_session_timeout(0), 1);
        assert_eq!(clamp_session_timeout(30), 30);
        assert_eq!(clamp_session_timeout(61), 60);
    }
}
