use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::device::Device;
use crate::device_settings::SettingsAction;
use crate::error::RecoveryError;
use crate::handler::{self, HostPort, RecoveryHandler, RecoveryOutcome};
use crate::hooks::{HookKind, HookPayload, HookRegistry};
use crate::protocol::{DeviceMessage, Features, HostMessage};
use crate::settings::InitSettings;

/// Feeds device requests through the handler until the device reports success or failure.
pub fn run_recovery<D: Device>(
    device: &mut D,
    settings: &InitSettings,
    handler: &RecoveryHandler,
    hooks: &HookRegistry,
) -> Result<RecoveryOutcome, RecoveryError> {
    let payload = |detail: Option<String>| HookPayload {
        label: settings.label.clone(),
        detail,
    };
    hooks.fire(
        HookKind::RecoveryStarted,
        &payload(Some(settings.method.to_string())),
    );

    let result = device
        .start(settings)
        .and_then(|first| drive(device, first, &settings.label, handler, hooks));

    match &result {
        Ok(outcome) => {
            hooks.fire(
                HookKind::RecoveryFinished,
                &payload(Some(outcome.message.clone())),
            );
        }
        Err(RecoveryError::Cancelled) => {
            hooks.fire(HookKind::RecoveryCancelled, &payload(None));
        }
        Err(err) => {
            hooks.fire(HookKind::RecoveryFailed, &payload(Some(err.to_string())));
        }
    }
    result
}

fn drive<D: Device>(
    device: &mut D,
    mut msg: DeviceMessage,
    label: &str,
    handler: &RecoveryHandler,
    hooks: &HookRegistry,
) -> Result<RecoveryOutcome, RecoveryError> {
    loop {
        log::debug!("device sent {}", msg.kind());
        let reply = match msg {
            DeviceMessage::CharacterRequest {
                word_pos,
                character_pos,
            } => {
                log::debug!("character request word={} char={}", word_pos, character_pos);
                handler
                    .get_char(word_pos, character_pos, device.display())
                    .map(HostMessage::CharacterAck)
            }
            DeviceMessage::PinMatrixRequest(kind) => {
                hooks.fire(
                    HookKind::PinRequested,
                    &HookPayload {
                        label: label.to_string(),
                        detail: Some(kind.title().to_string()),
                    },
                );
                handler
                    .get_pin(kind, device.display())
                    .map(HostMessage::PinMatrixAck)
            }
            DeviceMessage::Success(message) => {
                log::info!("device reported success");
                return Ok(RecoveryOutcome { message });
            }
            DeviceMessage::Failure(reason) => {
                log::warn!("device reported failure: {}", reason);
                return Err(RecoveryError::Device(reason));
            }
            other @ DeviceMessage::Features(_) => {
                return Err(RecoveryError::UnexpectedMessage(other.kind().to_string()));
            }
        };

        msg = match reply {
            Ok(host_msg) => device.call(host_msg)?,
            Err(RecoveryError::Cancelled) => {
                log::info!("user cancelled, resetting device");
                device.call(HostMessage::Cancel)?;
                return Err(RecoveryError::Cancelled);
            }
            Err(err) => return Err(err),
        };
    }
}

pub fn fetch_features<D: Device>(device: &mut D) -> Result<Features, RecoveryError> {
    match device.call(HostMessage::GetFeatures)? {
        DeviceMessage::Features(features) => Ok(features),
        DeviceMessage::Failure(reason) => Err(RecoveryError::Device(reason)),
        other => Err(RecoveryError::UnexpectedMessage(other.kind().to_string())),
    }
}

/// Runs one settings action, prompting for PINs the device asks for along the way.
pub fn apply_settings<D: Device>(
    device: &mut D,
    action: SettingsAction,
    handler: &RecoveryHandler,
    hooks: &HookRegistry,
) -> Result<RecoveryOutcome, RecoveryError> {
    let action = action.validated()?;
    let Some(msg) = action.message() else {
        return Ok(RecoveryOutcome {
            message: "No changes".to_string(),
        });
    };
    let label = fetch_features(device)?.label;
    log::info!("applying {:?}", action);

    let first = device.call(msg)?;
    let outcome = drive(device, first, &label, handler, hooks)?;
    hooks.fire(
        HookKind::SettingsApplied,
        &HookPayload {
            label,
            detail: Some(outcome.message.clone()),
        },
    );
    Ok(outcome)
}

/// Serves settings commands on an initialised device until the UI lets go of it.
pub fn serve_settings<D: Device>(
    device: &mut D,
    handler: &RecoveryHandler,
    hooks: &HookRegistry,
) -> Result<(), RecoveryError> {
    while let Some(action) = handler.next_command()? {
        let status = match action {
            SettingsAction::ShowFeatures => Ok(None),
            action => apply_settings(device, action, handler, hooks).map(|o| Some(o.message)),
        };
        let status = match status {
            Ok(status) => status,
            Err(RecoveryError::HostDisconnected) => return Ok(()),
            Err(err) => {
                log::warn!("settings action failed: {}", err);
                Some(err.to_string())
            }
        };
        if handler.show_features(fetch_features(device)?, status).is_err() {
            break;
        }
    }
    log::debug!("settings session closed");
    Ok(())
}

/// Runs the recovery on a worker thread; the returned port talks to it.
///
/// After a successful initialisation the worker keeps the device open for settings commands.
pub fn spawn<D: Device + 'static>(
    mut device: D,
    settings: InitSettings,
    hooks: Arc<HookRegistry>,
) -> (JoinHandle<Result<RecoveryOutcome, RecoveryError>>, HostPort) {
    let (handler, port) = handler::channel();
    let worker = thread::spawn(move || {
        let result = run_recovery(&mut device, &settings, &handler, &hooks);
        handler.finish(&result);
        if result.is_ok() {
            if let Err(err) = serve_settings(&mut device, &handler, &hooks) {
                log::warn!("settings session ended: {}", err);
            }
        }
        result
    });
    (worker, port)
}
