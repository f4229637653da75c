use std::collections::HashMap;

/// Lifecycle points other parts of the application can attach to
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum HookKind {
    RecoveryStarted,
    PinRequested,
    RecoveryFinished,
    RecoveryCancelled,
    RecoveryFailed,
    SettingsApplied,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookPayload {
    pub label: String,
    pub detail: Option<String>,
}

type Callback = Box<dyn Fn(HookKind, &HookPayload) + Send + Sync>;

/// Named callbacks keyed by lifecycle point, run in registration order
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<HookKind, Vec<Callback>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: HookKind, callback: F)
    where
        F: Fn(HookKind, &HookPayload) + Send + Sync + 'static,
    {
        self.hooks.entry(kind).or_default().push(Box::new(callback));
    }

    /// Runs every callback for `kind`, returning how many ran
    pub fn fire(&self, kind: HookKind, payload: &HookPayload) -> usize {
        let callbacks = self.hooks.get(&kind).map(Vec::as_slice).unwrap_or_default();
        for callback in callbacks {
            callback(kind, payload);
        }
        callbacks.len()
    }

    /// Registry that logs every lifecycle point
    pub fn with_logging() -> Self {
        let mut registry = Self::new();
        for kind in [
            HookKind::RecoveryStarted,
            HookKind::PinRequested,
            HookKind::RecoveryFinished,
            HookKind::RecoveryCancelled,
            HookKind::RecoveryFailed,
            HookKind::SettingsApplied,
        ] {
            registry.register(kind, |kind, payload| {
                log::info!(
                    "hook {} label={:?} detail={:?}",
                    kind,
                    payload.label,
                    payload.detail
                );
            });
        }
        registry
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<String, usize> = self
            .hooks
            .iter()
            .map(|(k, v)| (k.to_string(), v.len()))
            .collect();
        f.debug_struct("HookRegistry").field("hooks", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn callbacks_run_in_order() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut registry = HookRegistry::new();
        for n in 0..3 {
            let seen = Arc::clone(&seen);
            registry.register(HookKind::RecoveryFinished, move |_, _| {
                seen.lock().unwrap().push(n);
            });
        }
        let ran = registry.fire(HookKind::RecoveryFinished, &HookPayload::default());
        assert_eq!(ran, 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn unregistered_kind_runs_nothing() {
        let registry = HookRegistry::new();
        assert_eq!(
            registry.fire(HookKind::PinRequested, &HookPayload::default()),
            0
        );
    }

    #[test]
    fn payload_reaches_callback() {
        let seen = Arc::new(Mutex::new(None));
        let mut registry = HookRegistry::new();
        let sink = Arc::clone(&seen);
        registry.register(HookKind::RecoveryFailed, move |kind, payload| {
            *sink.lock().unwrap() = Some((kind, payload.detail.clone()));
        });
        registry.fire(
            HookKind::RecoveryFailed,
            &HookPayload {
                label: "wallet".into(),
                detail: Some("PIN mismatch".into()),
            },
        );
        assert_eq!(
            *seen.lock().unwrap(),
            Some((HookKind::RecoveryFailed, Some("PIN mismatch".into())))
        );
    }

    #[test]
    fn hook_names_are_snake_case() {
        assert_eq!(HookKind::RecoveryStarted.to_string(), "recovery_started");
        assert_eq!(HookKind::PinRequested.to_string(), "pin_requested");
        assert_eq!(HookKind::SettingsApplied.to_string(), "settings_applied");
    }

    #[test]
    fn logging_registry_covers_every_kind() {
        let registry = HookRegistry::with_logging();
        assert_eq!(
            registry.fire(HookKind::RecoveryCancelled, &HookPayload::default()),
            1
        );
        assert_eq!(
            registry.fire(HookKind::SettingsApplied, &HookPayload::default()),
            1
        );
    }
}
