use std::error::Error;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{backend::Backend, Terminal};

use crate::device_settings::{
    clamp_session_timeout, SettingsAction, DEFAULT_SESSION_TIMEOUT_MINUTES,
};
use crate::handler::{Prompt, Reply, ReplySender};
use crate::input::{is_cancel, is_press};
use crate::pin::{PinKey, PinMatrix, PinRequestKind};
use crate::protocol::Features;
use crate::recovery::{Key, RecoverySession};
use crate::runtime::{AppEvent, AppEventSource, Runner, Ticker};
use crate::settings::{InitSettings, MAX_LABEL_LENGTH};
use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Connecting,
    Pin(PinRequestKind),
    Recovery,
    Finished(String),
    Failed(String),
    /// device initialised, settings menu open
    Settings,
}

impl AppState {
    pub fn is_done(&self) -> bool {
        matches!(self, AppState::Finished(_) | AppState::Failed(_))
    }
}

#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub settings: InitSettings,
    pub session: RecoverySession,
    pub pin: PinMatrix,
    /// text on the device's own screen, when known
    pub display: Option<String>,
    pub should_quit: bool,
    /// last features the device reported
    pub features: Option<Features>,
    /// outcome of the last settings action
    pub status: Option<String>,
    /// new device label being typed
    pub label_edit: Option<String>,
    pub confirm_wipe: bool,
    /// idle minutes before the settings screen closes
    pub session_timeout: u32,
    last_activity: Instant,
    // a prompt is outstanding and owed exactly one reply
    awaiting_reply: bool,
    replies: ReplySender,
}

impl App {
    pub fn new(settings: InitSettings, replies: ReplySender) -> Self {
        Self {
            state: AppState::Connecting,
            settings,
            session: RecoverySession::new(),
            pin: PinMatrix::new(),
            display: None,
            should_quit: false,
            features: None,
            status: None,
            label_edit: None,
            confirm_wipe: false,
            session_timeout: DEFAULT_SESSION_TIMEOUT_MINUTES,
            last_activity: Instant::now(),
            awaiting_reply: false,
            replies,
        }
    }

    pub fn with_session_timeout(mut self, minutes: u32) -> Self {
        self.session_timeout = clamp_session_timeout(minutes);
        self
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn on_prompt(&mut self, prompt: Prompt) {
        self.awaiting_reply = prompt.expects_reply();
        match prompt {
            Prompt::Character {
                word_pos,
                character_pos,
                display,
            } => {
                self.session.sync(word_pos, character_pos);
                self.display = display;
                self.state = AppState::Recovery;
            }
            Prompt::Pin { kind, display } => {
                self.pin.clear();
                self.display = display;
                self.state = AppState::Pin(kind);
            }
            Prompt::Finished(outcome) => {
                self.display = None;
                self.state = AppState::Finished(outcome.message);
            }
            Prompt::Failed(reason) => {
                self.display = None;
                self.state = AppState::Failed(reason);
            }
            Prompt::Features { features, status } => {
                self.display = None;
                self.features = Some(features);
                self.status = status;
                self.label_edit = None;
                self.confirm_wipe = false;
                self.state = AppState::Settings;
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if !is_press(&key) {
            return;
        }
        self.last_activity = Instant::now();

        if self.state == AppState::Settings && self.awaiting_reply {
            self.on_settings_key(key);
            return;
        }

        if is_cancel(&key) {
            if self.awaiting_reply {
                self.send(Reply::Cancel);
            } else {
                self.quit();
            }
            return;
        }

        if !self.awaiting_reply {
            if matches!(self.state, AppState::Finished(_)) && key.code == KeyCode::Char('s') {
                self.send_command(SettingsAction::ShowFeatures);
            } else if self.state.is_done() {
                self.quit();
            }
            return;
        }

        match self.state {
            AppState::Recovery => {
                if self.session.accept_key(Key::from(key)).is_none() {
                    log::trace!("key ignored at word {}", self.session.word_position);
                    return;
                }
                if let Some(event) = self.session.take_pending() {
                    self.send(Reply::Character(event));
                }
            }
            AppState::Pin(_) => {
                if let Some(positions) = self.pin.on_key(PinKey::from(key)) {
                    self.send(Reply::Pin(positions));
                }
            }
            AppState::Connecting
            | AppState::Finished(_)
            | AppState::Failed(_)
            | AppState::Settings => {}
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        if let Some(label) = self.label_edit.as_mut() {
            match key.code {
                _ if is_cancel(&key) => self.label_edit = None,
                KeyCode::Enter => {
                    let label = self.label_edit.take().unwrap_or_default();
                    self.send_command(SettingsAction::Rename(label));
                }
                KeyCode::Backspace => {
                    label.pop();
                }
                KeyCode::Char(c) if label.chars().count() < MAX_LABEL_LENGTH => label.push(c),
                _ => {}
            }
            return;
        }

        if is_cancel(&key) {
            self.quit();
            return;
        }

        if self.confirm_wipe {
            self.confirm_wipe = false;
            if matches!(key.code, KeyCode::Char('y' | 'Y')) {
                self.send_command(SettingsAction::Wipe);
            }
            return;
        }

        let Some(features) = self.features.clone() else {
            return;
        };
        match key.code {
            KeyCode::Char('l') if features.initialized => {
                self.label_edit = Some(features.label);
            }
            KeyCode::Char('p') if features.initialized => {
                self.send_command(SettingsAction::SetPassphrase(
                    !features.passphrase_protection,
                ));
            }
            KeyCode::Char('c') if features.initialized => {
                self.send_command(SettingsAction::ChangePin);
            }
            KeyCode::Char('r') if features.pin_protection => {
                self.send_command(SettingsAction::RemovePin);
            }
            KeyCode::Char('w') => self.confirm_wipe = true,
            KeyCode::Char('+' | '=') => {
                self.session_timeout = clamp_session_timeout(self.session_timeout + 1);
            }
            KeyCode::Char('-') => {
                self.session_timeout =
                    clamp_session_timeout(self.session_timeout.saturating_sub(1));
            }
            _ => {}
        }
    }

    /// Closes an idle settings session
    pub fn on_tick(&mut self, now: Instant) {
        let timeout = Duration::from_secs(u64::from(self.session_timeout) * 60);
        if self.state == AppState::Settings
            && now.saturating_duration_since(self.last_activity) >= timeout
        {
            log::info!("settings session timed out");
            self.quit();
        }
    }

    /// Leaves the app; a worker still holding the device is told to let go of it
    fn quit(&mut self) {
        if !matches!(self.state, AppState::Failed(_)) {
            if let Err(err) = self.replies.reply(Reply::Cancel) {
                log::debug!("worker already gone: {}", err);
            }
        }
        self.awaiting_reply = false;
        self.should_quit = true;
    }

    fn send_command(&mut self, action: SettingsAction) {
        self.status = None;
        self.send(Reply::Command(action));
    }

    fn send(&mut self, reply: Reply) {
        self.awaiting_reply = false;
        if let Err(err) = self.replies.reply(reply) {
            log::error!("could not reach device worker: {}", err);
            self.state = AppState::Failed(err.to_string());
        }
    }
}

/// Drives the app until the user quits
pub fn run<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit {
        match runner.step() {
            AppEvent::Tick => {
                app.on_tick(Instant::now());
                continue;
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => app.on_key(key),
            AppEvent::Prompt(prompt) => app.on_prompt(prompt),
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}
