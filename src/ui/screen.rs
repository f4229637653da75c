use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::{
    bold_style, italic_style, pin_dialog::PinDialog, recovery_dialog::RecoveryDialog,
    settings_dialog::SettingsDialog, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};
use crate::{App, AppState};

/// A UI Screen boundary: responsible for rendering one application state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Shown until the device sends its first request
pub struct ConnectingScreen;

impl Screen for ConnectingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let label = if app.settings.label.is_empty() {
            "device".to_string()
        } else {
            format!("\"{}\"", app.settings.label)
        };
        let waiting = Paragraph::new(format!("Waiting for {}...", label))
            .style(italic_style())
            .alignment(Alignment::Center);
        f.render_widget(waiting, f.area());
    }
}

pub struct PinScreen;

impl Screen for PinScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        if let AppState::Pin(kind) = app.state {
            f.render_widget(
                PinDialog {
                    kind,
                    pin: &app.pin,
                    display: app.display.as_deref(),
                },
                f.area(),
            );
        }
    }
}

pub struct RecoveryScreen;

impl Screen for RecoveryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(
            RecoveryDialog {
                session: &app.session,
                display: app.display.as_deref(),
            },
            f.area(),
        );
    }
}

pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(
            SettingsDialog {
                features: app.features.as_ref(),
                status: app.status.as_deref(),
                label_edit: app.label_edit.as_deref(),
                confirm_wipe: app.confirm_wipe,
                session_timeout: app.session_timeout,
                busy: !app.awaiting_reply(),
            },
            f.area(),
        );
    }
}

/// Final result, success or failure
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let (title, message, color) = match &app.state {
            AppState::Finished(message) => ("Done", message.as_str(), Color::Green),
            AppState::Failed(reason) => ("Failed", reason.as_str(), Color::Red),
            _ => return,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(f.area());

        let body = Paragraph::new(Line::from(Span::styled(
            message.to_string(),
            bold_style().fg(color),
        )))
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(body, chunks[0]);

        let legend = match app.state {
            AppState::Finished(_) => "(s) device settings   any other key exits",
            _ => "press any key to exit",
        };
        let legend = Paragraph::new(Span::styled(legend, italic_style()))
            .style(Style::default())
            .alignment(Alignment::Center);
        f.render_widget(legend, chunks[1]);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Connecting => Box::new(ConnectingScreen),
        AppState::Pin(_) => Box::new(PinScreen),
        AppState::Recovery => Box::new(RecoveryScreen),
        AppState::Finished(_) | AppState::Failed(_) => Box::new(SummaryScreen),
        AppState::Settings => Box::new(SettingsScreen),
    }
}
