use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::protocol::Features;
use crate::ui::{bold_style, button_style, italic_style, HORIZONTAL_MARGIN, VERTICAL_MARGIN};

const PIN_WARNING: &str = "PIN protection is strongly recommended. A PIN is your only protection \
against someone who gets physical access to your device.";

/// Device information and the settings menu
pub struct SettingsDialog<'a> {
    pub features: Option<&'a Features>,
    pub status: Option<&'a str>,
    pub label_edit: Option<&'a str>,
    pub confirm_wipe: bool,
    pub session_timeout: u32,
    /// a command is in flight; the menu is inactive
    pub busy: bool,
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

impl SettingsDialog<'_> {
    fn info_lines(features: &Features) -> Vec<Line<'static>> {
        let passphrases = if features.passphrase_protection {
            "Enabled"
        } else {
            "Disabled"
        };
        [
            ("Device Label", features.label.clone()),
            ("PIN set", yes_no(features.pin_protection).to_string()),
            ("Passphrases", passphrases.to_string()),
            ("Firmware Version", features.version()),
            ("Device ID", features.device_id.clone()),
            ("Language", features.language.clone()),
            ("Initialized", yes_no(features.initialized).to_string()),
        ]
        .into_iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{:<18}", name), bold_style()),
                Span::raw(value),
            ])
        })
        .collect()
    }

    fn menu_lines(&self, features: &Features) -> Vec<Line<'static>> {
        let active = !self.busy;
        let ready = active && features.initialized;
        let pin = if features.pin_protection {
            "(c) Change PIN"
        } else {
            "(c) Set a PIN"
        };
        let passphrase = if features.passphrase_protection {
            "(p) Disable Passphrases"
        } else {
            "(p) Enable Passphrases"
        };
        vec![
            Line::from(Span::styled("(l) Rename device", button_style(ready))),
            Line::from(Span::styled(pin, button_style(ready))),
            Line::from(Span::styled(
                "(r) Disable PIN",
                button_style(active && features.pin_protection),
            )),
            Line::from(Span::styled(passphrase, button_style(ready))),
            Line::from(Span::styled(
                format!("(+/-) Session timeout: {:2} minutes", self.session_timeout),
                button_style(active),
            )),
            Line::from(Span::styled("(w) Wipe device", button_style(active))),
            Line::from(Span::styled("(esc) Exit", button_style(true))),
        ]
    }

    fn prompt_line(&self) -> Line<'static> {
        if let Some(label) = self.label_edit {
            return Line::from(vec![
                Span::styled("New label: ", bold_style()),
                Span::raw(format!("{}_", label)),
                Span::styled("   (enter) Apply   (esc) Back", italic_style()),
            ]);
        }
        if self.confirm_wipe {
            return Line::from(Span::styled(
                "Wipe the device, removing all data from it? (y/n)",
                bold_style().fg(Color::Red),
            ));
        }
        match self.status {
            Some(status) => Line::from(Span::styled(status.to_string(), italic_style())),
            None => Line::default(),
        }
    }
}

impl Widget for SettingsDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(9), // information
                Constraint::Length(9), // menu
                Constraint::Length(2), // prompt / status
                Constraint::Min(2),    // warning
            ])
            .split(area);

        let Some(features) = self.features else {
            Paragraph::new("Reading device features...")
                .style(italic_style())
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        };

        Paragraph::new(Self::info_lines(features))
            .block(Block::default().borders(Borders::ALL).title("Information"))
            .render(chunks[0], buf);

        Paragraph::new(self.menu_lines(features))
            .block(Block::default().borders(Borders::ALL).title("Settings"))
            .render(chunks[1], buf);

        Paragraph::new(self.prompt_line())
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        if features.initialized && !features.pin_protection {
            Paragraph::new(PIN_WARNING)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .render(chunks[3], buf);
        }
    }
}
