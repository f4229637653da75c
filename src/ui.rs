pub mod pin_dialog;
pub mod recovery_dialog;
pub mod screen;
pub mod settings_dialog;

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_style() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic_style() -> Style {
    Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC)
}

/// Style for a dialog button, bright when it can be pressed
fn button_style(enabled: bool) -> Style {
    if enabled {
        bold_style().fg(Color::Green)
    } else {
        dim_style()
    }
}

/// Mirror of whatever the device shows on its own screen
fn device_pane(display: Option<&str>) -> Paragraph<'_> {
    let text = display.unwrap_or("Follow the instructions on your device.");
    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Device"))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
}
