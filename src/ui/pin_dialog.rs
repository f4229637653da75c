use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::pin::{PinMatrix, PinRequestKind, MATRIX_LAYOUT};
use crate::ui::{
    bold_style, button_style, device_pane, italic_style, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};

const PIN_HELP: &str = "Your device shows a scrambled keypad. Press the key in the same position as each digit of your PIN.";

pub struct PinDialog<'a> {
    pub kind: PinRequestKind,
    pub pin: &'a PinMatrix,
    pub display: Option<&'a str>,
}

impl Widget for PinDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3), // title + help
                Constraint::Length(5), // keypad
                Constraint::Length(2), // masked entry
                Constraint::Length(2), // buttons
                Constraint::Min(5),    // device mirror
            ])
            .split(area);

        Paragraph::new(vec![
            Line::from(Span::styled(self.kind.title(), bold_style())),
            Line::from(Span::styled(PIN_HELP, italic_style())),
        ])
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let keypad: Vec<Line> = MATRIX_LAYOUT
            .iter()
            .map(|row| Line::from(row.iter().map(|p| format!("[{}]", p)).join(" ")))
            .collect();
        Paragraph::new(keypad)
            .block(Block::default().borders(Borders::ALL).title("Keys"))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(Line::from(vec![
            Span::raw("PIN: "),
            Span::styled(self.pin.masked(), bold_style()),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("(enter) OK", button_style(!self.pin.is_empty())),
            Span::raw("   "),
            Span::styled("(backspace) Delete", button_style(!self.pin.is_empty())),
            Span::raw("   "),
            Span::styled("(esc) Cancel", button_style(true)),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        device_pane(self.display).render(chunks[4], buf);
    }
}
