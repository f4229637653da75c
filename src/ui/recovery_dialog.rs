use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::recovery::{RecoverySession, MAX_WORD_CHARACTERS};
use crate::ui::{
    bold_style, button_style, device_pane, dim_style, italic_style, HORIZONTAL_MARGIN,
    VERTICAL_MARGIN,
};

pub const CHARACTER_RECOVERY_HELP: &str = "Use the recovery cipher shown on your device to input your seed words. \
The cipher changes with every keypress.\n\
After at most 4 letters the device will auto-complete a word.\n\
Press SPACE to accept the device's auto-completed word and advance to the next one.\n\
Press BACKSPACE to go back a character or word.\n\
Press ENTER once the last word in your seed is auto-completed.";

/// Character-entry dialog for cipher-based seed recovery
pub struct RecoveryDialog<'a> {
    pub session: &'a RecoverySession,
    pub display: Option<&'a str>,
}

impl RecoveryDialog<'_> {
    fn word_line(&self) -> Line<'static> {
        let position = self.session.character_position;
        let mut spans = vec![Span::styled(
            format!("Enter seed word {:2}:  ", self.session.word_position + 1),
            bold_style(),
        )];
        for n in 0..MAX_WORD_CHARACTERS {
            let (text, style) = if n < position {
                ("[*]", bold_style())
            } else if n == position {
                ("[_]", bold_style().fg(Color::Yellow).add_modifier(Modifier::REVERSED))
            } else {
                ("[ ]", dim_style())
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn button_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                "(space) Accept Word",
                button_style(self.session.can_accept_word()),
            ),
            Span::raw("   "),
            Span::styled(
                "(enter) Seed Entered",
                button_style(self.session.can_finish()),
            ),
            Span::raw("   "),
            Span::styled("(esc) Cancel", button_style(true)),
        ])
    }
}

impl Widget for RecoveryDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(8), // help
                Constraint::Length(2), // word entry
                Constraint::Length(2), // buttons
                Constraint::Min(4),    // device mirror
            ])
            .split(area);

        Paragraph::new(CHARACTER_RECOVERY_HELP)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Seed Recovery"),
            )
            .style(italic_style())
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        Paragraph::new(self.word_line())
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(self.button_line())
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        device_pane(self.display).render(chunks[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;

    fn render(session: &RecoverySession, display: Option<&str>) -> Buffer {
        let area = Rect::new(0, 0, 120, 30);
        let mut buf = Buffer::empty(area);
        RecoveryDialog { session, display }.render(area, &mut buf);
        buf
    }

    fn text(buf: &Buffer) -> String {
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    fn style_of(buf: &Buffer, needle: &str) -> Option<Style> {
        let width = buf.area.width as usize;
        let content: Vec<&str> = buf.content.iter().map(|c| c.symbol()).collect();
        for (row, line) in content.chunks(width).enumerate() {
            let line: String = line.concat();
            if let Some(col) = line.find(needle) {
                return Some(buf[(col as u16, row as u16)].style());
            }
        }
        None
    }

    #[test]
    fn shows_one_based_word_number() {
        let buf = render(&RecoverySession::at(11, 0), None);
        assert!(text(&buf).contains("Enter seed word 12:"));
        let buf = render(&RecoverySession::new(), None);
        assert!(text(&buf).contains("Enter seed word  1:"));
    }

    #[test]
    fn slots_track_character_position() {
        let buf = render(&RecoverySession::at(0, 2), None);
        assert!(text(&buf).contains("[*] [*] [_] [ ]"));
    }

    #[test]
    fn accept_button_enabled_from_third_character() {
        let early = render(&RecoverySession::at(0, 2), None);
        let ready = render(&RecoverySession::at(0, 3), None);
        assert!(style_of(&early, "(space) Accept Word")
            .unwrap()
            .add_modifier
            .contains(Modifier::DIM));
        assert_eq!(
            style_of(&ready, "(space) Accept Word").unwrap().fg,
            Some(Color::Green)
        );
    }

    #[test]
    fn finish_button_only_at_finish_positions() {
        let not_yet = render(&RecoverySession::at(10, 3), None);
        let done = render(&RecoverySession::at(17, 4), None);
        assert_ne!(
            style_of(&not_yet, "(enter) Seed Entered").unwrap().fg,
            Some(Color::Green)
        );
        assert_eq!(
            style_of(&done, "(enter) Seed Entered").unwrap().fg,
            Some(Color::Green)
        );
    }

    #[test]
    fn device_display_is_mirrored() {
        let buf = render(&RecoverySession::new(), Some("press   q w e"));
        assert!(text(&buf).contains("press   q w e"));
    }
}
