use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use crate::controller::{CharClass, SessionController};

pub const NEWLINE_GLYPH: &str = "↵";
pub const TAB_GLYPH: &str = "→";
pub const SPACE_GLYPH: &str = "·";

/// Visible form of a target character.
pub fn glyph(expected: char, class: CharClass) -> String {
    match expected {
        '\n' => NEWLINE_GLYPH.to_owned(),
        '\t' => TAB_GLYPH.to_owned(),
        // a mistyped space would otherwise be invisible
        ' ' if class == CharClass::Incorrect => SPACE_GLYPH.to_owned(),
        c => c.to_string(),
    }
}

pub fn style_for(class: CharClass) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match class {
        CharClass::Correct => bold.fg(Color::Green),
        CharClass::Incorrect => bold.fg(Color::Red).bg(Color::Rgb(60, 20, 20)),
        CharClass::Cursor => Style::default()
            .fg(Color::Gray)
            .bg(Color::Rgb(90, 80, 20))
            .add_modifier(Modifier::UNDERLINED),
        CharClass::Untyped => Style::default().fg(Color::DarkGray),
    }
}

/// The snippet as styled lines; every newline keeps its glyph at the end of
/// the line it terminates.
pub fn code_lines(controller: &SessionController) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans = Vec::new();

    for (expected, class) in controller.classifications() {
        spans.push(Span::styled(glyph(expected, class), style_for(class)));
        if expected == '\n' {
            lines.push(Line::from(std::mem::take(&mut spans)));
        }
    }
    lines.push(Line::from(spans));
    lines
}

/// Columns needed to show `code` without wrapping, newline glyph included.
pub fn code_width(code: &str) -> u16 {
    code.split('\n')
        .map(|line| line.replace('\t', TAB_GLYPH).width() + 1)
        .max()
        .unwrap_or(1)
        .min(u16::MAX as usize) as u16
}
