use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::fmt::money;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_POS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_NEG_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Format an amount as a colored Span (green for money in, red for money
/// out). Shows the absolute value; color conveys the sign.
pub fn money_span(amount: f64) -> Span<'static> {
    let style = if amount < 0.0 {
        AMOUNT_NEG_STYLE
    } else {
        AMOUNT_POS_STYLE
    };
    Span::styled(money(amount.abs()), style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

/// Turn a stored #RRGGBB stage color into a terminal color. Malformed
/// strings fall back to gray.
pub fn stage_color(hex: &str) -> Color {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Color::DarkGray;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
        _ => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_counts_lines() {
        let (wrapped, lines) = wrap_text("one two three four five six seven", 10);
        assert!(lines > 1);
        assert!(wrapped.lines().all(|l| l.len() <= 10));
    }

    #[test]
    fn test_wrap_text_zero_width() {
        let (wrapped, lines) = wrap_text("hello", 0);
        assert_eq!(wrapped, "hello");
        assert_eq!(lines, 1);
    }

    #[test]
    fn test_stage_color_parses_hex() {
        assert_eq!(stage_color("#3B82F6"), Color::Rgb(0x3B, 0x82, 0xF6));
        assert_eq!(stage_color("10B981"), Color::Rgb(0x10, 0xB9, 0x81));
    }

    #[test]
    fn test_stage_color_rejects_malformed() {
        assert_eq!(stage_color(""), Color::DarkGray);
        assert_eq!(stage_color("#FFF"), Color::DarkGray);
        assert_eq!(stage_color("#GGGGGG"), Color::DarkGray);
    }
}
