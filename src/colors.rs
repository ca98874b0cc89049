//! Color utilities for exchange ids in terminal output.

use owo_colors::{AnsiColors, DynColors, OwoColorize, Style};

use crate::sink::Side;

/// Distinct colors readable on both light and dark backgrounds.
const PALETTE: [AnsiColors; 12] = [
    AnsiColors::Red,
    AnsiColors::Green,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::Magenta,
    AnsiColors::Cyan,
    AnsiColors::BrightRed,
    AnsiColors::BrightGreen,
    AnsiColors::BrightYellow,
    AnsiColors::BrightBlue,
    AnsiColors::BrightMagenta,
    AnsiColors::BrightCyan,
];

/// Stable mapping of an exchange id onto [`PALETTE`], so the request and
/// response lines of one exchange share a color.
pub fn color_for_id(id: &str) -> AnsiColors {
    let hash = id
        .chars()
        .fold(0u32, |acc, c| acc.wrapping_mul(31).wrapping_add(c as u32));
    PALETTE[hash as usize % PALETTE.len()]
}

/// `[id]` wrapped in ANSI color codes.
///
/// Used for exchange ids in the tracing sink and the demo handlers:
/// - the color comes from [`color_for_id`], so both lines of an exchange match
/// - the brackets are colored with the id, keeping the plain `[id]` text searchable
pub fn colored_id(id: &str) -> String {
    let style = Style::new().color(DynColors::Ansi(color_for_id(id)));
    format!("[{}]", id).style(style).to_string()
}

/// Direction marker: green `→` for requests, yellow `←` for responses.
pub fn side_arrow(side: Side) -> String {
    match side {
        Side::Request => "→".green().to_string(),
        Side::Response => "←".yellow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_determinism() {
        let color1 = color_for_id("V1StG");
        let color2 = color_for_id("V1StG");
        assert!(std::mem::discriminant(&color1) == std::mem::discriminant(&color2));
    }

    #[test]
    fn test_colored_id_format() {
        let result = colored_id("V1StG");
        assert!(result.contains("[V1StG]"));
        assert!(result.starts_with('\u{1b}'));
    }

    #[test]
    fn test_side_arrows_differ() {
        assert!(side_arrow(Side::Request).contains('→'));
        assert!(side_arrow(Side::Response).contains('←'));
    }
}
