//! Theme colors for the UI and the ball palette
//! Dark and light variants are toggled at runtime and never saved.

use ratatui::style::Color;

/// Built-in ball colors, one per board position
const BALL_PALETTE_HEX: [&str; 6] = [
    "#f8b26a", // orange
    "#6ec6ff", // blue
    "#7bd389", // green
    "#f86d6d", // red
    "#b58df1", // purple
    "#f7d36a", // gold
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }
}

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,           // Active borders, highlights
    pub danger: Color,           // Errors, fortune failures
    pub success: Color,          // Fortune running, good luck
    pub warning: Color,          // Status messages
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Hints, placeholders
    pub bg: Color,               // Background
    pub inactive: Color,         // Inactive borders
    pub header: Color,           // Section headers
    pub ball_text: Color,        // Number drawn on a colored ball
    pub placeholder: Color,      // Background of an empty slot
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Catppuccin-inspired dark colors
    fn dark() -> Self {
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(249, 226, 175),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg: Color::Rgb(30, 30, 46),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
            ball_text: Color::Rgb(17, 17, 27),
            placeholder: Color::Rgb(49, 50, 68),
        }
    }

    fn light() -> Self {
        Self {
            accent: Color::Rgb(254, 100, 11),
            danger: Color::Rgb(210, 15, 57),
            success: Color::Rgb(64, 160, 43),
            warning: Color::Rgb(223, 142, 29),
            text: Color::Rgb(76, 79, 105),
            text_dim: Color::Rgb(124, 127, 147),
            bg: Color::Rgb(239, 241, 245),
            inactive: Color::Rgb(172, 176, 190),
            header: Color::Rgb(136, 57, 239),
            ball_text: Color::Rgb(255, 255, 255),
            placeholder: Color::Rgb(204, 208, 218),
        }
    }
}

pub fn default_ball_palette() -> Vec<Color> {
    BALL_PALETTE_HEX
        .iter()
        .filter_map(|hex| parse_hex_color(hex))
        .collect()
}

/// Build a ball palette from configured hex strings, skipping bad entries.
/// Returns an empty palette if nothing parses; the renderer then uses the default.
pub fn ball_palette(entries: &[String]) -> Vec<Color> {
    entries
        .iter()
        .filter_map(|entry| {
            let color = parse_hex_color(entry);
            if color.is_none() {
                tracing::warn!("Ignoring invalid palette color: {}", entry);
            }
            color
        })
        .collect()
}

/// Parse a hex color string (#RRGGBB or #RGB)
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');

    if !s.is_ascii() {
        return None;
    }

    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
        let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
        let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
        Some(Color::Rgb(r, g, b))
    } else {
        None
    }
}
