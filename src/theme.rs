//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use matchtui::TileKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Gem colours, one per palette index (0..=8).
    pub gems: [Color; 9],
    /// Special tile.
    pub special: Color,
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (hints, leaderboard).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

/// Hex literal from a built-in table.
fn hex(s: &str) -> Color {
    parse_hex(s).unwrap_or(Color::Reset)
}

/// Theme keys tried for each gem, with the One Dark fallback.
const GEM_KEYS: [(&[&str], &str); 9] = [
    (&["cpu_end", "temp_end"], "#E06C75"),
    (&["mem_box", "cpu_start"], "#98C379"),
    (&["cpu_box"], "#61AFEF"),
    (&["title", "cpu_mid"], "#E5C07B"),
    (&["net_box"], "#C678DD"),
    (&["hi_fg", "proc_misc"], "#56B6C2"),
    (&["proc_box"], "#D19A66"),
    (&["main_fg"], "#ABB2BF"),
    (&["used_end"], "#BE5046"),
];

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            gems: GEM_KEYS.map(|(_, fallback)| hex(fallback)),
            special: hex("#FFFFFF"),
            bg: hex("#31353F"),
            div_line: hex("#3F444F"),
            main_fg: hex("#ABB2BF"),
            title: hex("#E5C07B"),
            inactive_fg: hex("#5C6370"),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override gem colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        let gems = match palette {
            crate::Palette::Normal => return,
            crate::Palette::HighContrast => [
                "#FF0000", "#00FF00", "#0088FF", "#FFFF00", "#FF00FF", "#00FFFF", "#FF8800",
                "#FFFFFF", "#8844FF",
            ],
            // Okabe-Ito plus two high-luminance extras.
            crate::Palette::Colorblind => [
                "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7",
                "#999999", "#FFFFFF",
            ],
        };
        self.gems = gems.map(hex);
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let defaults = Self::onedark_default();
        Self {
            gems: GEM_KEYS.map(|(keys, fallback)| {
                keys.iter()
                    .find_map(|k| get(*k))
                    .unwrap_or_else(|| hex(fallback))
            }),
            special: get("selected_fg").unwrap_or(defaults.special),
            bg: get("meter_bg").unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    /// Colour for a tile kind.
    #[inline]
    pub fn tile_color(&self, kind: TileKind) -> Color {
        match kind {
            TileKind::Gem(i) => self.gems[(i as usize) % self.gems.len()],
            TileKind::Special => self.special,
        }
    }
}

/// Glyph drawn for a tile kind; distinct shapes so the board reads without colour.
pub fn tile_glyph(kind: TileKind) -> &'static str {
    match kind {
        TileKind::Gem(0) => "●",
        TileKind::Gem(1) => "■",
        TileKind::Gem(2) => "▲",
        TileKind::Gem(3) => "◆",
        TileKind::Gem(4) => "♥",
        TileKind::Gem(5) => "♣",
        TileKind::Gem(6) => "♠",
        TileKind::Gem(7) => "▼",
        TileKind::Gem(_) => "◉",
        TileKind::Special => "✦",
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(eq) = rest.find('=') {
            let value = rest[eq + 1..]
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string();
            if !value.is_empty() {
                map.insert(key.to_string(), value);
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let digit = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 if s.is_ascii() => (digit(0..2)?, digit(2..4)?, digit(4..6)?),
        3 if s.is_ascii() => (digit(0..1)? * 17, digit(1..2)? * 17, digit(2..3)? * 17),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("zzzzzz").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_gem() {
        let map = parse_theme_file("theme[cpu_box]=\"#010203\"\n# comment\n");
        let t = Theme::from_map(&map);
        assert_eq!(t.tile_color(TileKind::Gem(2)), Color::Rgb(1, 2, 3));
        assert_eq!(t.tile_color(TileKind::Special), Theme::default().special);
    }

    #[test]
    fn test_glyphs_distinct_for_full_palette() {
        let mut glyphs: Vec<_> = (0..9).map(|i| tile_glyph(TileKind::Gem(i))).collect();
        glyphs.push(tile_glyph(TileKind::Special));
        let n = glyphs.len();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), n);
    }
}
