//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Styles for empty, 2, 4, ... 8192. Larger tiles reuse the last entry.
pub const TILE_STYLES: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileStyle {
    pub bg: Color,
    pub fg: Color,
}

/// Classic tile palette and UI colours, optionally loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// `tiles[k]` styles the tile 2^k; `tiles[0]` is an empty cell.
    pub tiles: [TileStyle; TILE_STYLES],
    /// Board background (gaps between tiles).
    pub bg: Color,
    /// Sidebar / overlay borders.
    pub div_line: Color,
    /// Text (score, moves).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (hints, key help).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const DARK_TEXT: Color = rgb(0x776E65);
const LIGHT_TEXT: Color = rgb(0xF9F6F2);

const fn tile(bg: u32, fg: Color) -> TileStyle {
    TileStyle { bg: rgb(bg), fg }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Classic 2048 palette.
    pub fn classic() -> Self {
        Self {
            tiles: [
                tile(0xCDC1B4, DARK_TEXT),
                tile(0xEEE4DA, DARK_TEXT),
                tile(0xEDE0C8, DARK_TEXT),
                tile(0xF2B179, LIGHT_TEXT),
                tile(0xF59563, LIGHT_TEXT),
                tile(0xF67C5F, LIGHT_TEXT),
                tile(0xF65E3B, LIGHT_TEXT),
                tile(0xEDCF72, LIGHT_TEXT),
                tile(0xEDCC61, LIGHT_TEXT),
                tile(0xEDC850, LIGHT_TEXT),
                tile(0xEDC53F, LIGHT_TEXT),
                tile(0xEDC22E, LIGHT_TEXT),
                tile(0x3C39A4, LIGHT_TEXT),
                tile(0xA939A4, LIGHT_TEXT),
            ],
            bg: rgb(0xBBADA0),
            div_line: rgb(0x8F7A66),
            main_fg: rgb(0xEEE4DA),
            title: rgb(0xEDC22E),
            inactive_fg: rgb(0x9E948A),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to the classic palette if path is None or the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default()),
        };
        let s = std::fs::read_to_string(path)?;
        Self::from_map(&parse_theme_file(&s))
    }

    /// Keys: `tile_<value>` / `tile_<value>_fg`, `empty`, `bg`, `div_line`, `main_fg`, `title`, `inactive_fg`.
    /// Missing keys keep the classic colour; a malformed colour is an error.
    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let mut theme = Self::classic();
        let get = |key: &str| map.get(key).map(|v| parse_hex(v)).transpose();

        if let Some(c) = get("empty")? {
            theme.tiles[0].bg = c;
        }
        for k in 1..TILE_STYLES {
            let value = 1u32 << k;
            if let Some(c) = get(&format!("tile_{value}"))? {
                theme.tiles[k].bg = c;
            }
            if let Some(c) = get(&format!("tile_{value}_fg"))? {
                theme.tiles[k].fg = c;
            }
        }
        for (key, slot) in [
            ("bg", &mut theme.bg),
            ("div_line", &mut theme.div_line),
            ("main_fg", &mut theme.main_fg),
            ("title", &mut theme.title),
            ("inactive_fg", &mut theme.inactive_fg),
        ] {
            if let Some(c) = get(key)? {
                *slot = c;
            }
        }
        Ok(theme)
    }

    /// Style for a tile value (0 = empty).
    #[inline]
    pub fn tile_style(&self, value: u32) -> TileStyle {
        let index = if value == 0 {
            0
        } else {
            (value.trailing_zeros() as usize).min(TILE_STYLES - 1)
        };
        self.tiles[index]
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
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
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
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#EDC22E").unwrap();
        assert!(matches!(c, Color::Rgb(0xED, 0xC2, 0x2E)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
        assert!(parse_hex("#GG0000").is_err());
        assert!(parse_hex("#12345").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[tile_2]="#eee4da""##);
        assert_eq!(map.get("tile_2"), Some(&"#eee4da".to_string()));
    }

    #[test]
    fn test_tile_style_lookup() {
        let t = Theme::classic();
        assert_eq!(t.tile_style(0), t.tiles[0]);
        assert_eq!(t.tile_style(2048).bg, rgb(0xEDC22E));
        assert_eq!(t.tile_style(1 << 20), t.tiles[TILE_STYLES - 1]);
    }

    #[test]
    fn test_from_map_overrides_and_rejects_bad_hex() {
        let map = parse_theme_file("theme[tile_4]=\"#000000\"\ntheme[title]='#FFF'\n");
        let t = Theme::from_map(&map).unwrap();
        assert_eq!(t.tile_style(4).bg, Color::Rgb(0, 0, 0));
        assert_eq!(t.title, Color::Rgb(255, 255, 255));
        assert_eq!(t.tile_style(8), Theme::classic().tile_style(8));

        let map = parse_theme_file("theme[bg]=\"nope\"");
        assert!(matches!(Theme::from_map(&map), Err(ThemeError::InvalidHex(_))));
    }
}
