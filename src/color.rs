use egui::Color32;
use tiny_skia::ColorU8;

use crate::error::{DrawingError, DrawingResult};

/// Named colors accepted by [`parse_color`], matched case-insensitively.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0x00, 0x00, 0x00]),
    ("darkgray", [0x44, 0x44, 0x44]),
    ("darkgrey", [0x44, 0x44, 0x44]),
    ("gray", [0x88, 0x88, 0x88]),
    ("grey", [0x88, 0x88, 0x88]),
    ("lightgray", [0xCC, 0xCC, 0xCC]),
    ("lightgrey", [0xCC, 0xCC, 0xCC]),
    ("white", [0xFF, 0xFF, 0xFF]),
    ("red", [0xFF, 0x00, 0x00]),
    ("green", [0x00, 0xFF, 0x00]),
    ("blue", [0x00, 0x00, 0xFF]),
    ("yellow", [0xFF, 0xFF, 0x00]),
    ("cyan", [0x00, 0xFF, 0xFF]),
    ("magenta", [0xFF, 0x00, 0xFF]),
    ("aqua", [0x00, 0xFF, 0xFF]),
    ("fuchsia", [0xFF, 0x00, 0xFF]),
    ("lime", [0x00, 0xFF, 0x00]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
    ("olive", [0x80, 0x80, 0x00]),
    ("purple", [0x80, 0x00, 0x80]),
    ("silver", [0xC0, 0xC0, 0xC0]),
    ("teal", [0x00, 0x80, 0x80]),
];

/// Opaque color from its channels
pub fn rgb(r: u8, g: u8, b: u8) -> ColorU8 {
    ColorU8::from_rgba(r, g, b, 255)
}

/// Premultiplied egui color for drawing swatches and previews.
pub fn to_color32(color: ColorU8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.red(), color.green(), color.blue(), color.alpha())
}

/// Parse a color string into straight (unmultiplied) RGBA.
///
/// Accepts `#RRGGBB`, `#AARRGGBB` (alpha first) or one of the named colors.
pub fn parse_color(input: &str) -> DrawingResult<ColorU8> {
    let invalid = || DrawingError::InvalidColorFormat(input.to_owned());
    let trimmed = input.trim();

    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        let [a, r, g, b] = match hex.len() {
            6 => (0xFF00_0000 | value).to_be_bytes(),
            8 => value.to_be_bytes(),
            _ => return Err(invalid()),
        };
        return Ok(ColorU8::from_rgba(r, g, b, a));
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(_, [r, g, b])| rgb(*r, *g, *b))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_hex() {
        assert_eq!(parse_color("#FF0000").unwrap(), rgb(255, 0, 0));
        assert_eq!(parse_color("#00ff00").unwrap(), rgb(0, 255, 0));
    }

    #[test]
    fn parses_argb_hex() {
        let color = parse_color("#FF0000FF").unwrap();
        assert_eq!(color, rgb(0, 0, 255));

        let translucent = parse_color("#00000000").unwrap();
        assert_eq!(translucent.alpha(), 0);
    }

    #[test]
    fn translucent_channels_are_kept_exactly() {
        let color = parse_color("#10123456").unwrap();
        assert_eq!(
            [color.red(), color.green(), color.blue(), color.alpha()],
            [0x12, 0x34, 0x56, 0x10]
        );

        let faint = parse_color("#05FFFFFF").unwrap();
        assert_eq!(
            [faint.red(), faint.green(), faint.blue(), faint.alpha()],
            [255, 255, 255, 5]
        );
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!(parse_color("red").unwrap(), rgb(255, 0, 0));
        assert_eq!(parse_color("Black").unwrap(), rgb(0, 0, 0));
        assert_eq!(parse_color("WHITE").unwrap(), rgb(255, 255, 255));
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["", "#", "#FFF", "#GG0000", "#FF00000", "#+F0000", "chartreuse", "FF0000"] {
            match parse_color(bad) {
                Err(DrawingError::InvalidColorFormat(s)) => assert_eq!(s, bad),
                other => panic!("expected InvalidColorFormat for {bad:?}, got {other:?}"),
            }
        }
    }
}
