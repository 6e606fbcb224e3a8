//! Symbolic colour palette used by style templates

use crate::format::Rgb;

/// Fixed palette entries
const PALETTE: &[(&str, Rgb)] = &[
    ("primary", Rgb(0, 0, 0)),
    ("secondary", Rgb(102, 102, 102)),
    ("heading", Rgb(51, 51, 51)),
    ("placeholder", Rgb(128, 128, 128)),
    ("table_header_text", Rgb(0, 0, 0)),
    ("table_header_bg", Rgb(0xD9, 0xE2, 0xF3)),
    ("quote_bg", Rgb(0xF5, 0xF5, 0xF5)),
    ("code_bg", Rgb(0xF0, 0xF0, 0xF0)),
];

/// Resolve a symbolic colour name or a `#RRGGBB` literal
///
/// Unknown names resolve to black.
pub fn resolve_color(name: &str) -> Rgb {
    let key = name.trim();
    if let Some((_, rgb)) = PALETTE.iter().find(|(n, _)| *n == key) {
        return *rgb;
    }
    if let Some(rgb) = Rgb::from_hex(key) {
        return rgb;
    }
    log::debug!("Unknown colour '{}', using black", key);
    Rgb::BLACK
}

/// Whether `name` is a palette entry or a hex literal
pub fn is_known_color(name: &str) -> bool {
    let key = name.trim();
    PALETTE.iter().any(|(n, _)| *n == key) || Rgb::from_hex(key).is_some()
}
