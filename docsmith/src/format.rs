//! Formatting value types shared by the reader, extractor and builder
//!
//! All lengths are in points. Conversion to OOXML units (twips, half-points)
//! happens only at the document boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Twips per point (OOXML spacing and indent unit)
pub const TWIPS_PER_POINT: f64 = 20.0;

/// Line spacing value for single spacing in `w:spacing/@w:line` with auto rule
pub const AUTO_LINE_UNIT: f64 = 240.0;

/// Convert twips to points
pub fn twips_to_points(twips: f64) -> f64 {
    twips / TWIPS_PER_POINT
}

/// Convert points to twips, rounding to the nearest whole twip
pub fn points_to_twips(points: f64) -> i32 {
    (points * TWIPS_PER_POINT).round() as i32
}

/// Convert points to half-points (the OOXML font size unit)
pub fn points_to_half_points(points: f64) -> usize {
    (points * 2.0).round().max(0.0) as usize
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Map a `w:jc` value to an alignment
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" | "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// RGB colour, serialized as `RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Parse `RRGGBB` or `#RRGGBB`
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Uppercase hex without a leading `#`, the form OOXML expects
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid colour '{value}'"))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Character-level formatting; unset fields inherit from the style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    /// Size in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl RunFormat {
    /// True when no attribute is set
    pub fn is_empty(&self) -> bool {
        *self == RunFormat::default()
    }

    /// Fill unset fields from `base`
    pub fn or(mut self, base: &RunFormat) -> RunFormat {
        if self.font_name.is_none() {
            self.font_name.clone_from(&base.font_name);
        }
        self.font_size = self.font_size.or(base.font_size);
        self.bold = self.bold.or(base.bold);
        self.italic = self.italic.or(base.italic);
        self.underline = self.underline.or(base.underline);
        self.color = self.color.or(base.color);
        self
    }
}

/// Paragraph-level formatting; lengths in points, line spacing as a multiplier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
    /// Fixed line height in points, used instead of `line_spacing` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_indent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_indent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_line_indent: Option<f64>,
}

impl ParagraphFormat {
    /// True when no attribute is set
    pub fn is_empty(&self) -> bool {
        *self == ParagraphFormat::default()
    }

    /// Fill unset fields from `base`
    pub fn or(mut self, base: &ParagraphFormat) -> ParagraphFormat {
        self.alignment = self.alignment.or(base.alignment);
        self.line_spacing = self.line_spacing.or(base.line_spacing);
        self.line_height = self.line_height.or(base.line_height);
        self.space_before = self.space_before.or(base.space_before);
        self.space_after = self.space_after.or(base.space_after);
        self.left_indent = self.left_indent.or(base.left_indent);
        self.right_indent = self.right_indent.or(base.right_indent);
        self.first_line_indent = self.first_line_indent.or(base.first_line_indent);
        self
    }
}

/// Page size and margins in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub left_margin: f64,
    pub right_margin: f64,
}

impl Default for PageGeometry {
    /// US Letter with one inch margins
    fn default() -> Self {
        PageGeometry {
            page_width: 8.5 * POINTS_PER_INCH,
            page_height: 11.0 * POINTS_PER_INCH,
            top_margin: POINTS_PER_INCH,
            bottom_margin: POINTS_PER_INCH,
            left_margin: POINTS_PER_INCH,
            right_margin: POINTS_PER_INCH,
        }
    }
}

impl PageGeometry {
    /// Same page size with every margin set to `inches`
    pub fn with_margins(mut self, inches: f64) -> Self {
        let points = inches * POINTS_PER_INCH;
        self.top_margin = points;
        self.bottom_margin = points;
        self.left_margin = points;
        self.right_margin = points;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_parsing() {
        assert_eq!(Rgb::from_hex("#D9E2F3"), Some(Rgb(0xD9, 0xE2, 0xF3)));
        assert_eq!(Rgb::from_hex("666666"), Some(Rgb(102, 102, 102)));
        assert_eq!(Rgb::from_hex("auto"), None);
        assert_eq!(Rgb::from_hex("12345"), None);
        assert_eq!(Rgb(51, 51, 51).to_hex(), "333333");
    }

    #[test]
    fn test_rgb_serializes_as_hex_string() {
        // Arrange
        let format = RunFormat {
            color: Some(Rgb(128, 128, 128)),
            ..Default::default()
        };

        // Act
        let json = serde_json::to_string(&format).unwrap();
        let back: RunFormat = serde_json::from_str(&json).unwrap();

        // Assert
        assert_eq!(json, r#"{"color":"808080"}"#);
        assert_eq!(back, format);
    }

    #[test]
    fn test_format_or_keeps_own_values() {
        // Arrange
        let own = ParagraphFormat {
            space_after: Some(3.0),
            ..Default::default()
        };
        let base = ParagraphFormat {
            space_after: Some(12.0),
            alignment: Some(Alignment::Center),
            ..Default::default()
        };

        // Act
        let merged = own.or(&base);

        // Assert
        assert_eq!(merged.space_after, Some(3.0));
        assert_eq!(merged.alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(points_to_twips(18.0), 360);
        assert_eq!(points_to_half_points(10.5), 21);
        assert!((twips_to_points(1440.0) - 72.0).abs() < f64::EPSILON);
        assert_eq!(Alignment::from_ooxml("both"), Some(Alignment::Justify));
        assert_eq!(Alignment::from_ooxml("bogus"), None);
    }

    #[test]
    fn test_default_page_is_letter_with_inch_margins() {
        let page = PageGeometry::default();
        assert_eq!(page.page_width, 612.0);
        assert_eq!(page.page_height, 792.0);
        assert_eq!(page.with_margins(0.5).left_margin, 36.0);
    }
}
