//! Brush model: colour, width and variant.
//!
//! The brush is a plain value owned by the caller and passed by reference
//! on every sample, so a change between two samples shows up on the very
//! next segment.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BRUSH: f32 = 5.0;
pub const MIN_BRUSH:     f32 = 1.0;
pub const MAX_BRUSH:     f32 = 50.0;

// ════════════════════════════════════════════════════════════════════════════
// Rgba
// ════════════════════════════════════════════════════════════════════════════

/// Straight-alpha colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0x00, 0x00, 0x00);
    pub const RED:   Rgba = Rgba::opaque(0xE5, 0x39, 0x35);
    pub const GREEN: Rgba = Rgba::opaque(0x00, 0x80, 0x00);
    pub const BLUE:  Rgba = Rgba::opaque(0x00, 0x00, 0xFF);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 0xFF }
    }

    /// Packed `0xAARRGGBB`, the layout used by the raster.
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const fn from_argb(v: u32) -> Self {
        Rgba {
            a: (v >> 24) as u8,
            r: (v >> 16) as u8,
            g: (v >>  8) as u8,
            b:  v        as u8,
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() { return None; }
        let byte = |i: usize| u8::from_str_radix(s.get(i..i + 2)?, 16).ok();
        match s.len() {
            6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Rgba { r: byte(0)?, g: byte(2)?, b: byte(4)?, a: byte(6)? }),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 0xFF {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Rgba::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid colour {:?}", s)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Brush variants
// ════════════════════════════════════════════════════════════════════════════

/// How a segment's ends are finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    /// Half-disc on each end.
    Round,
    /// Half-square on each end (extends the segment by `width / 2`).
    Square,
    /// Flat, exactly at the endpoints.
    Butt,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushKind {
    #[default]
    Round,
    Square,
    Line,
}

impl BrushKind {
    pub const ALL: [BrushKind; 3] = [BrushKind::Round, BrushKind::Square, BrushKind::Line];

    pub fn cap(self) -> LineCap {
        match self {
            BrushKind::Round  => LineCap::Round,
            BrushKind::Square => LineCap::Square,
            BrushKind::Line   => LineCap::Butt,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BrushKind::Round  => "round",
            BrushKind::Square => "square",
            BrushKind::Line   => "line",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// BrushConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub color: Rgba,
    pub width: f32,
    pub kind:  BrushKind,
}

impl Default for BrushConfig {
    fn default() -> Self {
        BrushConfig {
            color: Rgba::BLACK,
            width: DEFAULT_BRUSH,
            kind:  BrushKind::Round,
        }
    }
}

impl BrushConfig {
    pub fn cap(&self) -> LineCap {
        self.kind.cap()
    }

    /// Set the width, clamped to `[MIN_BRUSH, MAX_BRUSH]`.
    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(MIN_BRUSH, MAX_BRUSH);
    }

    pub fn adjust_width(&mut self, delta: f32) {
        self.set_width(self.width + delta);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
