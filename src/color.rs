//! Background color sampling and legible foreground selection.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{Error, Result};

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Inline declaration that overrides any author color on the target
    pub fn to_important_style(self) -> String {
        format!("color: {} !important;", self)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A computed background color as reported by the host surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`; `None` means fully opaque
    pub a: Option<f32>,
}

impl BackgroundSample {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: Some(a.clamp(0.0, 1.0)),
        }
    }

    /// Flatten onto an opaque canvas using source-over blending
    pub fn composite_over(self, canvas: Rgb) -> Rgb {
        let a = match self.a {
            None => return Rgb::new(self.r, self.g, self.b),
            Some(a) if a >= 1.0 => return Rgb::new(self.r, self.g, self.b),
            Some(a) => a.clamp(0.0, 1.0),
        };
        let blend = |fg: u8, bg: u8| -> u8 {
            (f32::from(fg) * a + f32::from(bg) * (1.0 - a)).round() as u8
        };
        Rgb::new(
            blend(self.r, canvas.r),
            blend(self.g, canvas.g),
            blend(self.b, canvas.b),
        )
    }
}

impl From<Rgb> for BackgroundSample {
    fn from(c: Rgb) -> Self {
        BackgroundSample::rgb(c.r, c.g, c.b)
    }
}

impl FromStr for BackgroundSample {
    type Err = Error;

    /// Parses the forms a computed `background-color` takes:
    /// `rgb(r, g, b)`, `rgba(r, g, b, a)`, `#rgb`, `#rrggbb` and `transparent`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidColor(s.to_string());
        let lower = s.to_ascii_lowercase();

        if lower == "transparent" {
            return Ok(BackgroundSample::rgba(0, 0, 0, 0.0));
        }

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let (args, with_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = lower.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(invalid());
        };
        let args = args.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();

        match (parts.as_slice(), with_alpha) {
            ([r, g, b], _) => Ok(BackgroundSample::rgb(
                channel(r).ok_or_else(invalid)?,
                channel(g).ok_or_else(invalid)?,
                channel(b).ok_or_else(invalid)?,
            )),
            ([r, g, b, a], true) => {
                let alpha: f32 = a.parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(invalid());
                }
                Ok(BackgroundSample::rgba(
                    channel(r).ok_or_else(invalid)?,
                    channel(g).ok_or_else(invalid)?,
                    channel(b).ok_or_else(invalid)?,
                    alpha,
                ))
            }
            _ => Err(invalid()),
        }
    }
}

fn channel(s: &str) -> Option<u8> {
    s.parse::<u8>().ok()
}

fn parse_hex(hex: &str) -> Option<BackgroundSample> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(BackgroundSample::rgb(out[0], out[1], out[2]))
        }
        6 => Some(BackgroundSample::rgb(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        _ => None,
    }
}

// Rec. 601 luma weights, scaled by 1000 so the midpoint test stays in integers.
const RED_WEIGHT: u32 = 299;
const GREEN_WEIGHT: u32 = 587;
const BLUE_WEIGHT: u32 = 114;
const WEIGHT_SUM: u32 = RED_WEIGHT + GREEN_WEIGHT + BLUE_WEIGHT;

/// Perceived brightness of an opaque color in `[0, 1]`
pub fn luminance(color: Rgb) -> f64 {
    f64::from(weighted_sum(color)) / f64::from(WEIGHT_SUM * 255)
}

fn weighted_sum(color: Rgb) -> u32 {
    RED_WEIGHT * u32::from(color.r)
        + GREEN_WEIGHT * u32::from(color.g)
        + BLUE_WEIGHT * u32::from(color.b)
}

/// Whether text on `color` should be dark. Luminance at exactly 0.5 counts
/// as light.
pub fn is_light(color: Rgb) -> bool {
    2 * weighted_sum(color) >= WEIGHT_SUM * 255
}

/// Pick black or white text for the given background, compositing any
/// translucency over `canvas` first.
pub fn select_foreground_color_over(background: BackgroundSample, canvas: Rgb) -> Rgb {
    let opaque = background.composite_over(canvas);
    let fg = if is_light(opaque) { Rgb::BLACK } else { Rgb::WHITE };
    log::debug!(
        "background {} (luminance {:.3}) -> foreground {}",
        opaque,
        luminance(opaque),
        fg
    );
    fg
}

/// Pick black or white text for the given background, assuming a white canvas
pub fn select_foreground_color(background: BackgroundSample) -> Rgb {
    select_foreground_color_over(background, Rgb::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(s: &str) -> Rgb {
        select_foreground_color(s.parse().expect("valid color"))
    }

    #[test]
    fn black_background_gets_white_text() {
        assert_eq!(pick("rgb(0, 0, 0)"), Rgb::WHITE);
        assert_eq!(pick("rgba(0, 0, 0, 1)"), Rgb::WHITE);
    }

    #[test]
    fn white_background_gets_black_text() {
        assert_eq!(pick("rgb(255, 255, 255)"), Rgb::BLACK);
        assert_eq!(pick("#fff"), Rgb::BLACK);
    }

    #[test]
    fn mid_gray_boundary() {
        // 127 * 1000 < 127_500 <= 128 * 1000
        assert_eq!(pick("rgb(127, 127, 127)"), Rgb::WHITE);
        assert_eq!(pick("rgb(128, 128, 128)"), Rgb::BLACK);
    }

    #[test]
    fn exact_midpoint_counts_as_light() {
        let tie = Rgb::new(0, 204, 68);
        assert_eq!(luminance(tie), 0.5);
        assert!(is_light(tie));
        assert_eq!(select_foreground_color(tie.into()), Rgb::BLACK);
    }

    #[test]
    fn weights_favor_green() {
        assert_eq!(pick("rgb(0, 255, 0)"), Rgb::BLACK);
        assert_eq!(pick("rgb(0, 0, 255)"), Rgb::WHITE);
        assert_eq!(pick("rgb(255, 0, 0)"), Rgb::WHITE);
    }

    #[test]
    fn translucent_backgrounds_composite_over_canvas() {
        let sample: BackgroundSample = "rgba(0, 0, 0, 0.2)".parse().unwrap();
        assert_eq!(sample.composite_over(Rgb::WHITE), Rgb::new(204, 204, 204));
        assert_eq!(select_foreground_color_over(sample, Rgb::WHITE), Rgb::BLACK);
        assert_eq!(select_foreground_color_over(sample, Rgb::BLACK), Rgb::WHITE);
    }

    #[test]
    fn transparent_shows_the_canvas() {
        assert_eq!(pick("transparent"), Rgb::BLACK);
    }

    #[test]
    fn parses_hex_forms() {
        let s: BackgroundSample = "#1a2B3c".parse().unwrap();
        assert_eq!(s, BackgroundSample::rgb(0x1a, 0x2b, 0x3c));
        let s: BackgroundSample = "#abc".parse().unwrap();
        assert_eq!(s, BackgroundSample::rgb(0xaa, 0xbb, 0xcc));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "red", "rgb(1, 2)", "rgb(256, 0, 0)", "rgb(0, 0, 0, 1)", "rgba(0, 0, 0, 2)", "#12", "#ggg"] {
            assert!(bad.parse::<BackgroundSample>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn inline_override_text() {
        assert_eq!(Rgb::BLACK.to_important_style(), "color: rgb(0, 0, 0) !important;");
        assert_eq!(
            Rgb::WHITE.to_important_style(),
            "color: rgb(255, 255, 255) !important;"
        );
    }
}
