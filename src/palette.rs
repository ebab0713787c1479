// Copyright (c) 2026 rezky_nightky

use std::env;
use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;

use crate::runtime::{ColorMode, TrailShading};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn map(self, f: impl Fn(u8) -> u8) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// Accepts `R,G,B` (decimal) or `#RRGGBB`.
impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err("expected: #RRGGBB".to_string());
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| format!("invalid hex channel: {}", &hex[i..i + 2]))
            };
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err("expected: R,G,B or #RRGGBB".to_string());
        }
        let channel = |p: &str| {
            p.parse::<u8>()
                .map_err(|_| format!("invalid channel value: {} (min 0 max 255)", p))
        };
        Ok(Self::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
        ))
    }
}

/// Color of a trail cell `age` steps into the trail (`age >= 1`).
///
/// `Wrapping` keeps the classic 8-bit arithmetic: the step product and then
/// every channel product are truncated modulo 256.
pub fn trail_rgb(trail: Rgb, alpha_unit: u32, age: u8, shading: TrailShading) -> Rgb {
    let steps = u32::from(age.saturating_sub(1));
    match shading {
        TrailShading::Wrapping => {
            let hard = alpha_unit.wrapping_mul(steps) as u8;
            trail.map(|c| c.wrapping_mul(hard))
        }
        TrailShading::Linear => {
            let level = alpha_unit.saturating_mul(steps).min(255);
            trail.map(|c| ((u32::from(c) * level) / 255) as u8)
        }
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

pub fn terminal_color(mode: ColorMode, rgb: Rgb) -> Option<Color> {
    let Rgb { r, g, b } = rgb;
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
    }
}

pub fn background(mode: ColorMode, default_background: bool) -> Option<Color> {
    if default_background {
        return None;
    }
    terminal_color(mode, Rgb::BLACK)
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    color_mode_from_env(&colorterm, &term)
}

fn color_mode_from_env(colorterm: &str, term: &str) -> ColorMode {
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    if term.is_empty() || term == "linux" || term.starts_with("vt") {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

pub fn color_mode_from_flag(bits: u16) -> Result<ColorMode, String> {
    match bits {
        0 => Ok(ColorMode::Mono),
        16 => Ok(ColorMode::Color16),
        8 | 256 => Ok(ColorMode::Color256),
        24 | 32 => Ok(ColorMode::TrueColor),
        _ => Err(format!(
            "invalid --colormode: {} (allowed: 0,16,8/256,24/32)",
            bits
        )),
    }
}

pub fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Mono => "mono",
        ColorMode::Color16 => "16-color",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex_colors() {
        assert_eq!("0,255,0".parse::<Rgb>().unwrap(), Rgb::GREEN);
        assert_eq!(" 255, 255 ,255 ".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!("#00ff7F".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 127));
        assert!("256,0,0".parse::<Rgb>().is_err());
        assert!("1,2".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn wrapping_shading_matches_eight_bit_products() {
        // alpha_unit for a 20-cell trail is 12.
        let w = TrailShading::Wrapping;
        assert_eq!(trail_rgb(Rgb::GREEN, 12, 1, w), Rgb::BLACK);
        // 255 * 12 = 3060, 3060 mod 256 = 244
        assert_eq!(trail_rgb(Rgb::GREEN, 12, 2, w), Rgb::new(0, 244, 0));
        // 12 * 19 = 228, 255 * 228 mod 256 = 28
        assert_eq!(trail_rgb(Rgb::GREEN, 12, 20, w), Rgb::new(0, 28, 0));
        // 1 * 12 = 12 for a channel of 1
        assert_eq!(trail_rgb(Rgb::new(1, 0, 2), 12, 2, w), Rgb::new(12, 0, 24));
    }

    #[test]
    fn wrapping_shading_truncates_the_step_product() {
        // 36 * 8 = 288 -> 32
        let c = trail_rgb(Rgb::new(1, 1, 1), 36, 9, TrailShading::Wrapping);
        assert_eq!(c, Rgb::new(32, 32, 32));
    }

    #[test]
    fn linear_shading_saturates() {
        let l = TrailShading::Linear;
        assert_eq!(trail_rgb(Rgb::GREEN, 12, 1, l), Rgb::BLACK);
        assert_eq!(trail_rgb(Rgb::GREEN, 12, 11, l), Rgb::new(0, 120, 0));
        assert_eq!(trail_rgb(Rgb::GREEN, 255, 3, l), Rgb::GREEN);
        assert_eq!(
            trail_rgb(Rgb::new(200, 100, 50), 51, 6, l),
            Rgb::new(200, 100, 50)
        );
    }

    #[test]
    fn terminal_color_follows_mode() {
        assert_eq!(terminal_color(ColorMode::Mono, Rgb::WHITE), None);
        assert_eq!(
            terminal_color(ColorMode::TrueColor, Rgb::GREEN),
            Some(Color::Rgb { r: 0, g: 255, b: 0 })
        );
        assert_eq!(
            terminal_color(ColorMode::Color256, Rgb::WHITE),
            Some(Color::AnsiValue(231))
        );
        assert_eq!(
            terminal_color(ColorMode::Color256, Rgb::GREEN),
            Some(Color::AnsiValue(46))
        );
        assert_eq!(
            terminal_color(ColorMode::Color16, Rgb::new(0, 120, 0)),
            Some(Color::DarkGreen)
        );
    }

    #[test]
    fn env_detection() {
        assert_eq!(color_mode_from_env("truecolor", "xterm"), ColorMode::TrueColor);
        assert_eq!(color_mode_from_env("", "xterm-256color"), ColorMode::Color256);
        assert_eq!(color_mode_from_env("", "dumb"), ColorMode::Mono);
        assert_eq!(color_mode_from_env("", "linux"), ColorMode::Color16);
        assert_eq!(color_mode_from_env("", "xterm"), ColorMode::Color256);
    }

    #[test]
    fn colormode_flag_values() {
        assert_eq!(color_mode_from_flag(256).unwrap(), ColorMode::Color256);
        assert_eq!(color_mode_from_flag(32).unwrap(), ColorMode::TrueColor);
        assert!(color_mode_from_flag(4).is_err());
    }
}
