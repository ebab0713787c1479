// Copyright (c) 2026 rezky_nightky

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::palette::{color_mode_from_flag, detect_color_mode_auto, Rgb};
use crate::rain::RainParams;
use crate::runtime::{ColorMode, TrailShading};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphrain --trail 20 --drops 3,5 --speed 1,6 --head-color 255,255,255 --trail-color 0,255,0 --glyph-size 12 --frame-ms 16 --shading wrapping --font auto";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{0}")]
    ColorMode(String),
}

fn require_range<T>(name: &'static str, v: T, min: T, max: T) -> Result<T, ConfigError>
where
    T: PartialOrd + ToString,
{
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(v)
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

/// `LOW,HIGH` with `HIGH` exclusive, as used for drop counts and speeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct U16Range {
    pub low: u16,
    pub high: u16,
}

impl FromStr for U16Range {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: LOW,HIGH".to_string())?;
        let low: u16 = a
            .trim()
            .parse()
            .map_err(|_| "invalid low value".to_string())?;
        let high: u16 = b
            .trim()
            .parse()
            .map_err(|_| "invalid high value".to_string())?;
        if low == 0 || low >= high {
            return Err("range must be >0 and LOW < HIGH (HIGH is exclusive)".to_string());
        }
        Ok(Self { low, high })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'L',
        long = "trail",
        default_value_t = 20,
        help_heading = "RAIN",
        help = "Trail length in cells (min 1 max 255)"
    )]
    pub trail: u8,

    #[arg(
        short = 'd',
        long = "drops",
        default_value = "3,5",
        help_heading = "RAIN",
        help = "Drops per column: LOW,HIGH (HIGH exclusive, max 255)"
    )]
    pub drops: U16Range,

    #[arg(
        short = 'S',
        long = "speed",
        default_value = "1,6",
        help_heading = "RAIN",
        help = "Frames per step: LOW,HIGH (HIGH exclusive, max 1000)"
    )]
    pub speed: U16Range,

    #[arg(
        long = "seed",
        help_heading = "RAIN",
        help = "Seed the random source for a reproducible rain"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "head-color",
        default_value_t = Rgb::WHITE,
        help_heading = "APPEARANCE",
        help = "Drop head color: R,G,B or #RRGGBB"
    )]
    pub head_color: Rgb,

    #[arg(
        long = "trail-color",
        default_value_t = Rgb::GREEN,
        help_heading = "APPEARANCE",
        help = "Trail color: R,G,B or #RRGGBB"
    )]
    pub trail_color: Rgb,

    #[arg(
        long = "shading",
        default_value_t = TrailShading::Wrapping,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Trail brightness ramp (wrapping, linear)"
    )]
    pub shading: TrailShading,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "font",
        default_value = "auto",
        help_heading = "APPEARANCE",
        help = "Glyph face name (see --list-fonts) or path to a glyph sheet"
    )]
    pub font: String,

    #[arg(
        long = "glyph-size",
        default_value_t = 12,
        help_heading = "APPEARANCE",
        help = "Glyph cell size in pixels (min 1 max 256)"
    )]
    pub glyph_size: u16,

    #[arg(
        short = 'f',
        long = "frame-ms",
        default_value_t = 16,
        help_heading = "PERFORMANCE",
        help = "Target frame interval in ms (min 1 max 1000)"
    )]
    pub frame_ms: u64,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write diagnostics to this file (filter via RUST_LOG, default info). Without it, RUST_LOG logs to stderr and draws over the rain"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-fonts",
        help_heading = "HELP",
        help = "List built-in glyph faces and exit"
    )]
    pub list_fonts: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub trail_len: u8,
    pub min_drops: u8,
    pub max_drops: u8,
    pub min_speed: u16,
    pub max_speed: u16,
    pub head: Rgb,
    pub trail: Rgb,
    pub shading: TrailShading,
    pub glyph_size: u16,
    pub frame_interval: Duration,
    pub seed: Option<u64>,
    pub color_mode: ColorMode,
    pub default_background: bool,
    pub font: String,
    pub default_to_ascii: bool,
    pub duration: Option<Duration>,
    pub perf_stats: bool,
}

pub fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let color_mode = match args.colormode {
            Some(bits) => color_mode_from_flag(bits).map_err(ConfigError::ColorMode)?,
            None => detect_color_mode_auto(),
        };
        Self::with_color_mode(args, color_mode)
    }

    fn with_color_mode(args: &Args, color_mode: ColorMode) -> Result<Self, ConfigError> {
        let trail_len = require_range("--trail", args.trail, 1, 255)?;
        require_range("--drops high", args.drops.high, 2, 255)?;
        require_range("--speed high", args.speed.high, 2, 1000)?;
        let glyph_size = require_range("--glyph-size", args.glyph_size, 1, 256)?;
        let frame_ms = require_range("--frame-ms", args.frame_ms, 1, 1000)?;

        let duration = match args.duration {
            Some(s) if !s.is_finite() => {
                return Err(ConfigError::NotFinite {
                    name: "--duration",
                    value: s,
                })
            }
            Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            _ => None,
        };

        Ok(Self {
            trail_len,
            min_drops: args.drops.low as u8,
            max_drops: args.drops.high as u8,
            min_speed: args.speed.low,
            max_speed: args.speed.high,
            head: args.head_color,
            trail: args.trail_color,
            shading: args.shading,
            glyph_size,
            frame_interval: Duration::from_millis(frame_ms),
            seed: args.seed,
            color_mode,
            default_background: matches!(
                args.color_bg,
                ColorBg::DefaultBackground | ColorBg::Transparent
            ),
            font: args.font.clone(),
            default_to_ascii: default_to_ascii(),
            duration,
            perf_stats: args.perf_stats,
        })
    }

    pub fn rain_params(&self) -> RainParams {
        RainParams {
            trail_len: self.trail_len,
            min_drops: self.min_drops,
            max_drops: self.max_drops,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
        }
    }
}
