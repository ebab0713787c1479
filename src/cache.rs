// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::font::Font;
use crate::grid::SYMBOL_COUNT;
use crate::palette::{terminal_color, trail_rgb, Rgb};
use crate::runtime::{ColorMode, TrailShading};

#[derive(Clone, Copy, Debug)]
pub struct Shade {
    pub head: Rgb,
    pub trail: Rgb,
    pub trail_len: u8,
    pub alpha_unit: u32,
    pub shading: TrailShading,
    pub color_mode: ColorMode,
    pub bg: Option<Color>,
}

impl Shade {
    /// Age 0 is the head; ages `1..=trail_len` walk down the trail ramp.
    pub fn rgb(&self, age: u8) -> Rgb {
        if age == 0 {
            self.head
        } else {
            trail_rgb(self.trail, self.alpha_unit, age, self.shading)
        }
    }
}

pub struct GlyphCache {
    ages: usize,
    cells: Vec<Cell>,
}

impl GlyphCache {
    pub fn build(font: &Font, shade: &Shade) -> Self {
        let ages = shade.trail_len as usize + 1;
        let mut cells = Vec::with_capacity(SYMBOL_COUNT as usize * ages);
        for symbol in 0..SYMBOL_COUNT {
            for age in 0..ages as u8 {
                let fg = terminal_color(shade.color_mode, shade.rgb(age));
                cells.push(font.render(symbol, fg, shade.bg, age == 0));
            }
        }
        tracing::debug!(
            entries = cells.len(),
            face = font.name(),
            size = font.size(),
            "glyph cache built"
        );
        Self { ages, cells }
    }

    /// `symbol < 26` and `age <= trail_len` hold by construction of the
    /// grid and the age mapping; anything else is a bug and panics.
    pub fn get(&self, symbol: u8, age: u8) -> &Cell {
        debug_assert!(symbol < SYMBOL_COUNT && (age as usize) < self.ages);
        &self.cells[symbol as usize * self.ages + age as usize]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}
