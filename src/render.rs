// Copyright (c) 2026 rezky_nightky

use std::io;

use crate::cache::GlyphCache;
use crate::frame::{Frame, Rect};
use crate::geometry::Geometry;
use crate::grid::{Grid, BLANK, HEAD};
use crate::rain::Rain;
use crate::terminal::Screen;

/// Cache age for a trail depth: heads are age 0, a trail value `v` is age
/// `trail_len - v + 1`, blank cells are not drawn.
pub fn age_for_depth(depth: i16, trail_len: u8) -> Option<u8> {
    match depth {
        BLANK => None,
        HEAD => Some(0),
        v => Some((i16::from(trail_len) - v + 1) as u8),
    }
}

pub fn draw_grid(
    grid: &Grid,
    cache: &GlyphCache,
    geometry: &Geometry,
    trail_len: u8,
    frame: &mut Frame,
) {
    frame.clear();
    for col in 0..grid.cols() {
        for row in 0..grid.rows() {
            let Some(age) = age_for_depth(grid.depth(col, row), trail_len) else {
                continue;
            };
            let cell = cache.get(grid.glyph(col, row), age);
            frame.blit(
                cell,
                Rect {
                    x: u32::from(col) * geometry.cell_width,
                    y: u32::from(row) * geometry.cell_height,
                    w: geometry.cell_width,
                    h: geometry.cell_height,
                },
            );
        }
    }
}

pub fn render_frame<S: Screen>(
    screen: &mut S,
    rain: &mut Rain,
    cache: &GlyphCache,
    geometry: &Geometry,
    frame: &mut Frame,
) -> io::Result<()> {
    draw_grid(&rain.grid, cache, geometry, rain.trail_len, frame);
    screen.present(frame)?;
    rain.step();
    Ok(())
}
