// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, SeedableRng};

use crate::column::ColumnSpeeds;
use crate::geometry::Geometry;
use crate::grid::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RainParams {
    pub trail_len: u8,
    pub min_drops: u8,
    pub max_drops: u8,
    pub min_speed: u16,
    pub max_speed: u16,
}

pub struct Rain {
    pub grid: Grid,
    pub speeds: ColumnSpeeds,
    pub trail_len: u8,
    drops: Vec<u8>,
    frame: u64,
    mt: StdRng,
}

impl Rain {
    pub fn new(geometry: &Geometry, params: RainParams, seed: Option<u64>) -> Self {
        let mut mt = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        let mut grid = Grid::new(geometry.cols, geometry.rows, &mut mt);
        let speeds = ColumnSpeeds::random(
            geometry.cols,
            params.min_speed,
            params.max_speed,
            &mut mt,
        );
        let drops = grid.mark_heads(params.min_drops, params.max_drops, &mut mt);
        grid.mark_tails(params.trail_len);

        tracing::debug!(
            cols = geometry.cols,
            rows = geometry.rows,
            area = grid.area(),
            slowest = speeds.max(),
            "rain initialized"
        );

        Self {
            grid,
            speeds,
            trail_len: params.trail_len,
            drops,
            frame: 0,
            mt,
        }
    }

    /// Drops drawn per column at startup (before collisions).
    pub fn drops(&self) -> &[u8] {
        &self.drops
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn step(&mut self) {
        self.grid.advance(&self.speeds, self.frame, &mut self.mt);
        self.frame = self.frame.wrapping_add(1);
    }
}
