// Copyright (c) 2026 rezky_nightky

use rand::distr::{Distribution, Uniform};
use rand::Rng;

use crate::column::ColumnSpeeds;

pub const SYMBOL_COUNT: u8 = 26;

pub const HEAD: i16 = -1;

pub const BLANK: i16 = 0;

/// Both buffers are column-major: cell `(col, row)` lives at `col * rows + row`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cols: u16,
    rows: u16,
    trail_depth: Vec<i16>,
    glyph: Vec<u8>,
}

fn symbol_dist() -> Uniform<u8> {
    Uniform::new(0, SYMBOL_COUNT).expect("valid range")
}

impl Grid {
    pub fn new<R: Rng + ?Sized>(cols: u16, rows: u16, rng: &mut R) -> Self {
        let area = cols as usize * rows as usize;
        let dist = symbol_dist();
        Self {
            cols,
            rows,
            trail_depth: vec![BLANK; area],
            glyph: (0..area).map(|_| dist.sample(rng)).collect(),
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn area(&self) -> usize {
        self.trail_depth.len()
    }

    fn index(&self, col: u16, row: u16) -> usize {
        col as usize * self.rows as usize + row as usize
    }

    pub fn depth(&self, col: u16, row: u16) -> i16 {
        self.trail_depth[self.index(col, row)]
    }

    pub fn glyph(&self, col: u16, row: u16) -> u8 {
        self.glyph[self.index(col, row)]
    }

    #[cfg(test)]
    pub fn column_depths(&self, col: u16) -> &[i16] {
        let start = self.index(col, 0);
        &self.trail_depth[start..start + self.rows as usize]
    }

    #[cfg(test)]
    pub fn column_glyphs(&self, col: u16) -> &[u8] {
        let start = self.index(col, 0);
        &self.glyph[start..start + self.rows as usize]
    }

    pub fn mark_heads<R: Rng + ?Sized>(&mut self, min: u8, max: u8, rng: &mut R) -> Vec<u8> {
        // Heads sit rows / n apart from row n; they only overlap when n > rows.
        let dist = Uniform::new(min, max).expect("drop range validated by Settings");
        let rows = self.rows as usize;
        let mut drawn = Vec::with_capacity(self.cols as usize);

        for col in 0..self.cols {
            let n = dist.sample(rng);
            drawn.push(n);
            if rows == 0 {
                continue;
            }
            let k = rows / n as usize;
            let base = self.index(col, 0);
            for j in 0..n as usize {
                let row = (n as usize + j * k) % rows;
                self.trail_depth[base + row] = HEAD;
            }
        }

        drawn
    }

    /// Heads found while walking end the trail and are never painted over;
    /// later trails may repaint earlier trail cells.
    pub fn mark_tails(&mut self, trail_len: u8) {
        let rows = self.rows as isize;
        let len = trail_len as isize;

        for col in 0..self.cols {
            let base = self.index(col, 0);
            for row in 0..rows {
                if self.trail_depth[base + row as usize] != HEAD {
                    continue;
                }
                for w in 0..len {
                    let target = base + (row - w - 1).rem_euclid(rows) as usize;
                    if self.trail_depth[target] == HEAD {
                        break;
                    }
                    self.trail_depth[target] = (len - w - 1) as i16;
                }
            }
        }
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, speeds: &ColumnSpeeds, frame: u64, rng: &mut R) {
        let rows = self.rows as usize;
        if rows == 0 {
            return;
        }
        let dist = symbol_dist();

        for col in 0..self.cols {
            if !speeds.is_due(col, frame) {
                continue;
            }
            let base = self.index(col, 0);
            // Head check sees the cell as already shifted by earlier rows.
            let mut carry = self.trail_depth[base];
            for j in 0..rows {
                if self.trail_depth[base + j] == HEAD {
                    self.glyph[base + j] = dist.sample(rng);
                }
                let next = base + (j + 1) % rows;
                carry = std::mem::replace(&mut self.trail_depth[next], carry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn painted(cols: u16, rows: u16, min: u8, max: u8, len: u8, seed: u64) -> (Grid, Vec<u8>) {
        let mut rng = seeded(seed);
        let mut g = Grid::new(cols, rows, &mut rng);
        let drawn = g.mark_heads(min, max, &mut rng);
        g.mark_tails(len);
        (g, drawn)
    }

    fn heads_in(g: &Grid, col: u16) -> usize {
        g.column_depths(col).iter().filter(|&&d| d == HEAD).count()
    }

    #[test]
    fn new_grid_is_blank_with_valid_glyphs() {
        let mut rng = seeded(3);
        let g = Grid::new(4, 5, &mut rng);
        assert_eq!(g.area(), 20);
        for col in 0..4 {
            assert!(g.column_depths(col).iter().all(|&d| d == BLANK));
            assert!(g.column_glyphs(col).iter().all(|&s| s < SYMBOL_COUNT));
        }
    }

    #[test]
    fn heads_are_evenly_spaced_and_offset() {
        let mut rng = seeded(0);
        let mut g = Grid::new(1, 60, &mut rng);
        let drawn = g.mark_heads(4, 5, &mut rng);
        assert_eq!(drawn, vec![4]);
        let rows: Vec<usize> = g
            .column_depths(0)
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == HEAD)
            .map(|(r, _)| r)
            .collect();
        assert_eq!(rows, vec![4, 19, 34, 49]);
    }

    #[test]
    fn colliding_heads_overlap() {
        let mut rng = seeded(0);
        let mut g = Grid::new(1, 3, &mut rng);
        let drawn = g.mark_heads(4, 5, &mut rng);
        assert_eq!(drawn, vec![4]);
        // k = 0, so every head lands on row 4 % 3.
        assert_eq!(g.column_depths(0), &[BLANK, HEAD, BLANK]);
    }

    #[test]
    fn tail_counts_down_behind_head() {
        let mut rng = seeded(0);
        let mut g = Grid::new(1, 10, &mut rng);
        g.mark_heads(1, 2, &mut rng);
        g.mark_tails(4);
        // Single head at row 1; trail wraps past row 0.
        assert_eq!(g.column_depths(0), &[3, HEAD, 0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn tail_stops_at_previous_head() {
        let mut rng = seeded(0);
        let mut g = Grid::new(1, 12, &mut rng);
        g.mark_heads(2, 3, &mut rng);
        g.mark_tails(20);
        // Heads at rows 2 and 8, each trail runs into the other head.
        let d = g.column_depths(0);
        assert_eq!(d[2], HEAD);
        assert_eq!(d[8], HEAD);
        assert_eq!(&d[3..8], &[15, 16, 17, 18, 19]);
        assert_eq!(&d[0..2], &[18, 19]);
        assert_eq!(&d[9..12], &[15, 16, 17]);
    }

    #[test]
    fn empty_rows_still_draw_counts() {
        let mut rng = seeded(0);
        let mut g = Grid::new(3, 0, &mut rng);
        let drawn = g.mark_heads(3, 5, &mut rng);
        assert_eq!(drawn.len(), 3);
        g.mark_tails(20);
        g.advance(&ColumnSpeeds::from_vec(vec![1, 1, 1]), 0, &mut rng);
        assert_eq!(g.area(), 0);
    }

    #[test]
    fn idle_column_is_untouched() {
        let (mut g, _) = painted(2, 30, 3, 5, 20, 11);
        let before = g.clone();
        let speeds = ColumnSpeeds::from_vec(vec![2, 3]);
        let mut rng = seeded(99);
        g.advance(&speeds, 1, &mut rng);
        assert_eq!(g, before);
    }

    #[test]
    fn due_column_rotates_down_by_one() {
        let (mut g, _) = painted(2, 30, 3, 5, 20, 5);
        let before = g.clone();
        let speeds = ColumnSpeeds::from_vec(vec![1, 4]);
        let mut rng = seeded(8);
        g.advance(&speeds, 2, &mut rng);

        let old = before.column_depths(0);
        let new = g.column_depths(0);
        for row in 0..30 {
            assert_eq!(new[(row + 1) % 30], old[row]);
        }
        assert_eq!(g.column_depths(1), before.column_depths(1));
        assert_eq!(g.column_glyphs(1), before.column_glyphs(1));
    }

    #[test]
    fn only_head_glyphs_change() {
        let (mut g, _) = painted(3, 40, 3, 5, 20, 21);
        let before = g.clone();
        let speeds = ColumnSpeeds::from_vec(vec![1, 1, 1]);
        let mut rng = seeded(4);
        g.advance(&speeds, 0, &mut rng);

        for col in 0..3 {
            let old_depths = before.column_depths(col);
            let new_depths = g.column_depths(col);
            let old = before.column_glyphs(col);
            let new = g.column_glyphs(col);
            for row in 0..40 {
                if old_depths[row] != HEAD && new_depths[row] != HEAD {
                    assert_eq!(new[row], old[row], "col {col} row {row}");
                }
            }
        }
    }

    #[test]
    fn heads_flicker_over_many_steps() {
        let (mut g, _) = painted(1, 20, 1, 2, 5, 2);
        let speeds = ColumnSpeeds::from_vec(vec![1]);
        let mut rng = seeded(6);
        let mut head_glyphs = Vec::new();
        for frame in 0..40 {
            g.advance(&speeds, frame, &mut rng);
            let row = g.column_depths(0).iter().position(|&d| d == HEAD).unwrap();
            head_glyphs.push(g.glyph(0, row as u16));
        }
        head_glyphs.sort_unstable();
        head_glyphs.dedup();
        assert!(head_glyphs.len() > 1);
    }

    fn sorted(v: &[i16]) -> Vec<i16> {
        let mut v = v.to_vec();
        v.sort_unstable();
        v
    }

    proptest! {
        #[test]
        fn trails_strictly_decrease_behind_heads(
            rows in 1u16..80,
            min in 1u8..6,
            extra in 1u8..4,
            len in 1u8..40,
            seed in any::<u64>(),
        ) {
            let (g, drawn) = painted(3, rows, min, min + extra, len, seed);
            for col in 0..3 {
                prop_assert!((min..min + extra).contains(&drawn[col as usize]));
                let d = g.column_depths(col);
                let heads = heads_in(&g, col);
                prop_assert!(heads >= 1);
                prop_assert!(heads <= drawn[col as usize] as usize);

                for head in 0..rows as isize {
                    if d[head as usize] != HEAD {
                        continue;
                    }
                    for w in 0..len as isize {
                        let r = (head - w - 1).rem_euclid(rows as isize) as usize;
                        if d[r] == HEAD {
                            break;
                        }
                        prop_assert_eq!(d[r], len as i16 - 1 - w as i16);
                    }
                }
            }
        }

        #[test]
        fn spaced_heads_match_drawn_counts(
            min in 1u8..5,
            extra in 1u8..3,
            seed in any::<u64>(),
        ) {
            // With n * n <= rows every head lands on its own row.
            let (g, drawn) = painted(6, 64, min, min + extra, 20, seed);
            for col in 0..6 {
                prop_assert_eq!(heads_in(&g, col), drawn[col as usize] as usize);
            }
        }

        #[test]
        fn advance_is_a_rotation(
            rows in 1u16..60,
            speed in 1u16..6,
            frame in 0u64..1000,
            seed in any::<u64>(),
        ) {
            let (mut g, _) = painted(1, rows, 1, 4, 20, seed);
            let before = g.clone();
            let mut rng = seeded(seed ^ 0x5a5a);
            g.advance(&ColumnSpeeds::from_vec(vec![speed]), frame, &mut rng);

            let old = before.column_depths(0);
            let new = g.column_depths(0);
            prop_assert_eq!(sorted(old), sorted(new));
            if frame % u64::from(speed) == 0 {
                for r in 0..rows as usize {
                    prop_assert_eq!(new[(r + 1) % rows as usize], old[r]);
                }
            } else {
                prop_assert_eq!(&g, &before);
            }
        }
    }
}
