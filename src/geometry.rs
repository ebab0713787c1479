// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub cols: u16,
    pub rows: u16,
    pub area: usize,
    pub cell_width: u32,
    pub cell_height: u32,
    pub alpha_unit: u32,
}

impl Geometry {
    /// A partial trailing column or row still gets a full cell.
    pub fn resolve(width: u32, height: u32, unit: u16, trail_len: u8) -> Self {
        let unit = u32::from(unit.max(1));
        let cols = width.div_ceil(unit).min(u32::from(u16::MAX)) as u16;
        let rows = height.div_ceil(unit).min(u32::from(u16::MAX)) as u16;
        Self {
            width,
            height,
            cols,
            rows,
            area: cols as usize * rows as usize,
            cell_width: unit,
            cell_height: unit,
            alpha_unit: 255 / u32::from(trail_len.max(1)),
        }
    }
}
