//! Obstacle layouts
//!
//! Builds ready-to-install obstacle sets for a given world size. Layouts are
//! pure functions of their inputs, so a resize just rebuilds them.

use glam::Vec2;

use super::bounds::Bounds;
use super::state::Obstacle;
use crate::error::{Result, SimError};

/// Fraction of the height where the peg field starts and ends
const FIELD_TOP: f32 = 0.3;
const FIELD_BOTTOM: f32 = 0.75;

/// Galton-board style pegs: `rows` rows of `cols` pegs, odd rows shifted by
/// half a column.
///
/// The field fills the middle band of the world. Fails if pegs would touch.
pub fn peg_field(bounds: &Bounds, rows: usize, cols: usize, radius: f32) -> Result<Vec<Obstacle>> {
    if rows == 0 || cols == 0 {
        return Ok(Vec::new());
    }

    let spacing_x = bounds.width / (cols + 1) as f32;
    let band = bounds.height * (FIELD_BOTTOM - FIELD_TOP);
    let spacing_y = if rows > 1 {
        band / (rows - 1) as f32
    } else {
        band
    };
    if radius * 2.0 >= spacing_x.min(spacing_y) {
        return Err(SimError::InvalidConfig(format!(
            "{rows}x{cols} pegs of radius {radius} do not fit in {}x{}",
            bounds.width, bounds.height
        )));
    }

    let mut pegs = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let y = bounds.height * FIELD_TOP + row as f32 * spacing_y;
        let shift = if row % 2 == 1 { spacing_x * 0.5 } else { 0.0 };
        for col in 0..cols {
            let x = spacing_x * (col + 1) as f32 + shift;
            // Shifted rows lose their last peg to the right wall
            if x + radius > bounds.width {
                continue;
            }
            pegs.push(Obstacle::new(Vec2::new(x, y), radius)?);
        }
    }

    log::debug!("Peg field: {} pegs", pegs.len());
    Ok(pegs)
}

/// Half-buried bumpers centred on the side walls, `per_side` on each,
/// evenly spaced top to bottom.
pub fn side_bumpers(bounds: &Bounds, per_side: usize, radius: f32) -> Result<Vec<Obstacle>> {
    let spacing = bounds.height / (per_side + 1) as f32;
    let mut bumpers = Vec::with_capacity(per_side * 2);
    for i in 1..=per_side {
        let y = spacing * i as f32;
        bumpers.push(Obstacle::new(Vec2::new(0.0, y), radius)?);
        bumpers.push(Obstacle::new(Vec2::new(bounds.width, y), radius)?);
    }
    Ok(bumpers)
}
