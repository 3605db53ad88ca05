//! Pure grid arithmetic for the worksheet page.
//!
//! Everything here is integer math over measured extents, independent of any
//! canvas, so the remainder and too-small edge cases are unit-testable on
//! their own.

use crate::{Error, Result};

/// Number of whole `cell`-sized units (separated by `gap`) that fit into
/// `available`.
///
/// Always floors, never rounds, so drawn cells can never exceed the physical
/// extent. Zero means the region cannot hold even one unit.
pub fn divisions(available: f64, cell: f64, gap: f64) -> usize {
    let pitch = cell + gap;
    if !(pitch > 0.0) || !available.is_finite() {
        return 0;
    }
    let n = ((available + gap) / pitch).floor();
    if n.is_sign_negative() || !n.is_finite() {
        0
    } else {
        n as usize
    }
}

/// Balanced header grid for the full-size reference glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderGrid {
    pub rows: usize,
    pub cols: usize,
}

impl HeaderGrid {
    /// Row-major position of character `index`.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

/// Computes the header grid for `count` characters over `available_width`.
///
/// First pass takes as many columns as fit; the second pass redistributes the
/// columns so the last row is not left ragged (10 characters at a naive 6
/// columns become two balanced rows of 5). Required, not cosmetic: the header
/// block is centered, so an uneven last row reads as a layout bug.
pub fn header_grid(count: usize, available_width: f64, cell_side: f64) -> Result<HeaderGrid> {
    let cols = divisions(available_width, cell_side, 0.0);
    if cols == 0 {
        return Err(Error::LayoutTooSmall {
            region: "header",
            needed: cell_side,
            available: available_width,
        });
    }
    if count == 0 {
        return Ok(HeaderGrid { rows: 0, cols: 0 });
    }
    let rows = count.div_ceil(cols);
    let cols = count.div_ceil(rows);
    Ok(HeaderGrid { rows, cols })
}

/// Maps every visited practice cell to an index into the character list.
///
/// Cells are counted in traversal order; only every `freq`-th cell (0-based)
/// is eligible for a traced glyph. Each character claims
/// `total_cells / (freq * char_count)` consecutive eligible cells. Eligible
/// cells left over once every character has its quota stay blank; that
/// matches the shipped distribution behavior and is deliberate.
pub fn trace_assignments(
    total_cells: usize,
    freq: usize,
    char_count: usize,
) -> Vec<Option<usize>> {
    let mut out = vec![None; total_cells];
    if freq == 0 || char_count == 0 {
        return out;
    }
    let cells_per_char = total_cells / (freq * char_count);
    if cells_per_char == 0 {
        return out;
    }
    for cell in (0..total_cells).step_by(freq) {
        let eligible_index = cell / freq;
        let char_index = eligible_index / cells_per_char;
        if char_index < char_count {
            out[cell] = Some(char_index);
        }
    }
    out
}
