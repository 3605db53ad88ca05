//! Worksheet layout engine.
//!
//! Single pass over one page: header region of full-size annotated reference
//! glyphs, then the practice grid of kanji cells with attached furigana
//! cells, guideline crosses, borders, and periodically traced faded glyphs.

use tracing::{debug, info};

use crate::assets::{AssetCache, Fetch};
use crate::canvas::SvgCanvas;
use crate::config::WorksheetConfig;
use crate::layout::{divisions, header_grid, trace_assignments};
use crate::render::CharacterRenderer;
use crate::{Error, Result};

/// Renders one worksheet page for `characters` and returns the SVG document.
///
/// Any asset resolution failure aborts the whole page; a failed call has
/// produced no usable output.
pub fn render_worksheet<F: Fetch>(
    characters: &[char],
    config: &WorksheetConfig,
    cache: &AssetCache<F>,
) -> Result<String> {
    info!(count = characters.len(), "rendering worksheet");
    let mut canvas = SvgCanvas::new(config.page_width, config.page_height);
    let renderer = CharacterRenderer::new(cache);

    let printable_w = config.printable_width();
    let top = config.page_height - config.margin_top;

    // Header: balanced rows of full-size annotated glyphs, centered as a block.
    let header = header_grid(characters.len(), printable_w, config.header_cell_side)?;
    let side = config.header_cell_side;
    let block_w = header.cols as f64 * side;
    let header_x0 = config.margin_left + (printable_w - block_w) / 2.0;
    for (i, &ch) in characters.iter().enumerate() {
        let (row, col) = header.position(i);
        let x = header_x0 + col as f64 * side;
        let y = top - (row as f64 + 1.0) * side;
        renderer.draw(&mut canvas, ch, x, y, side, true, None)?;
    }
    let header_h = header.rows as f64 * side;

    // Practice grid region below the header.
    let grid_top = top - header_h - config.header_grid_gap;
    let grid_h_avail = grid_top - config.margin_bottom;
    let cell = config.kanji_cell_side;
    let cols = divisions(printable_w, config.column_unit(), config.column_gap);
    let rows = divisions(grid_h_avail, cell, 0.0);
    if cols == 0 {
        return Err(Error::LayoutTooSmall {
            region: "practice grid columns",
            needed: config.column_unit(),
            available: printable_w,
        });
    }
    if rows == 0 {
        return Err(Error::LayoutTooSmall {
            region: "practice grid rows",
            needed: cell,
            available: grid_h_avail,
        });
    }
    debug!(cols, rows, header_rows = header.rows, "worksheet geometry");

    let pitch = config.column_unit() + config.column_gap;
    let x0 = config.margin_left;
    let grid_bottom = grid_top - rows as f64 * cell;

    // Guideline crosses first, so the borders paint over them.
    canvas.set_stroke_gray(config.guideline_gray);
    canvas.set_line_width(config.guideline_width);
    for col in 0..cols {
        let x = x0 + col as f64 * pitch;
        for row in 0..rows {
            let cell_top = grid_top - row as f64 * cell;
            let cx = x + cell / 2.0;
            let cy = cell_top - cell / 2.0;
            canvas.line(cx, cell_top, cx, cell_top - cell);
            canvas.line(x, cy, x + cell, cy);
        }
    }

    // Column borders: kanji edges full strength, furigana edges lighter.
    for col in 0..cols {
        let x = x0 + col as f64 * pitch;
        canvas.set_stroke_gray(config.grid_gray);
        canvas.set_line_width(config.grid_line_width);
        canvas.line(x, grid_top, x, grid_bottom);
        canvas.line(x + cell, grid_top, x + cell, grid_bottom);

        let fx = x + cell + config.kanji_furigana_gap;
        canvas.set_stroke_gray(config.furigana_gray);
        canvas.line(fx, grid_top, fx, grid_bottom);
        let fx = fx + config.furigana_cell_side;
        canvas.line(fx, grid_top, fx, grid_bottom);
    }

    // Row boundaries across every kanji and furigana sub-cell.
    for row in 0..=rows {
        let y = grid_top - row as f64 * cell;
        for col in 0..cols {
            let x = x0 + col as f64 * pitch;
            canvas.set_stroke_gray(config.grid_gray);
            canvas.set_line_width(config.grid_line_width);
            canvas.line(x, y, x + cell, y);

            let fx = x + cell + config.kanji_furigana_gap;
            canvas.set_stroke_gray(config.furigana_gray);
            canvas.line(fx, y, fx + config.furigana_cell_side, y);
        }
    }

    // Traced glyphs: rightmost column first (vertical-script reading order),
    // top to bottom within a column.
    let assignments = trace_assignments(cols * rows, config.tracing_freq, characters.len());
    let inset = config.kanji_border;
    let glyph_size = cell - 2.0 * inset;
    let mut visited = 0usize;
    for col in (0..cols).rev() {
        let x = x0 + col as f64 * pitch + inset;
        for row in 0..rows {
            if let Some(idx) = assignments[visited] {
                let y = grid_top - (row as f64 + 1.0) * cell + inset;
                renderer.draw(
                    &mut canvas,
                    characters[idx],
                    x,
                    y,
                    glyph_size,
                    false,
                    Some(config.tracing_strength),
                )?;
            }
            visited += 1;
        }
    }

    Ok(canvas.finish())
}
