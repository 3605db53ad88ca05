//! Worksheet configuration.
//!
//! All lengths are in PDF points (1/72 inch) so the layout math matches the
//! physical page exactly. Values are read once at startup; nothing here is
//! mutated at runtime.

use std::path::PathBuf;

/// One millimetre in points.
pub const MM: f64 = 72.0 / 25.4;

/// A4 portrait, in points.
pub const A4_WIDTH: f64 = 210.0 * MM;
pub const A4_HEIGHT: f64 = 297.0 * MM;

pub const KANJIVG_BASE_URL: &str =
    "https://raw.githubusercontent.com/KanjiVG/kanjivg/refs/heads/master/kanji";
pub const KANJIVG_CACHE_DIR: &str = "kanjivg_cache";

#[derive(Debug, Clone)]
pub struct WorksheetConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,

    /// Side of a square practice (kanji) cell.
    pub kanji_cell_side: f64,
    /// Inset between a practice cell border and the glyph drawn inside it.
    pub kanji_border: f64,
    /// Width of the narrow annotation (furigana) cell attached to each column.
    pub furigana_cell_side: f64,
    /// Gap between a kanji cell and its furigana cell.
    pub kanji_furigana_gap: f64,
    /// Gap between adjacent column units.
    pub column_gap: f64,

    /// Side of a full-size reference cell in the header region.
    pub header_cell_side: f64,
    /// Vertical separator between the header region and the practice grid.
    pub header_grid_gap: f64,

    pub guideline_gray: f64,
    pub guideline_width: f64,
    pub grid_gray: f64,
    pub grid_line_width: f64,
    pub furigana_gray: f64,

    /// Blend factor toward white for traced practice glyphs, in `[0, 1]`.
    pub tracing_strength: f64,
    /// Every `tracing_freq`-th visited practice cell receives a traced glyph.
    pub tracing_freq: usize,

    pub base_url: String,
    pub cache_dir: PathBuf,
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin_left: 12.0 * MM,
            margin_right: 12.0 * MM,
            margin_top: 12.0 * MM,
            margin_bottom: 12.0 * MM,
            kanji_cell_side: 13.0 * MM,
            kanji_border: 1.0 * MM,
            furigana_cell_side: 4.0 * MM,
            kanji_furigana_gap: 0.8 * MM,
            column_gap: 1.5 * MM,
            header_cell_side: 25.0 * MM,
            header_grid_gap: 6.0 * MM,
            guideline_gray: 0.8,
            guideline_width: 0.5,
            grid_gray: 0.0,
            grid_line_width: 1.0,
            furigana_gray: 0.7,
            tracing_strength: 0.75,
            tracing_freq: 4,
            base_url: KANJIVG_BASE_URL.to_string(),
            cache_dir: PathBuf::from(KANJIVG_CACHE_DIR),
        }
    }
}

impl WorksheetConfig {
    /// Printable width between the left and right margins.
    pub fn printable_width(&self) -> f64 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Width of one practice column unit: kanji cell, gap, furigana cell.
    pub fn column_unit(&self) -> f64 {
        self.kanji_cell_side + self.kanji_furigana_gap + self.furigana_cell_side
    }
}
