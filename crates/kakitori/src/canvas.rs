//! SVG page canvas with a bottom-left origin.
//!
//! The layout math follows print conventions: the origin is the bottom-left
//! page corner with y increasing upward. The canvas converts to SVG's
//! top-left/y-down space on emission, so callers never see the flip.
//!
//! Paint state (stroke color, line width) is a shared mutable resource, like
//! a PDF graphics state: whoever draws next inherits whatever was set last.

use std::fmt::Write as _;

use crate::scene::{Color, VectorAsset, fmt_num};

pub struct SvgCanvas {
    width: f64,
    height: f64,
    stroke: Color,
    line_width: f64,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            stroke: Color::BLACK,
            line_width: 1.0,
            body: String::new(),
        }
    }

    pub fn set_stroke_gray(&mut self, level: f64) {
        self.stroke = Color::gray(level);
    }

    pub fn set_stroke_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.stroke = Color::rgb(r, g, b);
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    /// Draws a segment between two page points using the current paint state.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let _ = writeln!(
            &mut self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_num(x1),
            fmt_num(self.height - y1),
            fmt_num(x2),
            fmt_num(self.height - y2),
            self.stroke.to_hex(),
            fmt_num(self.line_width),
        );
    }

    /// Composites a scaled asset with its bottom-left corner at `(x, y)`.
    pub fn place_asset(&mut self, asset: &VectorAsset, x: f64, y: f64, scale: f64) {
        let top = self.height - y - asset.height * scale;
        let _ = write!(
            &mut self.body,
            r#"<g transform="translate({} {}) scale({})">"#,
            fmt_num(x),
            fmt_num(top),
            fmt_num(scale),
        );
        asset.write_fragment(&mut self.body);
        self.body.push_str("</g>\n");
    }

    /// Finalizes the page into a standalone SVG document.
    ///
    /// User units are PDF points; the outer width/height are given in CSS
    /// pixels (96 per inch) so converters reproduce the physical page size.
    pub fn finish(self) -> String {
        let px_w = self.width * 96.0 / 72.0;
        let px_h = self.height * 96.0 / 72.0;
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = writeln!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            fmt_num(px_w),
            fmt_num(px_h),
            fmt_num(self.width),
            fmt_num(self.height),
        );
        let _ = writeln!(
            &mut out,
            r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
            fmt_num(self.width),
            fmt_num(self.height),
        );
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene;

    #[test]
    fn lines_are_flipped_into_svg_space() {
        let mut canvas = SvgCanvas::new(100.0, 200.0);
        canvas.line(10.0, 0.0, 10.0, 200.0);
        let svg = canvas.finish();
        // Page-bottom y=0 becomes SVG y=200, page-top y=200 becomes 0.
        assert!(svg.contains(r#"<line x1="10" y1="200" x2="10" y2="0""#));
    }

    #[test]
    fn paint_state_is_sticky() {
        let mut canvas = SvgCanvas::new(100.0, 100.0);
        canvas.set_stroke_gray(0.8);
        canvas.set_line_width(0.5);
        canvas.line(0.0, 0.0, 1.0, 1.0);
        canvas.line(2.0, 2.0, 3.0, 3.0);
        let svg = canvas.finish();
        assert_eq!(svg.matches(r##"stroke="#cccccc" stroke-width="0.5""##).count(), 2);
    }

    #[test]
    fn placed_assets_anchor_at_their_bottom_left() {
        let asset = scene::parse_svg(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 109 109"><path d="M0,0"/></svg>"#,
        )
        .unwrap();
        let mut canvas = SvgCanvas::new(500.0, 500.0);
        canvas.place_asset(&asset, 50.0, 100.0, 2.0);
        let svg = canvas.finish();
        // top = 500 - 100 - 109*2 = 182
        assert!(svg.contains(r#"transform="translate(50 182) scale(2)""#));
        assert!(svg.contains(r#"<path d="M0,0"/>"#));
    }

    #[test]
    fn finished_page_carries_physical_dimensions() {
        let svg = SvgCanvas::new(72.0, 144.0).finish();
        assert!(svg.contains(r#"width="96" height="192" viewBox="0 0 72 144""#));
        assert!(svg.contains(r##"fill="#ffffff""##));
    }
}
