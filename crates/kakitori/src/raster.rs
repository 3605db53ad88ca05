//! SVG-to-PDF/PNG conversion for finished worksheet pages.
//!
//! Pure-Rust conversion: `svg2pdf` for PDF, `usvg` + `resvg` + `tiny-skia`
//! for PNG. Only available with the `raster` cargo feature.

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

pub type Result<T> = std::result::Result<T, RasterError>;

/// Converts a worksheet SVG document into a single-page PDF.
///
/// Stroke-number annotations are plain `<text>` runs, so system fonts are
/// loaded for glyph shaping.
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RasterError::PdfConvert)
}

/// Rasterizes a worksheet SVG document to PNG at `scale` on white.
pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;
    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 75 75"><rect width="75" height="75" fill="#ffffff"/><line x1="0" y1="10" x2="75" y2="10" stroke="#000000" stroke-width="1"/></svg>"##;

    #[test]
    fn svg_to_pdf_produces_pdf_signature() {
        let bytes = svg_to_pdf(PAGE).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn svg_to_png_produces_png_signature() {
        let bytes = svg_to_png(PAGE, 1.0).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn malformed_svg_is_rejected() {
        assert!(matches!(svg_to_pdf("<svg"), Err(RasterError::SvgParse)));
        assert!(matches!(svg_to_png("<svg", 1.0), Err(RasterError::SvgParse)));
    }
}
