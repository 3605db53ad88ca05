//! Composites cached stroke diagrams onto the page canvas.

use crate::assets::{AssetCache, Fetch};
use crate::canvas::SvgCanvas;
use crate::Result;

pub struct CharacterRenderer<'a, F: Fetch> {
    cache: &'a AssetCache<F>,
}

impl<'a, F: Fetch> CharacterRenderer<'a, F> {
    pub fn new(cache: &'a AssetCache<F>) -> Self {
        Self { cache }
    }

    /// Draws `character` with its bottom-left corner at `(x, y)`, scaled so
    /// the diagram's natural height maps to `size`.
    ///
    /// A diagram without a positive natural height is composited unscaled
    /// rather than rejected; malformed assets degrade, they do not abort.
    /// The canvas paint state is not saved or restored around the call.
    pub fn draw(
        &self,
        canvas: &mut SvgCanvas,
        character: char,
        x: f64,
        y: f64,
        size: f64,
        show_annotations: bool,
        strength: Option<f64>,
    ) -> Result<()> {
        let asset = self.cache.resolve(character, show_annotations)?;
        let asset = match strength {
            Some(s) => asset.faded(s),
            None => asset,
        };
        let scale = if asset.height > 0.0 {
            size / asset.height
        } else {
            1.0
        };
        canvas.place_asset(&asset, x, y, scale);
        Ok(())
    }
}
