#![forbid(unsafe_code)]

//! `kakitori` generates printable kanji practice worksheets.
//!
//! A page is a header region of full-size, stroke-order-annotated reference
//! glyphs, followed by a grid of square practice cells (each with a narrow
//! furigana annotation cell) into which faded "trace-over" copies of the
//! characters are distributed periodically. Stroke diagrams come from the
//! KanjiVG project and are cached on disk per character.
//!
//! # Features
//!
//! - `raster`: PDF/PNG output via pure-Rust SVG conversion ([`raster`])

pub mod assets;
pub mod canvas;
pub mod config;
pub mod layout;
#[cfg(feature = "raster")]
pub mod raster;
pub mod render;
pub mod scene;
pub mod worksheet;

use std::path::PathBuf;

pub use crate::assets::{AssetCache, AssetStore, Fetch, HttpFetcher};
pub use crate::config::WorksheetConfig;
pub use crate::scene::VectorAsset;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no stroke diagram exists for '{character}' (codepoint U+{codepoint})")]
    AssetNotFound { character: char, codepoint: String },

    #[error("failed to fetch stroke diagram for codepoint U+{codepoint}: {message}")]
    Transport { codepoint: String, message: String },

    #[error("corrupt cached asset {path}: {message} (delete the file to re-fetch)")]
    CorruptAsset { path: PathBuf, message: String },

    #[error("page too small for {region}: needs {needed:.1}pt, has {available:.1}pt")]
    LayoutTooSmall {
        region: &'static str,
        needed: f64,
        available: f64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Renders one worksheet page for `characters`, fetching stroke diagrams
/// from the configured KanjiVG endpoint through the on-disk cache.
///
/// Returns the page as an SVG document; convert with [`raster`] as needed.
pub fn render_worksheet_svg(characters: &[char], config: &WorksheetConfig) -> Result<String> {
    let store = AssetStore::new(&config.cache_dir);
    let fetcher = HttpFetcher::new(&config.base_url);
    let cache = AssetCache::new(store, fetcher);
    worksheet::render_worksheet(characters, config, &cache)
}
