//! On-disk cache of KanjiVG stroke diagrams.
//!
//! The cache is a content-addressed store keyed by codepoint and variant:
//! one raw (annotated) file per character as fetched, plus a lazily derived
//! file with the stroke-number annotations stripped. A file's presence means
//! "fetched/derived successfully"; concurrent writers racing on the same
//! entry produce identical content, so the store needs no locking.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::scene::{self, VectorAsset};
use crate::{Error, Result};

/// Stable cache/fetch key: zero-padded 5-digit lowercase hex codepoint.
pub fn codepoint_key(character: char) -> String {
    format!("{:05x}", character as u32)
}

/// Cache variant of a stroke diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// The raw fetched form, stroke-order numbers included.
    Annotated,
    /// Derived form with every annotation text node removed.
    Plain,
}

/// Retrieves the SVG text for a codepoint from the asset source.
///
/// Implementations must not retry; retry policy belongs to the caller.
pub trait Fetch {
    fn fetch(&self, character: char, codepoint: &str) -> Result<String>;
}

/// Blocking fetcher against the KanjiVG raw-file endpoint.
pub struct HttpFetcher {
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, character: char, codepoint: &str) -> Result<String> {
        let url = format!("{}/{}.svg", self.base_url, codepoint);
        debug!(%url, %character, "fetching stroke diagram");
        match ureq::get(&url).call() {
            Ok(response) => response.into_body().read_to_string().map_err(|e| {
                Error::Transport {
                    codepoint: codepoint.to_string(),
                    message: e.to_string(),
                }
            }),
            Err(ureq::Error::StatusCode(404 | 410)) => Err(Error::AssetNotFound {
                character,
                codepoint: codepoint.to_string(),
            }),
            Err(e) => Err(Error::Transport {
                codepoint: codepoint.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Filesystem store with explicit `has`/`get`/`put` over `(key, variant)`.
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, key: &str, variant: Variant) -> PathBuf {
        match variant {
            Variant::Annotated => self.dir.join(format!("{key}.svg")),
            Variant::Plain => self.dir.join(format!("{key}_unnumbered.svg")),
        }
    }

    pub fn has(&self, key: &str, variant: Variant) -> bool {
        self.path(key, variant).exists()
    }

    pub fn get(&self, key: &str, variant: Variant) -> Result<String> {
        Ok(fs::read_to_string(self.path(key, variant))?)
    }

    /// Persists an entry, creating the cache directory on first use.
    pub fn put(&self, key: &str, variant: Variant, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key, variant), contents)?;
        Ok(())
    }
}

/// Resolves characters to parsed stroke diagrams, fetching and deriving at
/// most once per character.
pub struct AssetCache<F: Fetch> {
    store: AssetStore,
    fetcher: F,
}

impl<F: Fetch> AssetCache<F> {
    pub fn new(store: AssetStore, fetcher: F) -> Self {
        Self { store, fetcher }
    }

    /// Returns the parsed scene graph for `character`.
    ///
    /// - Fetches and persists the raw diagram if it is not cached yet.
    /// - With `want_annotations == false`, derives and persists the stripped
    ///   variant the first time it is requested.
    /// - A cached file that fails to parse is a fatal [`Error::CorruptAsset`];
    ///   the cache does not self-heal, the operator must delete the file.
    pub fn resolve(&self, character: char, want_annotations: bool) -> Result<VectorAsset> {
        let key = codepoint_key(character);

        if !self.store.has(&key, Variant::Annotated) {
            let body = self.fetcher.fetch(character, &key)?;
            self.store.put(&key, Variant::Annotated, &body)?;
            debug!(%key, "cached raw stroke diagram");
        }

        let variant = if want_annotations {
            Variant::Annotated
        } else {
            Variant::Plain
        };

        if variant == Variant::Plain && !self.store.has(&key, Variant::Plain) {
            let raw = self.store.get(&key, Variant::Annotated)?;
            let mut asset = self.parse(&raw, &self.store.path(&key, Variant::Annotated))?;
            asset.strip_text();
            self.store.put(&key, Variant::Plain, &asset.to_svg())?;
            debug!(%key, "derived annotation-stripped variant");
        }

        let text = self.store.get(&key, variant)?;
        self.parse(&text, &self.store.path(&key, variant))
    }

    fn parse(&self, text: &str, path: &Path) -> Result<VectorAsset> {
        scene::parse_svg(text).map_err(|message| Error::CorruptAsset {
            path: path.to_path_buf(),
            message,
        })
    }
}
