use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Opaque handle allocated by a [`TextureRegistry`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// CPU-side pixels for one atlas page: tightly packed RGBA8, premultiplied alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Returns `None` when `rgba` does not hold exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return None;
        }
        Some(Self { width, height, rgba })
    }

    /// Single-color image, handy for placeholder pages.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Option<Self> {
        let count = (width as usize) * (height as usize);
        Self::new(width, height, rgba.repeat(count))
    }
}

/// Maps a logical texture path to a handle. Called from the worker thread.
pub trait TextureResolver {
    fn resolve(&self, path: &str) -> Option<TextureId>;
}

struct Page {
    image: Arc<TextureImage>,
    /// Bumped every time the path is registered again.
    generation: u64,
}

#[derive(Default)]
struct Table {
    by_path: HashMap<String, TextureId>,
    pages: Vec<Page>,
}

/// Shared path -> texture table.
///
/// Cloning is cheap and clones share the table, so the worker and render threads can
/// each hold one. Registering a path twice replaces the pixels but keeps the handle;
/// the page's generation changes so GPU copies can tell they are stale.
#[derive(Clone, Default)]
pub struct TextureRegistry {
    inner: Arc<RwLock<Table>>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, path: impl Into<String>, image: TextureImage) -> TextureId {
        let path = path.into();
        let mut table = self.inner.write();

        if let Some(&id) = table.by_path.get(&path) {
            let page = &mut table.pages[id.0 as usize];
            page.image = Arc::new(image);
            page.generation += 1;
            log::debug!("texture `{path}` replaced ({id:?}, generation {})", page.generation);
            return id;
        }

        let id = TextureId(table.pages.len() as u32);
        table.pages.push(Page { image: Arc::new(image), generation: 0 });
        table.by_path.insert(path, id);
        id
    }

    pub fn image(&self, id: TextureId) -> Option<Arc<TextureImage>> {
        self.inner.read().pages.get(id.0 as usize).map(|p| p.image.clone())
    }

    pub fn generation(&self, id: TextureId) -> Option<u64> {
        self.inner.read().pages.get(id.0 as usize).map(|p| p.generation)
    }

    /// Pixels and generation read under one lock.
    pub fn versioned_image(&self, id: TextureId) -> Option<(Arc<TextureImage>, u64)> {
        self.inner
            .read()
            .pages
            .get(id.0 as usize)
            .map(|p| (p.image.clone(), p.generation))
    }

    pub fn len(&self) -> usize {
        self.inner.read().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TextureResolver for TextureRegistry {
    fn resolve(&self, path: &str) -> Option<TextureId> {
        self.inner.read().by_path.get(path).copied()
    }
}
