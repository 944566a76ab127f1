//! Font registry plus cached layout
//!
//! [`TextSystem`] is the entry point the engine and the text input layer use.
//! Every query, whether metrics, caret or hit test, goes through the same cached
//! [`TextLayout`] that rendering uses.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use rustc_hash::{FxBuildHasher, FxHasher};
use tracing::debug;

use crate::font::{FontLoader, OpenTypeLoader, ShapeFont};
use crate::layout::{
    layout_text, normalize_wrap, snap_to_boundary, Caret, Size, TextLayout, TextMetrics,
};
use crate::registry::{FontId, FontRegistry};
use crate::Result;

/// Default number of cached layouts
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Layout parameters; the text itself is compared against the cached layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LayoutParams {
    font: FontId,
    size_bits: u32,
    wrap_bits: Option<u32>,
}

impl LayoutParams {
    fn hash_with(&self, text: &str) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        text.hash(&mut hasher);
        hasher.finish()
    }
}

struct CachedLayout {
    params: LayoutParams,
    layout: Arc<TextLayout>,
}

/// Layout cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

pub struct TextSystem {
    registry: FontRegistry,
    loader: Box<dyn FontLoader>,
    // Keyed by a hash of params and text so lookups never copy the text
    cache: LruCache<u64, CachedLayout, FxBuildHasher>,
    default_font: Option<FontId>,
    hits: u64,
    misses: u64,
}

impl TextSystem {
    pub fn new(cache_capacity: usize) -> Self {
        Self::with_loader(cache_capacity, Box::new(OpenTypeLoader))
    }

    pub fn with_loader(cache_capacity: usize, loader: Box<dyn FontLoader>) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            registry: FontRegistry::new(),
            loader,
            cache: LruCache::with_hasher(capacity, FxBuildHasher),
            default_font: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    /// Decode and register font bytes. The first registered font becomes the
    /// default unless one was set explicitly.
    pub fn register(&mut self, data: &[u8], name: Option<&str>) -> Result<FontId> {
        let id = self.registry.register(self.loader.as_ref(), data, name)?;
        self.default_font.get_or_insert(id);
        Ok(id)
    }

    pub fn register_face(&mut self, face: Arc<dyn ShapeFont>, name: Option<&str>) -> FontId {
        let id = self.registry.register_face(face, name);
        self.default_font.get_or_insert(id);
        id
    }

    /// Returns false, leaving the default unchanged, for unknown ids.
    pub fn set_default_font(&mut self, id: FontId) -> bool {
        if !self.registry.contains(id) {
            debug!("set_default_font: unknown font id {}", id.0);
            return false;
        }
        self.default_font = Some(id);
        true
    }

    pub fn default_font(&self) -> Option<FontId> {
        self.default_font
    }

    /// Full layout, `None` for an unknown font.
    pub fn layout_full(
        &mut self,
        text: &str,
        wrap_width: Option<f32>,
        font_size: f32,
        font: FontId,
    ) -> Option<Arc<TextLayout>> {
        let Some(face) = self.registry.get(font) else {
            debug!("layout: unknown font id {}", font.0);
            return None;
        };

        let wrap = normalize_wrap(wrap_width);
        let params = LayoutParams {
            font,
            size_bits: font_size.to_bits(),
            wrap_bits: wrap.map(f32::to_bits),
        };
        let key = params.hash_with(text);

        if let Some(cached) = self.cache.get(&key) {
            if cached.params == params && cached.layout.text == text {
                self.hits += 1;
                return Some(Arc::clone(&cached.layout));
            }
        }

        self.misses += 1;
        let layout = Arc::new(layout_text(face.as_ref(), text, font_size, wrap));
        self.cache.put(
            key,
            CachedLayout {
                params,
                layout: Arc::clone(&layout),
            },
        );
        Some(layout)
    }

    /// Aggregate metrics; zeroed (`line_count == 0`) for an unknown font.
    pub fn layout(
        &mut self,
        text: &str,
        wrap_width: Option<f32>,
        font_size: f32,
        font: FontId,
    ) -> TextMetrics {
        self.layout_full(text, wrap_width, font_size, font)
            .map(|layout| layout.metrics())
            .unwrap_or_default()
    }

    /// Size of `text` in the default font.
    pub fn measure(&mut self, text: &str, font_size: f32, max_width: Option<f32>) -> Size {
        self.default_layout(text, font_size, max_width)
            .map(|layout| layout.size())
            .unwrap_or_default()
    }

    /// X position of the caret at byte `offset` in the default font.
    ///
    /// `offset` is clamped to the text and snapped back to a char boundary.
    pub fn measure_to_byte_offset(&mut self, text: &str, font_size: f32, offset: usize) -> f32 {
        let offset = snap_to_boundary(text, offset);
        self.default_layout(text, font_size, None)
            .map(|layout| layout.caret(offset).x)
            .unwrap_or(0.0)
    }

    /// Inverse of [`measure_to_byte_offset`](Self::measure_to_byte_offset).
    pub fn hit_test(&mut self, text: &str, font_size: f32, x: f32) -> usize {
        self.default_layout(text, font_size, None)
            .map(|layout| layout.hit_test(x, 0.0))
            .unwrap_or(0)
    }

    pub fn caret_position(
        &mut self,
        text: &str,
        font: FontId,
        font_size: f32,
        wrap_width: Option<f32>,
        offset: usize,
    ) -> Caret {
        let offset = snap_to_boundary(text, offset);
        self.layout_full(text, wrap_width, font_size, font)
            .map(|layout| layout.caret(offset))
            .unwrap_or_default()
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn default_layout(
        &mut self,
        text: &str,
        font_size: f32,
        wrap_width: Option<f32>,
    ) -> Option<Arc<TextLayout>> {
        let Some(font) = self.default_font else {
            debug!("no font registered, measuring as empty");
            return None;
        };
        self.layout_full(text, wrap_width, font_size, font)
    }
}

impl Default for TextSystem {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
