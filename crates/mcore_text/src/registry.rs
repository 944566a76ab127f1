//! Registered fonts, addressed by dense integer ids

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::font::{FontLoader, ShapeFont};
use crate::Result;

/// Stable handle for a registered font. Ids are dense and start at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u32);

impl From<u32> for FontId {
    fn from(id: u32) -> Self {
        FontId(id)
    }
}

struct RegisteredFont {
    name: Option<String>,
    face: Arc<dyn ShapeFont>,
}

/// Fonts registered by the host, never removed or mutated
#[derive(Default)]
pub struct FontRegistry {
    fonts: Vec<RegisteredFont>,
    by_name: FxHashMap<String, FontId>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `data` with `loader` and register the face.
    pub fn register(
        &mut self,
        loader: &dyn FontLoader,
        data: &[u8],
        name: Option<&str>,
    ) -> Result<FontId> {
        let face = loader.load(data)?;
        Ok(self.register_face(face, name))
    }

    /// Register an already decoded face.
    ///
    /// A name registered twice resolves to the most recent font; the earlier
    /// id stays valid.
    pub fn register_face(&mut self, face: Arc<dyn ShapeFont>, name: Option<&str>) -> FontId {
        let id = FontId(self.fonts.len() as u32);
        let name = name
            .map(str::to_owned)
            .or_else(|| face.family_name())
            .filter(|n| !n.is_empty());
        if let Some(name) = &name {
            self.by_name.insert(name.clone(), id);
        }
        tracing::debug!("registered font {:?} as {}", name, id.0);
        self.fonts.push(RegisteredFont { name, face });
        id
    }

    pub fn get(&self, id: FontId) -> Option<&Arc<dyn ShapeFont>> {
        self.fonts.get(id.0 as usize).map(|f| &f.face)
    }

    pub fn find(&self, name: &str) -> Option<FontId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: FontId) -> Option<&str> {
        self.fonts.get(id.0 as usize)?.name.as_deref()
    }

    pub fn contains(&self, id: FontId) -> bool {
        (id.0 as usize) < self.fonts.len()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FixedPitchFace, OpenTypeLoader};

    #[test]
    fn test_ids_are_dense_from_zero() {
        let mut registry = FontRegistry::new();
        let a = registry.register_face(Arc::new(FixedPitchFace), Some("ui"));
        let b = registry.register_face(Arc::new(FixedPitchFace), Some("mono"));
        assert_eq!(a, FontId(0));
        assert_eq!(b, FontId(1));
        assert_eq!(registry.find("mono"), Some(b));
        assert_eq!(registry.name(a), Some("ui"));
        assert!(registry.contains(b));
        assert!(!registry.contains(FontId(2)));
    }

    #[test]
    fn test_face_family_used_when_unnamed() {
        let mut registry = FontRegistry::new();
        let id = registry.register_face(Arc::new(FixedPitchFace), None);
        assert_eq!(registry.find("Fixed Pitch"), Some(id));
    }

    #[test]
    fn test_failed_registration_does_not_consume_an_id() {
        let mut registry = FontRegistry::new();
        assert!(registry.register(&OpenTypeLoader, b"junk", Some("x")).is_err());
        assert!(registry.is_empty());
        let id = registry.register_face(Arc::new(FixedPitchFace), None);
        assert_eq!(id, FontId(0));
    }
}
