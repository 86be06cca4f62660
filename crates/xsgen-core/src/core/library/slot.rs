use super::xs_library::XsLibrary;
use std::sync::Arc;

/// Holds the cross-section library attached to a reactor core.
///
/// The slot is either empty or holds a shared, immutable library. Writers replace the
/// whole value; readers clone the [`Arc`] and keep a consistent view even if the slot
/// is replaced afterwards. Mutation requires `&mut`, which leaves one writer at a time.
#[derive(Debug, Clone, Default)]
pub struct LibrarySlot {
    current: Option<Arc<XsLibrary>>,
}

impl LibrarySlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_library(library: XsLibrary) -> Self {
        Self {
            current: Some(Arc::new(library)),
        }
    }

    pub fn get(&self) -> Option<&XsLibrary> {
        self.current.as_deref()
    }

    /// A shared handle to the current library, unaffected by later replacements.
    pub fn snapshot(&self) -> Option<Arc<XsLibrary>> {
        self.current.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Replaces the attached library, returning the previous one.
    pub fn replace(&mut self, library: XsLibrary) -> Option<Arc<XsLibrary>> {
        self.current.replace(Arc::new(library))
    }

    /// Detaches the current library, returning it.
    pub fn clear(&mut self) -> Option<Arc<XsLibrary>> {
        self.current.take()
    }

    /// Whether `other` is the very same library instance as the attached one.
    pub fn holds(&self, other: &Arc<XsLibrary>) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, other))
    }
}
