//! Provider session state.
//!
//! A session is immutable once built. `parameterize` swaps a new one into
//! the [`SessionSlot`]; readers pin the session they started with.

use comphost_parser::DeclarationSource;
use comphost_schema::PackageSchema;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Everything one `parameterize` call produced.
#[derive(Debug)]
pub struct ProviderSession {
    pub schema: PackageSchema,
    pub serialized_schema: String,
    /// Absolute component directory
    pub directory: PathBuf,
    pub source: DeclarationSource,
    /// Position of this session among all sessions of the slot, from 1
    pub generation: u64,
}

/// Holder of the active session.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: RwLock<Option<Arc<ProviderSession>>>,
    generations: AtomicU64,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if any.
    pub fn current(&self) -> Option<Arc<ProviderSession>> {
        self.current.read().clone()
    }

    pub fn is_parameterized(&self) -> bool {
        self.current.read().is_some()
    }

    /// Install `session` as the active one, replacing any previous session.
    pub fn replace(&self, mut session: ProviderSession) -> Arc<ProviderSession> {
        session.generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Arc::new(session);
        *self.current.write() = Some(session.clone());
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comphost_schema::{assemble, ComponentMap, PackageDescriptor};

    fn session(dir: &str) -> ProviderSession {
        let schema = assemble(&PackageDescriptor::new("pkg", "1.0.0"), &ComponentMap::new()).unwrap();
        ProviderSession {
            serialized_schema: schema.to_json().unwrap(),
            schema,
            directory: PathBuf::from(dir),
            source: DeclarationSource::default(),
            generation: 0,
        }
    }

    #[test]
    fn test_empty_slot() {
        let slot = SessionSlot::new();
        assert!(!slot.is_parameterized());
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_replace_is_last_write_wins() {
        let slot = SessionSlot::new();
        let first = slot.replace(session("/a"));
        let pinned = slot.current().unwrap();
        let second = slot.replace(session("/b"));

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(slot.current().unwrap().directory, PathBuf::from("/b"));
        // Readers keep the session they pinned
        assert_eq!(pinned.directory, PathBuf::from("/a"));
    }
}
