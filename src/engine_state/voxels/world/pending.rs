//! Registry of in-flight generation and mesh work.

use std::collections::HashMap;

use crate::engine_state::voxels::chunk::ChunkKey;

/// What a pending operation is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PendingKind {
    /// Terrain generation
    Generate,
    /// Mesh extraction
    Mesh,
}

/// Work submitted for a chunk whose result has not been applied yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingOperation {
    /// Kind of work
    pub kind: PendingKind,
    /// Chunk the work is for
    pub key: ChunkKey,
    /// Ticket echoed back by the task's result
    pub ticket: u64,
}

/// At most one [`PendingOperation`] per key.
#[derive(Debug, Default)]
pub(crate) struct PendingRegistry {
    operations: HashMap<ChunkKey, PendingOperation>,
    next_ticket: u64,
}

impl PendingRegistry {
    /// Records a new operation and returns its ticket, or `None` if the key
    /// already has one in flight.
    pub(crate) fn register(&mut self, kind: PendingKind, key: ChunkKey) -> Option<u64> {
        if self.operations.contains_key(&key) {
            return None;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.operations.insert(key, PendingOperation { kind, key, ticket });
        Some(ticket)
    }

    pub(crate) fn get(&self, key: ChunkKey) -> Option<&PendingOperation> {
        self.operations.get(&key)
    }

    pub(crate) fn contains(&self, key: ChunkKey) -> bool {
        self.operations.contains_key(&key)
    }

    /// `true` if `ticket` belongs to the operation currently pending for `key`.
    pub(crate) fn matches(&self, key: ChunkKey, kind: PendingKind, ticket: u64) -> bool {
        self.operations
            .get(&key)
            .is_some_and(|op| op.kind == kind && op.ticket == ticket)
    }

    pub(crate) fn clear(&mut self, key: ChunkKey) -> Option<PendingOperation> {
        self.operations.remove(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.operations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_registration_is_suppressed() {
        let mut registry = PendingRegistry::default();
        let key = ChunkKey::new(1, 2, 3);

        let ticket = registry.register(PendingKind::Generate, key).unwrap();
        assert_eq!(registry.register(PendingKind::Mesh, key), None);
        assert_eq!(registry.len(), 1);
        assert!(registry.matches(key, PendingKind::Generate, ticket));
        assert!(!registry.matches(key, PendingKind::Mesh, ticket));
    }

    #[test]
    fn tickets_are_never_reused() {
        let mut registry = PendingRegistry::default();
        let key = ChunkKey::default();

        let first = registry.register(PendingKind::Generate, key).unwrap();
        registry.clear(key);
        let second = registry.register(PendingKind::Generate, key).unwrap();

        assert_ne!(first, second);
        assert!(!registry.matches(key, PendingKind::Generate, first));
        assert_eq!(registry.get(key).map(|op| op.ticket), Some(second));
    }
}
