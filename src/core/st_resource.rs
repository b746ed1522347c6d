use std::{
    rc::Rc,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// A single-threaded, reference-counted resource with interior mutability.
///
/// `StResource` lets several owners on the driving thread share one value. The
/// streaming core uses it to hand the same [`BufferState`] to the headless
/// renderer (which allocates mesh buffers) and to the chunk manager (which
/// releases them when a mesh is replaced or its chunk is unloaded).
///
/// # Type Parameters
/// - `T`: The type of the contained resource
///
/// # Examples
///
/// ```
/// use voxel_stream::core::StResource;
///
/// let resident = StResource::new(Vec::<u32>::new());
/// let shared = resident.clone();
///
/// shared.get_mut().push(7);
/// assert_eq!(resident.get().len(), 1);
/// ```
///
/// # Performance Considerations
/// - Not thread-safe; never hand a clone to a worker task
/// - A poisoned lock is recovered rather than propagated, since every writer
///   lives on the same thread
///
/// [`BufferState`]: crate::engine_state::buffer_state::BufferState
pub struct StResource<T> {
    resource: Rc<RwLock<T>>,
}

impl<T> StResource<T> {
    /// Creates a new `StResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard over the contained value.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard over the contained value.
    ///
    /// Holding a read guard from the same resource while calling this deadlocks,
    /// so keep guards short-lived.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live handles sharing this resource.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.resource)
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_value() {
        let resource = StResource::new(1u32);
        let clone = resource.clone();

        *clone.get_mut() += 1;

        assert_eq!(*resource.get(), 2);
        assert_eq!(resource.handle_count(), 2);
    }
}
