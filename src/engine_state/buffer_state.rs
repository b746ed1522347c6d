//! # Buffer State Module
//!
//! This module provides a central registry for the mesh buffers a graphics
//! backend hands out, with per-buffer analytics to track memory use.
//!
//! ## Key Features
//!
//! * Buffers are referenced by an opaque [`BufferId`]
//! * Bounds-checked writes through [`BufferWriteCommand`]
//! * Allocation analytics (allocated bytes, used bytes, write count)
//! * Release through the [`BufferAllocator`] interface the chunk manager uses
//!
//! ## Architecture
//!
//! The headless renderer creates one vertex and one index buffer per mesh here
//! and records their ids in the [`MeshHandle`](crate::engine_state::rendering::MeshHandle).
//! When the chunk manager drops a mesh it releases every id back through
//! [`BufferAllocator::release_buffer`]. Both sides share the registry through an
//! [`StResource`].

use std::{collections::HashMap, fmt::Debug};

use bytemuck::NoUninit;
use log::warn;

use crate::{core::StResource, engine_state::rendering::BufferAllocator};

/// Opaque identity of a buffer in a [`BufferState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Analytics data for a buffer
///
/// Tracks memory allocation, usage, and write operations for a buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    pub allocated_memory: u64,
    /// Highest byte written so far
    pub used_memory: u64,
    /// Number of times the buffer has been written to
    pub times_written: u64,
}

#[derive(Debug)]
struct BufferEntry {
    label: &'static str,
    data: Vec<u8>,
    analytics: BufferAnalytics,
}

/// Central registry for mesh buffers
///
/// # Examples
///
/// ```
/// use voxel_stream::engine_state::buffer_state::{BufferState, BufferWriteCommand};
///
/// let mut buffer_state = BufferState::new();
/// let id = buffer_state.create_buffer("vertex_buffer", 16);
///
/// buffer_state.write(BufferWriteCommand {
///     name: "upload".to_string(),
///     buffer_id: id,
///     offset: 0,
///     data: Box::new([1.0f32, 2.0, 3.0, 4.0]),
/// });
///
/// assert_eq!(buffer_state.get_total_used_memory(), 16);
/// assert!(buffer_state.release(id));
/// ```
#[derive(Debug, Default)]
pub struct BufferState {
    buffers: HashMap<BufferId, BufferEntry>,
    next_id: u64,
    released: u64,
}

impl BufferState {
    /// Creates a new buffer state manager with no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, label: &'static str, data: Vec<u8>, analytics: BufferAnalytics) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            id,
            BufferEntry {
                label,
                data,
                analytics,
            },
        );
        id
    }

    /// Creates a zeroed buffer of `size` bytes.
    ///
    /// # Arguments
    ///
    /// * `label` - Debug label for the buffer
    /// * `size` - Size of the buffer in bytes
    pub fn create_buffer(&mut self, label: &'static str, size: u64) -> BufferId {
        self.insert(
            label,
            vec![0; size as usize],
            BufferAnalytics {
                allocated_memory: size,
                used_memory: 0,
                times_written: 0,
            },
        )
    }

    /// Creates a buffer and initializes it with data
    pub fn create_buffer_init(&mut self, label: &'static str, contents: &[u8]) -> BufferId {
        let size = contents.len() as u64;
        self.insert(
            label,
            contents.to_vec(),
            BufferAnalytics {
                allocated_memory: size,
                used_memory: size,
                times_written: 1,
            },
        )
    }

    /// Writes data to a buffer using a command structure
    ///
    /// # Returns
    ///
    /// `false` if the buffer doesn't exist or the write would overflow it.
    pub fn write(&mut self, buffer_command: BufferWriteCommand) -> bool {
        let written = self.write_buffer(
            buffer_command.buffer_id,
            buffer_command.offset,
            buffer_command.data.as_bytes(),
        );
        if !written {
            warn!(
                "Dropped buffer write '{}' to {:?}",
                buffer_command.name, buffer_command.buffer_id
            );
        }
        written
    }

    /// Writes raw byte data to a buffer
    ///
    /// # Arguments
    ///
    /// * `buffer_id` - Target buffer
    /// * `offset` - Byte offset to start writing at
    /// * `data` - Bytes to write
    pub fn write_buffer(&mut self, buffer_id: BufferId, offset: u64, data: &[u8]) -> bool {
        let Some(entry) = self.buffers.get_mut(&buffer_id) else {
            return false;
        };

        let start = offset as usize;
        let end = start + data.len();
        if end > entry.data.len() {
            return false;
        }

        entry.data[start..end].copy_from_slice(data);
        entry.analytics.used_memory = entry.analytics.used_memory.max(end as u64);
        entry.analytics.times_written += 1;
        true
    }

    /// Frees a buffer. Returns `false` if it was already gone.
    pub fn release(&mut self, buffer_id: BufferId) -> bool {
        let removed = self.buffers.remove(&buffer_id).is_some();
        if removed {
            self.released += 1;
        }
        removed
    }

    /// Gets the contents of a buffer
    pub fn get_buffer(&self, buffer_id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer_id).map(|entry| entry.data.as_slice())
    }

    /// Debug label of a buffer
    pub fn get_label(&self, buffer_id: BufferId) -> Option<&'static str> {
        self.buffers.get(&buffer_id).map(|entry| entry.label)
    }

    /// Analytics of a single buffer
    pub fn get_analytics(&self, buffer_id: BufferId) -> Option<BufferAnalytics> {
        self.buffers.get(&buffer_id).map(|entry| entry.analytics)
    }

    /// Number of buffers currently allocated
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of buffers released over the registry's lifetime
    pub fn released_buffer_count(&self) -> u64 {
        self.released
    }

    /// Gets the total allocated memory across all buffers, in bytes
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffers
            .values()
            .fold(0, |acc, entry| acc + entry.analytics.allocated_memory)
    }

    /// Gets the total used memory across all buffers, in bytes
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffers
            .values()
            .fold(0, |acc, entry| acc + entry.analytics.used_memory)
    }
}

impl BufferAllocator for StResource<BufferState> {
    fn release_buffer(&mut self, buffer_id: BufferId) {
        if !self.get_mut().release(buffer_id) {
            warn!("Released unknown buffer {:?}", buffer_id);
        }
    }
}

/// Command for writing data to a buffer
///
/// This structure encapsulates all information needed to write data to a buffer,
/// including the target buffer, offset, and the data itself.
pub struct BufferWriteCommand {
    /// Descriptive name for the command (for debugging)
    pub name: String,
    /// Target buffer
    pub buffer_id: BufferId,
    /// Byte offset in the buffer to start writing
    pub offset: u64,
    /// Data to write to the buffer
    pub data: Box<dyn AsBytes + Send + Sync>,
}

impl Debug for BufferWriteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferWriteCommand")
            .field("name", &self.name)
            .field("buffer_id", &self.buffer_id)
            .field("offset", &self.offset)
            .finish()
    }
}

/// Trait for types that can be converted to bytes for buffer writing
pub trait AsBytes {
    /// Converts the value to a byte slice
    fn as_bytes(&self) -> &[u8];
}

impl<T> AsBytes for Vec<T>
where
    T: NoUninit + Send + Sync,
{
    fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self)
    }
}

impl<T, const N: usize> AsBytes for [T; N]
where
    T: NoUninit + Send + Sync,
{
    fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_bounds_checked() {
        let mut state = BufferState::new();
        let id = state.create_buffer("indices", 8);

        assert!(state.write_buffer(id, 4, &[1, 2, 3, 4]));
        assert!(!state.write_buffer(id, 6, &[1, 2, 3]));
        assert_eq!(state.get_buffer(id), Some(&[0, 0, 0, 0, 1, 2, 3, 4][..]));

        let analytics = state.get_analytics(id).unwrap();
        assert_eq!(analytics.used_memory, 8);
        assert_eq!(analytics.times_written, 1);
    }

    #[test]
    fn release_through_shared_allocator() {
        let shared = StResource::new(BufferState::new());
        let id = shared.get_mut().create_buffer_init("vertices", &[0u8; 32]);
        assert_eq!(shared.get().get_total_allocated_memory(), 32);

        let mut allocator = shared.clone();
        allocator.release_buffer(id);

        assert_eq!(shared.get().live_buffer_count(), 0);
        assert_eq!(shared.get().released_buffer_count(), 1);
        assert!(!shared.get_mut().release(id));
    }
}
