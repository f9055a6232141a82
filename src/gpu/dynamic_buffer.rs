//! Growable GPU buffers.
//!
//! A buffer grows (2x) when a write exceeds its capacity and never shrinks.
//! A reallocation invalidates bind groups that reference it, so writes
//! report whether one happened.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

const MIN_CAPACITY: usize = 64;

/// Capacity to allocate for `needed` bytes given the current capacity, or
/// `None` when the current buffer is large enough.
#[must_use]
pub fn grown_capacity(needed: usize, current: usize) -> Option<usize> {
    (needed > current).then(|| (needed * 2).max(current + 1024))
}

/// A typed GPU buffer that grows on demand.
pub struct DynamicBuffer<T> {
    buffer: wgpu::Buffer,
    capacity: usize,
    count: usize,
    usage: wgpu::BufferUsages,
    label: String,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> DynamicBuffer<T> {
    /// Empty buffer with room for `capacity` items.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let bytes = (capacity * size_of::<T>()).max(MIN_CAPACITY);
        Self {
            buffer: allocate(device, label, bytes, usage),
            capacity: bytes,
            count: 0,
            usage,
            label: label.to_owned(),
            _marker: PhantomData,
        }
    }

    /// Buffer initialised with `data`.
    pub fn with_data(
        device: &wgpu::Device,
        label: &str,
        data: &[T],
        usage: wgpu::BufferUsages,
    ) -> Self {
        if data.is_empty() {
            return Self::new(device, label, 0, usage);
        }
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytes,
            usage: usage | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            capacity: bytes.len(),
            count: data.len(),
            usage,
            label: label.to_owned(),
            _marker: PhantomData,
        }
    }

    /// Replace the contents, growing if necessary.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups need
    /// recreation).
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) -> bool {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let grown = grown_capacity(bytes.len(), self.capacity);
        if let Some(capacity) = grown {
            self.buffer.destroy();
            self.buffer = allocate(device, &self.label, capacity, self.usage);
            self.capacity = capacity;
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.count = data.len();
        grown.is_some()
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Items written by the last write.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the last write was empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Free the GPU memory now rather than at drop.
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

fn allocate(
    device: &wgpu::Device,
    label: &str,
    bytes: usize,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes as u64,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_at_least_double() {
        assert_eq!(grown_capacity(10, 64), None);
        assert_eq!(grown_capacity(64, 64), None);
        assert_eq!(grown_capacity(65, 64), Some(1088));
        assert_eq!(grown_capacity(4000, 1088), Some(8000));
    }
}
