use boundbuf_common::{Result, error::Error, verify_arg};

/// Lifecycle state of a [`BoundedBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Storage is allocated and all operations are permitted.
    Live,
    /// Storage has been freed. Terminal: every data operation fails with
    /// `UseAfterRelease`.
    Released,
}

/// Returns the length of the C string held in `bytes`: the index of the first
/// NUL byte, or `bytes.len()` if there is none.
pub fn c_str_len(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())
}

/// An owned, fixed-capacity, zero-initialized byte buffer.
///
/// Every access is checked against the capacity declared at construction
/// before any byte of storage is touched:
/// - [`read_at`](Self::read_at) and [`write_at`](Self::write_at) reject offsets
///   outside `[0, capacity)` outright.
/// - [`copy_from`](Self::copy_from) truncates the source to the space left after
///   the destination offset and reports the number of bytes actually written.
/// - [`copy_c_str`](Self::copy_c_str) does the same but always keeps one byte
///   for the NUL terminator.
///
/// The buffer also tracks a high-water mark (`len`): the smallest prefix that
/// contains every byte written so far. `0 <= len <= capacity` always holds.
///
/// Storage is freed exactly once, either by [`release`](Self::release) or when
/// the buffer is dropped.
pub struct BoundedBuffer {
    /// Backing storage of exactly `capacity` bytes, `None` once released.
    storage: Option<Box<[u8]>>,
    /// Declared capacity, immutable for the lifetime of the buffer.
    capacity: usize,
    /// High-water mark of populated bytes.
    len: usize,
}

impl BoundedBuffer {
    /// Creates a new zero-filled buffer of exactly `capacity` bytes.
    ///
    /// Fails with `InvalidCapacity` when `capacity` is zero, and with
    /// `AllocationFailed` when the allocator cannot provide the storage.
    pub fn new(capacity: usize) -> Result<BoundedBuffer> {
        if capacity == 0 {
            return Err(Error::invalid_capacity(0));
        }

        let mut storage = Vec::<u8>::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| Error::allocation_failed(capacity))?;
        storage.resize(capacity, 0);

        log::debug!("allocated bounded buffer of {capacity} bytes");
        Ok(BoundedBuffer {
            storage: Some(storage.into_boxed_slice()),
            capacity,
            len: 0,
        })
    }

    /// Creates a buffer from a signed capacity, as received from an untrusted caller.
    ///
    /// Zero and negative values fail with `InvalidCapacity`.
    pub fn from_signed_capacity(capacity: i64) -> Result<BoundedBuffer> {
        if capacity <= 0 {
            return Err(Error::invalid_capacity(capacity));
        }
        let capacity = usize::try_from(capacity)
            .map_err(|_| Error::allocation_failed(usize::MAX))?;
        Self::new(capacity)
    }

    /// Converts a signed offset into a valid index for this buffer.
    ///
    /// Negative offsets and offsets at or past the capacity fail with
    /// `OutOfBounds`. This check does not depend on the buffer state.
    pub fn checked_offset(&self, offset: i64) -> Result<usize> {
        match usize::try_from(offset) {
            Ok(index) if index < self.capacity => Ok(index),
            _ => Err(Error::out_of_bounds(offset as i128, 1, self.capacity)),
        }
    }

    /// Returns the declared capacity. Unchanged by [`release`](Self::release).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Longest C string the buffer can hold: one byte is reserved for the terminator.
    #[inline]
    pub fn max_c_str_len(&self) -> usize {
        self.capacity - 1
    }

    /// Returns the number of leading bytes considered populated.
    ///
    /// Zero after release.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no byte has been written since creation or the last clear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn state(&self) -> BufferState {
        if self.storage.is_some() {
            BufferState::Live
        } else {
            BufferState::Released
        }
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.storage.is_none()
    }

    /// Reads the byte at `offset`.
    ///
    /// Any offset below the capacity is readable, including bytes past the
    /// high-water mark (which read as zero unless written).
    pub fn read_at(&self, offset: usize) -> Result<u8> {
        let storage = self.live()?;
        storage
            .get(offset)
            .copied()
            .ok_or_else(|| Error::out_of_bounds(offset as i128, 1, self.capacity))
    }

    /// Writes `value` at `offset`, extending the high-water mark to `offset + 1`
    /// if needed. On error the buffer is left unchanged.
    pub fn write_at(&mut self, offset: usize, value: u8) -> Result<()> {
        let capacity = self.capacity;
        let slot = self
            .live_mut()?
            .get_mut(offset)
            .ok_or_else(|| Error::out_of_bounds(offset as i128, 1, capacity))?;
        *slot = value;
        self.len = self.len.max(offset + 1);
        Ok(())
    }

    /// Copies as much of `source` as fits starting at `destination_offset`.
    ///
    /// Returns the number of bytes written, which is
    /// `min(source.len(), capacity - destination_offset)`. A return value smaller
    /// than `source.len()` means the source was truncated; the caller decides
    /// whether that is acceptable.
    ///
    /// Fails with `OutOfBounds`, writing nothing, if `destination_offset` is not
    /// below the capacity, regardless of the source length.
    pub fn copy_from(&mut self, source: &[u8], destination_offset: usize) -> Result<usize> {
        let capacity = self.capacity;
        let storage = self.live_mut()?;
        if destination_offset >= capacity {
            return Err(Error::out_of_bounds(
                destination_offset as i128,
                source.len(),
                capacity,
            ));
        }

        let count = source.len().min(capacity - destination_offset);
        let end = destination_offset + count;
        storage[destination_offset..end].copy_from_slice(&source[..count]);

        if count < source.len() {
            log::trace!(
                "truncated copy at offset {destination_offset}: {count} of {} bytes written",
                source.len()
            );
        }
        if count > 0 {
            self.len = self.len.max(end);
        }
        Ok(count)
    }

    /// Copies the C string in `source` (up to its first NUL, or all of it) to
    /// `destination_offset` and always writes a terminating NUL after it.
    ///
    /// At most `capacity - destination_offset - 1` string bytes are copied, so the
    /// terminator always fits. Returns the number of string bytes written, not
    /// counting the terminator; a value below [`c_str_len`]`(source)` means the
    /// string was truncated.
    ///
    /// Fails with `OutOfBounds`, writing nothing, if `destination_offset` is not
    /// below the capacity.
    pub fn copy_c_str(&mut self, source: &[u8], destination_offset: usize) -> Result<usize> {
        let text = &source[..c_str_len(source)];
        let capacity = self.capacity;
        let storage = self.live_mut()?;
        if destination_offset >= capacity {
            return Err(Error::out_of_bounds(
                destination_offset as i128,
                text.len() + 1,
                capacity,
            ));
        }

        let count = text.len().min(capacity - destination_offset - 1);
        let end = destination_offset + count;
        storage[destination_offset..end].copy_from_slice(&text[..count]);
        storage[end] = 0;

        if count < text.len() {
            log::trace!(
                "truncated string at offset {destination_offset}: {count} of {} bytes written",
                text.len()
            );
        }
        self.len = self.len.max(end + 1);
        Ok(count)
    }

    /// Returns the populated prefix `[0, len)` of the buffer.
    pub fn filled(&self) -> Result<&[u8]> {
        let storage = self.live()?;
        Ok(&storage[..self.len])
    }

    /// Zeroes the storage and resets the high-water mark.
    pub fn clear(&mut self) -> Result<()> {
        self.live_mut()?.fill(0);
        self.len = 0;
        Ok(())
    }

    /// Frees the backing storage and moves the buffer to [`BufferState::Released`].
    ///
    /// Returns `true` if this call freed the storage. Releasing an already
    /// released buffer is a no-op that returns `false`.
    pub fn release(&mut self) -> bool {
        match self.storage.take() {
            Some(storage) => {
                drop(storage);
                self.len = 0;
                log::debug!("released bounded buffer of {} bytes", self.capacity);
                true
            }
            None => false,
        }
    }

    #[inline]
    fn live(&self) -> Result<&[u8]> {
        self.storage.as_deref().ok_or_else(Error::use_after_release)
    }

    #[inline]
    fn live_mut(&mut self) -> Result<&mut [u8]> {
        self.storage
            .as_deref_mut()
            .ok_or_else(Error::use_after_release)
    }

    /// Returns the exclusive end of a `size`-byte access at `offset`, or
    /// `OutOfBounds` if any part of it falls outside the capacity.
    #[inline]
    fn checked_end(&self, offset: usize, size: usize) -> Result<usize> {
        match offset.checked_add(size) {
            Some(end) if end <= self.capacity => Ok(end),
            _ => Err(Error::out_of_bounds(offset as i128, size, self.capacity)),
        }
    }
}

impl BoundedBuffer {
    /// Writes the bytes of `value` starting at `offset`.
    ///
    /// The whole range `[offset, offset + size_of::<T>())` must fit in the
    /// buffer; there is no truncation. No alignment is required.
    pub fn write_typed_at<T>(&mut self, offset: usize, value: T) -> Result<()>
    where
        T: bytemuck::NoUninit,
    {
        let bytes = bytemuck::bytes_of(&value);
        self.live()?;
        verify_arg!(T, !bytes.is_empty());
        let end = self.checked_end(offset, bytes.len())?;

        self.live_mut()?[offset..end].copy_from_slice(bytes);
        self.len = self.len.max(end);
        Ok(())
    }

    /// Reads a `T` from the bytes starting at `offset`.
    ///
    /// The whole range `[offset, offset + size_of::<T>())` must lie within the
    /// capacity. No alignment is required.
    pub fn read_typed_at<T>(&self, offset: usize) -> Result<T>
    where
        T: bytemuck::AnyBitPattern,
    {
        let size = std::mem::size_of::<T>();
        let storage = self.live()?;
        verify_arg!(T, size != 0);
        let end = self.checked_end(offset, size)?;
        Ok(bytemuck::pod_read_unaligned(&storage[offset..end]))
    }
}

impl Drop for BoundedBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for BoundedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBuffer")
            .field("state", &self.state())
            .field("len", &self.len)
            .field("cap", &self.capacity)
            .finish_non_exhaustive()
    }
}
