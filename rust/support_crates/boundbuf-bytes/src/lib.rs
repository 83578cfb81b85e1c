//! Fixed-capacity byte buffers whose every read, write and copy is checked
//! against the declared capacity before it touches storage.
//!
//! The only way to reach the bytes of a [`BoundedBuffer`] is through its
//! accessors, which return typed errors instead of corrupting adjacent memory:
//!
//! ```
//! use boundbuf_bytes::BoundedBuffer;
//!
//! let mut buf = BoundedBuffer::new(16)?;
//! assert_eq!(buf.copy_from(b"this string is way too long", 0)?, 16);
//! assert!(buf.read_at(19).unwrap_err().is_out_of_bounds());
//! buf.release();
//! assert!(buf.read_at(0).unwrap_err().is_use_after_release());
//! # Ok::<(), boundbuf_common::error::Error>(())
//! ```

pub mod bounded;

pub use bounded::{BoundedBuffer, BufferState, c_str_len};

#[cfg(test)]
mod tests;
