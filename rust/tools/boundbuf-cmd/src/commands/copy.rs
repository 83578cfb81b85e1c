use anyhow::{Context, Result};

use boundbuf_bytes::{BoundedBuffer, c_str_len};
use boundbuf_common::error::Error;

use crate::commands::{display_content, print_truncation};

/// How the input is copied into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Raw bytes, truncated to the space after the offset.
    Bytes,
    /// A C string that always keeps room for its NUL terminator.
    NulTerminated,
}

/// Outcome of copying an input into a fresh buffer.
#[derive(Debug)]
pub struct CopyReport {
    pub requested: usize,
    pub written: usize,
    pub content: Vec<u8>,
}

impl CopyReport {
    pub fn is_truncated(&self) -> bool {
        self.written < self.requested
    }
}

pub fn copy_input(
    input: &[u8],
    capacity: i64,
    offset: i64,
    mode: CopyMode,
) -> boundbuf_common::Result<CopyReport> {
    let mut buffer = BoundedBuffer::from_signed_capacity(capacity)?;
    let (requested, access_len) = match mode {
        CopyMode::Bytes => (input.len(), input.len()),
        CopyMode::NulTerminated => (c_str_len(input), c_str_len(input) + 1),
    };
    let destination = buffer
        .checked_offset(offset)
        .map_err(|_| Error::out_of_bounds(offset as i128, access_len, buffer.capacity()))?;

    let written = match mode {
        CopyMode::Bytes => buffer.copy_from(input, destination)?,
        CopyMode::NulTerminated => buffer.copy_c_str(input, destination)?,
    };
    Ok(CopyReport {
        requested,
        written,
        content: buffer.filled()?.to_vec(),
    })
}

pub fn run(input: String, capacity: i64, offset: i64, nul_terminate: bool) -> Result<()> {
    let mode = if nul_terminate {
        CopyMode::NulTerminated
    } else {
        CopyMode::Bytes
    };
    let report = copy_input(input.as_bytes(), capacity, offset, mode)
        .with_context(|| format!("Failed to copy input into a {capacity}-byte buffer"))?;

    println!("Buffer content: {}", display_content(&report.content));
    print_truncation(report.written, report.requested);
    Ok(())
}
