use anyhow::{Context, Result};

use boundbuf_bytes::BoundedBuffer;
use boundbuf_common::error::Error;

use crate::commands::print_truncation;

#[derive(Debug)]
pub struct PeekReport {
    /// Bytes of the fill text written, and the fill text length.
    pub fill: Option<(usize, usize)>,
    pub reads: Vec<(i64, std::result::Result<u8, Error>)>,
}

pub fn peek(
    offsets: &[i64],
    capacity: i64,
    fill: Option<&[u8]>,
) -> boundbuf_common::Result<PeekReport> {
    let mut buffer = BoundedBuffer::from_signed_capacity(capacity)?;
    let fill = match fill {
        Some(fill) => Some((buffer.copy_from(fill, 0)?, fill.len())),
        None => None,
    };

    let reads = offsets
        .iter()
        .map(|&offset| {
            let value = buffer
                .checked_offset(offset)
                .and_then(|index| buffer.read_at(index));
            (offset, value)
        })
        .collect();
    Ok(PeekReport { fill, reads })
}

pub fn run(offsets: Vec<i64>, capacity: i64, fill: Option<String>) -> Result<()> {
    let report = peek(&offsets, capacity, fill.as_deref().map(str::as_bytes))
        .with_context(|| format!("Failed to prepare a {capacity}-byte buffer"))?;

    if let Some((written, requested)) = report.fill {
        print_truncation(written, requested);
    }
    for (offset, value) in report.reads {
        match value {
            Ok(byte) if byte.is_ascii_graphic() => {
                println!("[{offset}] = 0x{byte:02x} '{}'", byte as char)
            }
            Ok(byte) => println!("[{offset}] = 0x{byte:02x}"),
            Err(e) => println!("[{offset}] error: {e}"),
        }
    }
    Ok(())
}
