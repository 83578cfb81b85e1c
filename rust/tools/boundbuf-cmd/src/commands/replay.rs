//! Replays the access pattern of a classic heap overflow: a 16-byte allocation,
//! a stray write at index 19, a loop writing indices 0..30, and an unchecked copy
//! of the input plus its terminator. Each access goes through [`BoundedBuffer`],
//! so the out-of-range ones come back as errors instead of corrupting memory.

use anyhow::{Context, Result};

use boundbuf_bytes::BoundedBuffer;
use boundbuf_common::error::Error;

use crate::commands::display_content;

const STRAY_INDEX: usize = 19;
const LOOP_END: usize = 30;
const FILL_BYTE: u8 = b'b';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Write { offset: usize },
    Copy { offset: usize, len: usize },
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Write { offset } => write!(f, "write [{offset}]"),
            Access::Copy { offset, len } => write!(f, "copy {len} byte(s) to [{offset}]"),
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub access: Access,
    /// Bytes written, or the reason the access was rejected.
    pub result: std::result::Result<usize, Error>,
}

#[derive(Debug)]
pub struct ReplayReport {
    pub outcomes: Vec<Outcome>,
    pub content: Vec<u8>,
}

impl ReplayReport {
    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.accepted()
    }

    /// Whether the populated content still holds a NUL terminator, i.e. can be
    /// read back as a C string without running past the buffer.
    pub fn is_terminated(&self) -> bool {
        self.content.contains(&0)
    }
}

pub fn replay(input: &[u8], capacity: i64) -> boundbuf_common::Result<ReplayReport> {
    let mut buffer = BoundedBuffer::from_signed_capacity(capacity)?;
    let mut outcomes = Vec::with_capacity(LOOP_END + 2);

    let write = |buffer: &mut BoundedBuffer, offset: usize| Outcome {
        access: Access::Write { offset },
        result: buffer.write_at(offset, FILL_BYTE).map(|()| 1),
    };

    outcomes.push(write(&mut buffer, STRAY_INDEX));
    for i in 0..LOOP_END {
        outcomes.push(write(&mut buffer, i));
    }

    let mut source = input.to_vec();
    source.push(0);
    outcomes.push(Outcome {
        access: Access::Copy {
            offset: 0,
            len: source.len(),
        },
        result: buffer.copy_from(&source, 0),
    });

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            log::debug!("rejected {}: {e}", outcome.access);
        }
    }

    Ok(ReplayReport {
        outcomes,
        content: buffer.filled()?.to_vec(),
    })
}

pub fn run(input: String, capacity: i64) -> Result<()> {
    let report = replay(input.as_bytes(), capacity)
        .with_context(|| format!("Failed to create a {capacity}-byte buffer"))?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(written) => match outcome.access {
                Access::Copy { len, .. } if *written < len => {
                    println!("{}: truncated to {written} byte(s)", outcome.access)
                }
                _ => {}
            },
            Err(e) => println!("{}: rejected: {e}", outcome.access),
        }
    }
    println!(
        "{} access(es) accepted, {} rejected",
        report.accepted(),
        report.rejected()
    );
    println!("Buffer content: {}", display_content(&report.content));
    if !report.is_terminated() {
        println!("Warning: no NUL terminator fits in the buffer; content is not a C string");
    }
    Ok(())
}
