use std::cell::Cell;

use boundbuf_common::error::ErrorKind;

use crate::{BoundedBuffer, BufferState};

fn snapshot(buf: &BoundedBuffer) -> Vec<u8> {
    (0..buf.capacity()).map(|i| buf.read_at(i).unwrap()).collect()
}

#[test]
fn test_end_to_end_scenario() {
    let mut b = BoundedBuffer::new(16).unwrap();
    assert_eq!(b.copy_from(b"hello", 0).unwrap(), 5);
    assert_eq!(b.read_at(4).unwrap(), b'o');
    assert!(b.read_at(19).unwrap_err().is_out_of_bounds());
    assert!(b.release());
    assert!(b.read_at(0).unwrap_err().is_use_after_release());
}

#[test]
fn test_demonstrated_overflow_pattern_is_rejected() {
    let mut buf = BoundedBuffer::new(16).unwrap();

    assert!(buf.write_at(19, b'b').is_err());

    let accepted = (0..30).filter(|&i| buf.write_at(i, b'b').is_ok()).count();
    assert_eq!(accepted, 16);
    assert_eq!(snapshot(&buf), vec![b'b'; 16]);

    let mut input = b"this string is way too long".to_vec();
    input.push(0);
    let written = buf.copy_from(&input, 0).unwrap();
    assert_eq!(written, 16);
    assert!(written < input.len());
    assert_eq!(buf.filled().unwrap(), &input[..16]);
}

#[test]
fn test_every_capacity_reads_within_bounds_only() {
    for capacity in 1..=64 {
        let buf = BoundedBuffer::new(capacity).unwrap();
        for offset in 0..capacity {
            assert_eq!(buf.read_at(offset).unwrap(), 0);
        }
        for offset in capacity..capacity + 8 {
            assert!(buf.read_at(offset).unwrap_err().is_out_of_bounds());
        }
        for offset in [-1i64, -2, i64::MIN] {
            assert!(buf.checked_offset(offset).unwrap_err().is_out_of_bounds());
        }
    }
}

#[test]
fn test_non_positive_capacities() {
    for capacity in [0i64, -1, -16, i64::MIN] {
        let err = BoundedBuffer::from_signed_capacity(capacity).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InvalidCapacity {
                requested: capacity
            }
        );
    }
}

#[test]
fn test_random_write_read_round_trip() {
    fastrand::seed(4217);
    for _ in 0..200 {
        let capacity = fastrand::usize(1..256);
        let mut buf = BoundedBuffer::new(capacity).unwrap();
        let mut model = vec![0u8; capacity];
        let mut high_water = 0;

        for _ in 0..100 {
            let offset = fastrand::usize(0..capacity * 2);
            let value = fastrand::u8(..);
            let before = snapshot(&buf);
            match buf.write_at(offset, value) {
                Ok(()) => {
                    assert!(offset < capacity);
                    model[offset] = value;
                    high_water = high_water.max(offset + 1);
                    assert_eq!(buf.read_at(offset).unwrap(), value);
                }
                Err(e) => {
                    assert!(offset >= capacity);
                    assert!(e.is_out_of_bounds());
                    assert_eq!(snapshot(&buf), before);
                }
            }
            assert_eq!(buf.len(), high_water);
            assert!(buf.len() <= buf.capacity());
        }
        assert_eq!(snapshot(&buf), model);
    }
}

#[test]
fn test_random_copies_never_cross_capacity() {
    fastrand::seed(98765);
    for _ in 0..200 {
        let capacity = fastrand::usize(1..128);
        let mut buf = BoundedBuffer::new(capacity).unwrap();
        let mut model = vec![0u8; capacity];

        for _ in 0..20 {
            let source: Vec<u8> = (0..fastrand::usize(0..200))
                .map(|_| fastrand::u8(1..))
                .collect();
            let offset = fastrand::usize(0..capacity + 16);
            match buf.copy_from(&source, offset) {
                Ok(written) => {
                    assert!(offset < capacity);
                    assert_eq!(written, source.len().min(capacity - offset));
                    model[offset..offset + written].copy_from_slice(&source[..written]);
                }
                Err(e) => {
                    assert!(offset >= capacity);
                    assert!(e.is_out_of_bounds());
                }
            }
            assert_eq!(snapshot(&buf), model);
            assert!(buf.len() <= capacity);
        }
    }
}

#[test]
fn test_released_buffer_rejects_everything() {
    fastrand::seed(11);
    for _ in 0..50 {
        let capacity = fastrand::usize(1..64);
        let mut buf = BoundedBuffer::new(capacity).unwrap();
        buf.release();
        assert_eq!(buf.state(), BufferState::Released);

        let offset = fastrand::usize(0..capacity * 2);
        assert!(buf.read_at(offset).unwrap_err().is_use_after_release());
        assert!(buf.write_at(offset, 1).unwrap_err().is_use_after_release());
        assert!(
            buf.copy_from(b"data", offset)
                .unwrap_err()
                .is_use_after_release()
        );
        assert!(!buf.release());
    }
}

/// Records the result of releasing the wrapped buffer when it goes out of scope.
struct ReleaseRecorder<'a> {
    buf: BoundedBuffer,
    released: &'a Cell<Option<bool>>,
}

impl Drop for ReleaseRecorder<'_> {
    fn drop(&mut self) {
        self.released.set(Some(self.buf.release()));
    }
}

#[test]
fn test_scoped_release_on_early_return() {
    fn fill(input: &[u8], released: &Cell<Option<bool>>) -> boundbuf_common::Result<usize> {
        let mut guard = ReleaseRecorder {
            buf: BoundedBuffer::new(4)?,
            released,
        };
        guard.buf.copy_from(input, 0)?;
        guard.buf.write_at(10, 0)?;
        Ok(guard.buf.len())
    }

    let released = Cell::new(None);
    let err = fill(b"abcdef", &released).unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(released.get(), Some(true));
}

#[test]
fn test_scoped_release_after_explicit_release() {
    let released = Cell::new(None);
    {
        let mut guard = ReleaseRecorder {
            buf: BoundedBuffer::new(4).unwrap(),
            released: &released,
        };
        assert!(guard.buf.release());
    }
    assert_eq!(released.get(), Some(false));
}
