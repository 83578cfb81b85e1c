use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_capacity(requested: i64) -> Error {
        Error(ErrorKind::InvalidCapacity { requested }.into())
    }

    pub fn allocation_failed(capacity: usize) -> Error {
        Error(ErrorKind::AllocationFailed { capacity }.into())
    }

    /// An access of `len` bytes starting at `offset` does not fit in `capacity`.
    ///
    /// `offset` is signed so that rejected negative offsets are reported as given.
    pub fn out_of_bounds(offset: i128, len: usize, capacity: usize) -> Error {
        Error(
            ErrorKind::OutOfBounds {
                offset,
                len,
                capacity,
            }
            .into(),
        )
    }

    pub fn use_after_release() -> Error {
        Error(ErrorKind::UseAfterRelease.into())
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind(), ErrorKind::OutOfBounds { .. })
    }

    pub fn is_use_after_release(&self) -> bool {
        matches!(self.kind(), ErrorKind::UseAfterRelease)
    }

    pub fn is_invalid_capacity(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidCapacity { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("invalid capacity {requested}: capacity must be positive")]
    InvalidCapacity { requested: i64 },

    #[error("failed to allocate {capacity} bytes of buffer storage")]
    AllocationFailed { capacity: usize },

    #[error("access of {len} byte(s) at offset {offset} is out of bounds for capacity {capacity}")]
    OutOfBounds {
        offset: i128,
        len: usize,
        capacity: usize,
    },

    #[error("buffer used after release")]
    UseAfterRelease,

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
