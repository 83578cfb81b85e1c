//! Command implementations for boundbuf-cmd

use boundbuf_bytes::c_str_len;

pub mod copy;
pub mod peek;
pub mod replay;

/// Renders buffer bytes the way a C string would print: up to the first NUL.
pub fn display_content(bytes: &[u8]) -> String {
    String::from_utf8_lossy(&bytes[..c_str_len(bytes)]).into_owned()
}

/// Prints the notice shown whenever a copy wrote fewer bytes than requested.
pub fn print_truncation(written: usize, requested: usize) {
    if written < requested {
        println!("Input truncated: wrote {written} of {requested} bytes");
    }
}
