// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Buffers handed to the vendor library.

use std::os::raw::c_char;

use crate::ffi::Dword;

/// Size of the fixed name/unit/text buffers.
pub const TEXT_BUFFER_SIZE: usize = 64;

/// Upper bound for handle arrays; enumeration stops growing here.
pub const MAX_HANDLE_BUFFER: usize = 1 << 16;

/// A zeroed, fixed-size C string buffer.
///
/// The library is told one byte less than the real size so the result is
/// always NUL-terminated.
#[derive(Debug, Clone)]
pub struct TextBuffer([u8; TEXT_BUFFER_SIZE]);

impl Default for TextBuffer {
    fn default() -> Self {
        Self([0; TEXT_BUFFER_SIZE])
    }
}

impl TextBuffer {
    /// Creates a zeroed buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer passed to the library.
    pub fn as_mut_ptr(&mut self) -> *mut c_char {
        self.0.as_mut_ptr().cast()
    }

    /// Capacity reported to the library.
    pub fn capacity(&self) -> Dword {
        (TEXT_BUFFER_SIZE - 1) as Dword
    }

    /// Converts the contents up to the first NUL, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

/// Reads a handle table whose size is not known in advance.
///
/// `fill` receives a zeroed buffer and returns the raw count reported by the
/// library. A count of zero or less means no handles. A count larger than the
/// buffer regrows it to exactly that count; a completely filled buffer may
/// have been truncated and is retried with twice the capacity. Growth stops at
/// [`MAX_HANDLE_BUFFER`], and only entries within the reported count are
/// returned.
pub fn read_handles<F>(initial: usize, mut fill: F) -> Vec<Dword>
where
    F: FnMut(&mut [Dword]) -> i32,
{
    let mut capacity = initial.clamp(1, MAX_HANDLE_BUFFER);
    loop {
        let mut buffer = vec![0; capacity];
        let reported = fill(&mut buffer);
        if reported <= 0 {
            return Vec::new();
        }

        let count = reported as usize;
        if count < capacity || capacity >= MAX_HANDLE_BUFFER {
            buffer.truncate(count.min(capacity));
            return buffer;
        }

        capacity = if count > capacity {
            count.min(MAX_HANDLE_BUFFER)
        } else {
            (capacity * 2).min(MAX_HANDLE_BUFFER)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_buffer_stops_at_nul() {
        let mut buffer = TextBuffer::new();
        buffer.0[..8].copy_from_slice(b"Pac\0junk");
        assert_eq!(buffer.to_string_lossy(), "Pac");
        assert_eq!(buffer.capacity(), 63);
    }

    #[test]
    fn test_text_buffer_lossy_and_unterminated() {
        let mut buffer = TextBuffer([b'A'; TEXT_BUFFER_SIZE]);
        assert_eq!(buffer.to_string_lossy().len(), TEXT_BUFFER_SIZE);

        buffer.0[0] = 0xFF;
        buffer.0[1] = 0;
        assert_eq!(buffer.to_string_lossy(), "\u{FFFD}");
    }

    #[test]
    fn test_read_handles_fits() {
        let handles = read_handles(10, |buf| {
            buf[0] = 7;
            buf[1] = 9;
            2
        });
        assert_eq!(handles, vec![7, 9]);
    }

    #[test]
    fn test_read_handles_grows_when_full() {
        let available: Vec<Dword> = (1..=25).collect();
        let mut calls = 0;

        let handles = read_handles(10, |buf| {
            calls += 1;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n as i32
        });

        assert_eq!(handles, available);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_read_handles_negative_status_is_empty() {
        let mut calls = 0;
        let handles = read_handles(500, |_| {
            calls += 1;
            -1
        });

        assert!(handles.is_empty());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_read_handles_zero_is_empty() {
        let handles = read_handles(10, |_| 0);
        assert!(handles.is_empty());
    }

    #[test]
    fn test_read_handles_regrows_to_reported_count() {
        let available: Vec<Dword> = (1..=37).collect();
        let mut sizes = Vec::new();

        let handles = read_handles(10, |buf| {
            sizes.push(buf.len());
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            available.len() as i32
        });

        assert_eq!(handles, available);
        assert_eq!(sizes, vec![10, 37]);
    }

    #[test]
    fn test_read_handles_caps_overreported_count() {
        let mut sizes = Vec::new();
        let handles = read_handles(4, |buf| {
            sizes.push(buf.len());
            buf.fill(3);
            i32::MAX
        });

        assert_eq!(sizes, vec![4, MAX_HANDLE_BUFFER]);
        assert_eq!(handles.len(), MAX_HANDLE_BUFFER);
        assert!(handles.iter().all(|&h| h == 3));
    }
}
