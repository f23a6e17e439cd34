//! Sliding-window chunking of document text.
//!
//! Windows are measured in characters, not bytes, so a chunk never splits a
//! multi-byte character. Consecutive windows overlap by `window - stride`
//! characters so evidence straddling a boundary appears whole in one chunk.

use thiserror::Error;

pub const DEFAULT_WINDOW: usize = 2000;
pub const DEFAULT_STRIDE: usize = 1500;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid chunk window: stride {stride} must be > 0 and < window {window}")]
pub struct InvalidWindow {
    pub window: usize,
    pub stride: usize,
}

/// Window configuration. Cheap to copy; call [`TextChunker::chunks`] as many
/// times as needed, each call starts a fresh pass over the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    window: usize,
    stride: usize,
}

impl TextChunker {
    pub fn new(window: usize, stride: usize) -> Result<Self, InvalidWindow> {
        if stride == 0 || stride >= window {
            return Err(InvalidWindow { window, stride });
        }
        Ok(Self { window, stride })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn overlap(&self) -> usize {
        self.window - self.stride
    }

    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            start: 0,
            window: self.window,
            stride: self.stride,
            done: false,
        }
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            stride: DEFAULT_STRIDE,
        }
    }
}

/// Lazy iterator over the windows of one text.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    /// Byte offset of the next window start; always on a char boundary.
    start: usize,
    window: usize,
    stride: usize,
    done: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }
        let rest = &self.text[self.start..];
        let end = byte_offset_of_char(rest, self.window);
        let chunk = &rest[..end];

        if end == rest.len() {
            // This window reaches the end of the text; anything after it would
            // be fully contained in it.
            self.done = true;
        } else {
            self.start += byte_offset_of_char(rest, self.stride);
        }
        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}

/// Byte offset of the `n`th character of `s`, or `s.len()` when `s` is shorter.
fn byte_offset_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
