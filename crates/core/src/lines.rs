//! Line counting for text files

use crate::probe::Probe;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

/// Read buffer size for streamed line counting
const CHUNK: usize = 64 * 1024;

/// Incremental line counter over decoded text
///
/// `\n`, `\r\n` and a lone `\r` each end a line. Trailing text without a
/// terminator counts as a line. A `\r\n` split across two chunks still
/// counts once.
#[derive(Debug, Default)]
pub struct LineCounter {
    lines: u64,
    pending: bool,
    after_cr: bool,
}

impl LineCounter {
    /// Create a counter with nothing seen
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next piece of text
    pub fn feed(&mut self, text: &str) {
        for &byte in text.as_bytes() {
            match byte {
                b'\n' => {
                    if !self.after_cr {
                        self.lines += 1;
                    }
                    self.after_cr = false;
                    self.pending = false;
                }
                b'\r' => {
                    self.lines += 1;
                    self.after_cr = true;
                    self.pending = false;
                }
                _ => {
                    self.after_cr = false;
                    self.pending = true;
                }
            }
        }
    }

    /// Total lines, counting an unterminated last line
    pub fn finish(self) -> u64 {
        self.lines + u64::from(self.pending)
    }
}

/// Count lines in a decoded text buffer
pub fn count_text_lines(text: &str) -> u64 {
    let mut counter = LineCounter::new();
    counter.feed(text);
    counter.finish()
}

/// Count lines in a file read as UTF-8 text
///
/// The file is streamed; memory use does not grow with its size. Binary or
/// otherwise undecodable content, and read failures, degrade to zero lines.
pub fn count_lines(path: &Path) -> Probe<u64> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return Probe::degraded(0, format!("cannot read {}: {}", path.display(), e)),
    };

    let mut reader = BufReader::with_capacity(CHUNK, file);
    let mut counter = LineCounter::new();
    // Bytes of a multi-byte character cut off at the end of the previous chunk
    let mut carry: Vec<u8> = Vec::new();

    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Probe::degraded(0, format!("cannot read {}: {}", path.display(), e)),
        };
        if chunk.is_empty() {
            break;
        }

        carry.extend_from_slice(chunk);
        let consumed = chunk.len();
        reader.consume(consumed);

        match std::str::from_utf8(&carry) {
            Ok(text) => {
                counter.feed(text);
                carry.clear();
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                        if let Ok(text) = std::str::from_utf8(&carry[..valid]) {
                    counter.feed(text);
                }
                carry.drain(..valid);
            }
            Err(e) => {
                return Probe::degraded(0, format!("{} is not valid UTF-8: {}", path.display(), e))
            }
        }
    }

    if !carry.is_empty() {
        return Probe::degraded(
            0,
            format!("{} is not valid UTF-8: truncated character at end", path.display()),
        );
    }
    Probe::Ok(counter.finish())
}
