//! Line splitting for live tool output.
//!
//! Progress bars redraw themselves with a bare `\r`, so output is split on
//! `\n`, `\r` and `\r\n` alike.

use std::io::{self, Bytes, Read};

/// Iterator over the lines of a reader, treating `\r` as a line break.
pub struct OutputLines<R> {
    bytes: Bytes<R>,
    skip_lf: bool,
    done: bool,
}

impl<R: Read> OutputLines<R> {
    /// Wrap a (preferably buffered) reader.
    pub fn new(reader: R) -> Self {
        Self {
            bytes: reader.bytes(),
            skip_lf: false,
            done: false,
        }
    }
}

impl<R: Read> Iterator for OutputLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = Vec::new();
        loop {
            match self.bytes.next() {
                None => {
                    self.done = true;
                    if buf.is_empty() {
                        return None;
                    }
                    return Some(Ok(String::from_utf8_lossy(&buf).into_owned()));
                }
                Some(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(b'\n')) => {
                    if self.skip_lf {
                        self.skip_lf = false;
                        continue;
                    }
                    return Some(Ok(String::from_utf8_lossy(&buf).into_owned()));
                }
                Some(Ok(b'\r')) => {
                    self.skip_lf = true;
                    return Some(Ok(String::from_utf8_lossy(&buf).into_owned()));
                }
                Some(Ok(byte)) => {
                    self.skip_lf = false;
                    buf.push(byte);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(input: &[u8]) -> Vec<String> {
        OutputLines::new(Cursor::new(input.to_vec()))
            .map(|l| l.unwrap())
            .collect()
    }

    #[test]
    fn splits_on_newlines() {
        assert_eq!(collect(b"a\nb\n"), vec!["a", "b"]);
    }

    #[test]
    fn carriage_returns_break_lines() {
        assert_eq!(collect(b" 10%|#\r 20%|##\r 30%|###\n"), vec![" 10%|#", " 20%|##", " 30%|###"]);
    }

    #[test]
    fn crlf_is_a_single_break() {
        assert_eq!(collect(b"one\r\ntwo\r\n\r\nthree"), vec!["one", "two", "", "three"]);
    }

    #[test]
    fn trailing_text_without_newline_is_kept() {
        assert_eq!(collect(b"done"), vec!["done"]);
        assert!(collect(b"").is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let lines = collect(b"caf\xe9\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("caf"));
    }
}
