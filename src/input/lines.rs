use std::io::{self, BufRead};

/// Lazily yields the lines of a text stream with their terminators stripped.
///
/// An empty line is `Some("")`; only a read that returns no bytes at all is
/// end-of-input.
pub struct LineReader<R> {
    inner: R,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line_number: 0,
        }
    }

    /// Reads the next line, or `None` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates read failures from the underlying stream, including
    /// `InvalidData` for bytes that are not UTF-8.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.inner.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
        }
        if line.ends_with('\r') {
            line.pop();
        }

        self.line_number += 1;
        Ok(Some(line))
    }

    /// 1-based number of the last line returned, 0 before the first read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
